//! Get-or-fetch-or-partition lookups.

use crate::MimicConfig;
use derive_getters::Getters;
use mimic_cache::{CacheEntry, CacheStore, FileSystemCacheStore, UserPartitioner};
use mimic_core::{CacheKey, Clock, ExclusionList, Message, redact_id};
use mimic_error::MimicResult;
use mimic_social::{FetchRequest, FetchStop, MessageSource, PaginatedFetcher};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Where the messages of a lookup came from.
#[derive(Debug, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LookupOrigin {
    /// A fresh user-scope entry.
    UserCache,
    /// A fresh channel entry, partitioned on the way.
    GuildCache,
    /// A completed fetch, now cached.
    Fetched,
    /// A fetch that failed part way. What was read is returned but not cached.
    Partial(String),
    /// The user is excluded; nothing was read.
    Excluded,
    /// The channel could not be read at all.
    Unreachable(String),
}

/// Messages found for one user in one channel window.
#[derive(Debug, Clone, Getters)]
pub struct HistoryLookup {
    /// The user's messages, newest first
    messages: Vec<Message>,
    /// How they were obtained
    origin: LookupOrigin,
}

impl HistoryLookup {
    fn new(messages: Vec<Message>, origin: LookupOrigin) -> Self {
        Self { messages, origin }
    }

    /// Whether the channel was out of reach, as opposed to simply quiet.
    pub fn is_unreachable(&self) -> bool {
        matches!(self.origin, LookupOrigin::Unreachable(_))
    }

    /// Up to `limit` message texts that are not blank, newest first.
    pub fn sample_contents(&self, limit: usize) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.has_text())
            .map(|m| m.content().as_str())
            .take(limit)
            .collect()
    }

    /// Take the messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Answers "what did this user say in this channel lately" from the cache
/// where possible and from the message source otherwise.
///
/// A miss fetches the whole channel rather than one author, caches it, and
/// partitions it so later lookups for other authors hit their own entries.
/// Store failures degrade to a miss; nothing here is fatal.
#[derive(Clone)]
pub struct MessageHistory {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn MessageSource>,
    fetcher: PaginatedFetcher,
    partitioner: UserPartitioner,
    exclusions: ExclusionList,
}

impl MessageHistory {
    /// Assemble from parts.
    pub fn new(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn MessageSource>,
        fetcher: PaginatedFetcher,
        exclusions: ExclusionList,
    ) -> Self {
        Self {
            partitioner: UserPartitioner::new(Arc::clone(&store)),
            store,
            source,
            fetcher,
            exclusions,
        }
    }

    /// Filesystem-backed history built from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the cache directory
    /// cannot be created.
    pub fn from_config(
        config: &MimicConfig,
        source: Arc<dyn MessageSource>,
        clock: Arc<dyn Clock>,
    ) -> MimicResult<Self> {
        let store = FileSystemCacheStore::from_config(&config.cache_config()?, Arc::clone(&clock))?;
        Ok(Self::new(
            Arc::new(store),
            source,
            PaginatedFetcher::new(config.fetch_config()?, clock),
            config.excluded_users().clone(),
        ))
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// The user's messages in the channel over the last `months` months.
    ///
    /// An empty result is a valid answer; check
    /// [`HistoryLookup::is_unreachable`] to tell a silent user from a channel
    /// that could not be read.
    #[instrument(
        skip(self, user_id, guild_id, channel_id),
        fields(user = %redact_id(user_id), guild = %guild_id, channel = %channel_id)
    )]
    pub async fn lookup(
        &self,
        user_id: &str,
        guild_id: &str,
        channel_id: &str,
        months: u32,
    ) -> HistoryLookup {
        if self.exclusions.is_excluded(user_id) {
            info!("User is excluded, skipping lookup");
            return HistoryLookup::new(Vec::new(), LookupOrigin::Excluded);
        }

        let user_key = CacheKey::user(user_id, guild_id, channel_id, months);
        if let Some(entry) = self.cached(&user_key).await {
            info!(messages = entry.message_count(), "Serving from user cache");
            return HistoryLookup::new(entry.into_messages(), LookupOrigin::UserCache);
        }

        let guild_key = user_key.guild_key();
        if let Some(entry) = self.cached(&guild_key).await {
            info!(messages = entry.message_count(), "Partitioning cached channel entry");
            let messages = self.slice(&entry, user_id).await;
            return HistoryLookup::new(messages, LookupOrigin::GuildCache);
        }

        self.fetch_channel(&guild_key, user_id).await
    }

    async fn fetch_channel(&self, guild_key: &CacheKey, user_id: &str) -> HistoryLookup {
        let scope = guild_key.scope();
        match self.source.verify_scope(scope).await {
            Ok(()) => {}
            Err(e) if e.is_unreachable() => {
                warn!(error = %e, "Channel is not reachable");
                return HistoryLookup::new(Vec::new(), LookupOrigin::Unreachable(e.kind.to_string()));
            }
            Err(e) => warn!(error = %e, "Could not verify channel, fetching anyway"),
        }

        let request = FetchRequest::channel(scope.channel_id.as_str(), scope.time_span_months);
        let outcome = self
            .fetcher
            .fetch(self.source.as_ref(), &request, &self.exclusions)
            .await;

        match outcome.stop().clone() {
            FetchStop::Unreachable(reason) => {
                return HistoryLookup::new(Vec::new(), LookupOrigin::Unreachable(reason));
            }
            FetchStop::Interrupted(reason) => {
                warn!(%reason, kept = outcome.messages().len(), "Fetch interrupted, not caching partial history");
                let messages = only_author(outcome.into_messages(), user_id);
                return HistoryLookup::new(messages, LookupOrigin::Partial(reason));
            }
            FetchStop::Exhausted | FetchStop::WindowDone | FetchStop::LimitHit => {}
        }

        let messages = outcome.into_messages();
        match self.store.put(guild_key, messages.clone()).await {
            Ok(entry) => HistoryLookup::new(self.slice(&entry, user_id).await, LookupOrigin::Fetched),
            Err(e) => {
                error!(error = %e, "Failed to cache channel history");
                HistoryLookup::new(only_author(messages, user_id), LookupOrigin::Fetched)
            }
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(entry = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Partition `entry` and return the user's share.
    async fn slice(&self, entry: &CacheEntry, user_id: &str) -> Vec<Message> {
        match self.partitioner.partition(entry).await {
            Ok(mut users) => match users.remove(user_id) {
                Some(user_entry) => user_entry.into_messages(),
                None => {
                    debug!("User has no messages in this channel window");
                    Vec::new()
                }
            },
            Err(e) => {
                error!(error = %e, "Failed to partition channel entry");
                only_author(entry.messages().clone(), user_id)
            }
        }
    }
}

fn only_author(messages: Vec<Message>, user_id: &str) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|m| m.author_id() == user_id)
        .collect()
}
