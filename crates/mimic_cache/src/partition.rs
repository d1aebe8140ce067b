//! Per-author partitioning of channel entries.

use crate::{CacheEntry, CacheStore};
use mimic_core::{CacheKey, Message, redact_id, redact_name};
use mimic_error::MimicResult;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Splits a channel-wide entry into one user-scope entry per author.
///
/// The first lookup that touches a channel pays for the full fetch; the
/// per-author entries it leaves behind serve every later lookup for that
/// channel window.
#[derive(Clone)]
pub struct UserPartitioner {
    store: Arc<dyn CacheStore>,
}

impl UserPartitioner {
    /// Partitioner writing through `store`.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Group `source` by author and write one user-scope entry per group.
    ///
    /// Each group keeps its relative order and the `fetched_at` of `source`,
    /// so the derived entries expire together with the data they came from.
    /// Running it twice over the same entry writes identical files.
    #[tracing::instrument(skip(self, source), fields(entry = %source.key(), messages = source.message_count()))]
    pub async fn partition(&self, source: &CacheEntry) -> MimicResult<BTreeMap<String, CacheEntry>> {
        let mut groups: BTreeMap<String, Vec<Message>> = BTreeMap::new();
        for message in source.messages() {
            groups
                .entry(message.author_id().to_string())
                .or_default()
                .push(message.clone());
        }

        let mut entries = BTreeMap::new();
        for (author_id, messages) in groups {
            let entry = CacheEntry::new(source.key().for_user(author_id.as_str()), *source.fetched_at(), messages)?;
            self.store.write(&entry).await?;
            tracing::debug!(
                user = %redact_id(&author_id),
                display = %entry.messages().first().map(|m| redact_name(m.author().display_name())).unwrap_or_default(),
                messages = entry.message_count(),
                "Wrote user cache entry"
            );
            entries.insert(author_id, entry);
        }

        tracing::info!(users = entries.len(), "Partitioned channel entry by author");
        Ok(entries)
    }

    /// Partition every stored guild-scope entry, fresh or not.
    ///
    /// Entries that fail are logged and skipped. Returns the number of user
    /// entries written per guild entry.
    #[tracing::instrument(skip(self))]
    pub async fn partition_all(&self) -> MimicResult<Vec<(CacheKey, usize)>> {
        let guild_keys: Vec<_> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|k| !k.is_user_scope())
            .collect();

        if guild_keys.is_empty() {
            tracing::info!("No guild cache entries found");
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(guild_keys.len());
        for key in guild_keys {
            let entry = match self.store.load(&key).await {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(entry = %key, error = %e, "Failed to read guild entry");
                    continue;
                }
            };
            match self.partition(&entry).await {
                Ok(users) => written.push((key, users.len())),
                Err(e) => tracing::error!(entry = %key, error = %e, "Failed to partition guild entry"),
            }
        }
        Ok(written)
    }
}
