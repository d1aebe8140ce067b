//! Retroactive enforcement of the exclusion list.

use crate::{CacheEntry, CacheStore};
use derive_getters::Getters;
use futures::stream::{self, StreamExt};
use mimic_core::{CacheKey, ExclusionList, redact_id};
use mimic_error::MimicResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a purge pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct PurgeReport {
    /// Identity that was purged
    user_id: String,
    /// User-scope entries deleted
    user_entries_removed: usize,
    /// Guild-scope entries inspected
    guild_entries_checked: usize,
    /// Guild-scope entries rewritten without the user's messages
    guild_entries_rewritten: usize,
    /// Messages dropped from guild-scope entries
    messages_removed: usize,
    /// Entries that could not be processed
    failures: usize,
}

/// Removes every trace of an identity from the cache.
///
/// This is an explicit maintenance pass: newly excluded identities keep their
/// cached messages until it runs.
#[derive(Clone)]
pub struct CacheMaintainer {
    store: Arc<dyn CacheStore>,
    concurrency: usize,
}

impl CacheMaintainer {
    /// Maintainer over `store`, rewriting up to `concurrency` guild entries at once.
    pub fn new(store: Arc<dyn CacheStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Delete the user's own entries and scrub their messages out of every
    /// guild entry. Per-entry failures are logged and counted, not returned.
    #[tracing::instrument(skip(self, user_id), fields(user = %redact_id(user_id)))]
    pub async fn purge(&self, user_id: &str) -> MimicResult<PurgeReport> {
        let keys = self.store.keys().await?;
        let mut report = PurgeReport {
            user_id: user_id.to_string(),
            ..PurgeReport::default()
        };

        let (user_keys, guild_keys): (Vec<CacheKey>, Vec<CacheKey>) =
            keys.into_iter().partition(CacheKey::is_user_scope);

        for key in user_keys.iter().filter(|k| k.user_id() == Some(user_id)) {
            match self.store.remove(key).await {
                Ok(true) => report.user_entries_removed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(entry = %key, error = %e, "Failed to remove user entry");
                    report.failures += 1;
                }
            }
        }
        tracing::info!(removed = report.user_entries_removed, "Removed user-specific cache entries");

        report.guild_entries_checked = guild_keys.len();
        let outcomes: Vec<MimicResult<usize>> = stream::iter(guild_keys)
            .map(|key| self.scrub(key, user_id.to_string()))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(0) => {}
                Ok(removed) => {
                    report.guild_entries_rewritten += 1;
                    report.messages_removed += removed;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to scrub guild entry");
                    report.failures += 1;
                }
            }
        }

        tracing::info!(
            checked = report.guild_entries_checked,
            rewritten = report.guild_entries_rewritten,
            messages_removed = report.messages_removed,
            "Cleanup complete"
        );
        Ok(report)
    }

    /// Run [`purge`](Self::purge) for every excluded identity, in list order.
    #[tracing::instrument(skip(self, exclusions), fields(excluded = exclusions.len()))]
    pub async fn purge_all(&self, exclusions: &ExclusionList) -> MimicResult<Vec<PurgeReport>> {
        if exclusions.is_empty() {
            tracing::info!("No excluded users configured, nothing to clean");
            return Ok(Vec::new());
        }

        let mut reports = Vec::with_capacity(exclusions.len());
        for user_id in exclusions.iter() {
            reports.push(self.purge(user_id).await?);
        }
        Ok(reports)
    }

    async fn scrub(&self, key: CacheKey, user_id: String) -> MimicResult<usize> {
        let removed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&removed);
        let edited = self
            .store
            .modify(
                &key,
                Box::new(move |entry: &mut CacheEntry| {
                    let n = entry.remove_author(&user_id);
                    counter.store(n, Ordering::Relaxed);
                    n > 0
                }),
            )
            .await?;

        let removed = removed.load(Ordering::Relaxed);
        if edited.is_some() && removed > 0 {
            tracing::info!(entry = %key, removed, "Removed messages from guild entry");
        }
        Ok(removed)
    }
}
