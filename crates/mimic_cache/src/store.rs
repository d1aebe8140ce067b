//! Cache store trait definition.

use crate::CacheEntry;
use mimic_core::{CacheKey, Message};
use mimic_error::MimicResult;

/// In-place edit applied to a stored entry. Returns `true` when the entry
/// changed and must be written back.
pub type EntryEdit = Box<dyn FnOnce(&mut CacheEntry) -> bool + Send>;

/// Trait for pluggable cache backends.
///
/// Implementations own every entry they hold; callers only ever see copies.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Fresh entry for `key`.
    ///
    /// Returns `None` when no entry exists, when the entry is at least one TTL
    /// old, or when the stored bytes cannot be decoded (logged as a warning).
    async fn get(&self, key: &CacheKey) -> MimicResult<Option<CacheEntry>>;

    /// Store `messages` under `key` stamped with the current time, replacing
    /// whatever was there.
    async fn put(&self, key: &CacheKey, messages: Vec<Message>) -> MimicResult<CacheEntry>;

    /// Store an already-built entry as is, keeping its `fetched_at`.
    async fn write(&self, entry: &CacheEntry) -> MimicResult<()>;

    /// Entry for `key` regardless of age. Undecodable entries read as `None`.
    async fn load(&self, key: &CacheKey) -> MimicResult<Option<CacheEntry>>;

    /// Apply `edit` to the entry for `key` without letting another writer of
    /// the same entry interleave. Returns the entry after the edit, or `None`
    /// when nothing is stored.
    ///
    /// An entry whose JSON parses but whose header disagrees with its
    /// messages is repaired and rewritten. One that does not parse at all is
    /// an error.
    async fn modify(&self, key: &CacheKey, edit: EntryEdit) -> MimicResult<Option<CacheEntry>>;

    /// Delete the entry for `key`. Returns whether anything was deleted.
    async fn remove(&self, key: &CacheKey) -> MimicResult<bool>;

    /// Every key with a stored entry, fresh or not.
    async fn keys(&self) -> MimicResult<Vec<CacheKey>>;
}
