//! Filesystem-based cache store.
//!
//! One pretty-printed JSON file per entry, named from the entry's key (see
//! [`file_name`](crate::file_name)). Writes go to a temp file first and are
//! renamed into place so a reader never observes a half-written entry.

use crate::{CacheConfig, CacheEntry, CacheStore, EntryEdit, layout};
use chrono::Duration;
use mimic_core::{CacheKey, Clock, Message};
use mimic_error::{CacheError, CacheErrorKind, MimicError, MimicErrorKind, MimicResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

/// Filesystem cache backend.
///
/// Writers of the same entry within one process are serialised through a
/// per-file lock; across processes the rename keeps each entry whole and the
/// last writer wins.
pub struct FileSystemCacheStore {
    base_path: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
    temp_counter: AtomicU64,
}

impl FileSystemCacheStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path, clock), fields(ttl_hours = ttl.num_hours()))]
    pub fn new(base_path: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> MimicResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            CacheError::new(CacheErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened filesystem cache");
        Ok(Self {
            base_path,
            ttl,
            clock,
            locks: Mutex::new(HashMap::new()),
            temp_counter: AtomicU64::new(0),
        })
    }

    /// Create a store from configuration.
    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> MimicResult<Self> {
        Self::new(config.cache_dir().clone(), config.ttl(), clock)
    }

    /// Directory holding the entries.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_path.join(layout::file_name(key))
    }

    async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let slot = {
            let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            table.retain(|_, slot| Arc::strong_count(slot) > 1);
            table.entry(path.to_path_buf()).or_default().clone()
        };
        slot.lock_owned().await
    }

    async fn read_bytes(path: &Path) -> MimicResult<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::new(CacheErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    async fn read(&self, key: &CacheKey) -> MimicResult<Option<CacheEntry>> {
        let path = self.path_for(key);
        let Some(bytes) = Self::read_bytes(&path).await? else {
            return Ok(None);
        };

        match CacheEntry::from_json(key, &bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if is_corruption(&e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable cache entry");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn write_file(&self, entry: &CacheEntry) -> MimicResult<()> {
        layout::validate(entry.key())?;
        let path = self.path_for(entry.key());
        let bytes = entry.to_json()?;

        let temp_path = self.base_path.join(format!(
            "{}.{}.{}.tmp",
            layout::file_name(entry.key()),
            std::process::id(),
            self.temp_counter.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = tokio::fs::write(&temp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::new(CacheErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
            .into());
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::new(CacheErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into());
        }

        tracing::debug!(
            path = %path.display(),
            messages = entry.message_count(),
            "Wrote cache entry"
        );
        Ok(())
    }
}

fn is_corruption(err: &MimicError) -> bool {
    matches!(err.kind(), MimicErrorKind::Cache(e) if e.is_corruption())
}

#[async_trait::async_trait]
impl CacheStore for FileSystemCacheStore {
    #[tracing::instrument(skip(self, key), fields(entry = %layout::file_name(key)))]
    async fn get(&self, key: &CacheKey) -> MimicResult<Option<CacheEntry>> {
        let Some(entry) = self.read(key).await? else {
            tracing::debug!("Cache miss");
            return Ok(None);
        };

        let now = self.clock.now();
        if entry.is_expired(now, self.ttl) {
            tracing::debug!(age_hours = entry.age(now).num_hours(), "Cache entry expired");
            return Ok(None);
        }

        tracing::debug!(
            age_minutes = entry.age(now).num_minutes(),
            messages = entry.message_count(),
            "Cache hit"
        );
        Ok(Some(entry))
    }

    #[tracing::instrument(skip(self, key, messages), fields(entry = %layout::file_name(key), messages = messages.len()))]
    async fn put(&self, key: &CacheKey, messages: Vec<Message>) -> MimicResult<CacheEntry> {
        let entry = CacheEntry::new(key.clone(), self.clock.now(), messages)?;
        let _guard = self.lock(&self.path_for(key)).await;
        self.write_file(&entry).await?;
        tracing::info!("Cached {} messages", entry.message_count());
        Ok(entry)
    }

    async fn write(&self, entry: &CacheEntry) -> MimicResult<()> {
        let _guard = self.lock(&self.path_for(entry.key())).await;
        self.write_file(entry).await
    }

    async fn load(&self, key: &CacheKey) -> MimicResult<Option<CacheEntry>> {
        self.read(key).await
    }

    #[tracing::instrument(skip(self, key, edit), fields(entry = %layout::file_name(key)))]
    async fn modify(&self, key: &CacheKey, edit: EntryEdit) -> MimicResult<Option<CacheEntry>> {
        let path = self.path_for(key);
        let _guard = self.lock(&path).await;
        let Some(bytes) = Self::read_bytes(&path).await? else {
            return Ok(None);
        };

        let (mut entry, repaired) = match CacheEntry::from_json(key, &bytes) {
            Ok(entry) => (entry, false),
            Err(e) if is_corruption(&e) => {
                let entry = CacheEntry::from_json_lenient(key, &bytes)?;
                tracing::warn!(path = %path.display(), error = %e, "Repairing inconsistent cache entry");
                (entry, true)
            }
            Err(e) => return Err(e),
        };
        if edit(&mut entry) || repaired {
            self.write_file(&entry).await?;
        }
        Ok(Some(entry))
    }

    #[tracing::instrument(skip(self, key), fields(entry = %layout::file_name(key)))]
    async fn remove(&self, key: &CacheKey) -> MimicResult<bool> {
        let path = self.path_for(key);
        let _guard = self.lock(&path).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Removed cache entry");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::new(CacheErrorKind::FileRemove(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    async fn keys(&self) -> MimicResult<Vec<CacheKey>> {
        let mut dir = tokio::fs::read_dir(&self.base_path).await.map_err(|e| {
            CacheError::new(CacheErrorKind::FileRead(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))
        })?;

        let mut keys = Vec::new();
        loop {
            let next = dir.next_entry().await.map_err(|e| {
                CacheError::new(CacheErrorKind::FileRead(format!(
                    "{}: {}",
                    self.base_path.display(),
                    e
                )))
            })?;
            let Some(item) = next else { break };

            let name = item.file_name();
            match name.to_str().and_then(layout::parse_file_name) {
                Some(key) => keys.push(key),
                None => tracing::trace!(file = ?name, "Skipping non-entry file"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
