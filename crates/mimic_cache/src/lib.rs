//! TTL-bounded on-disk message cache for Mimic.
//!
//! Entries are keyed by [`CacheKey`](mimic_core::CacheKey) and stored one JSON
//! file per entry. Staleness is wall-clock based: an entry older than the
//! configured TTL reads as absent but stays on disk until overwritten. There is
//! no size bound; the directory grows until maintenance cleans it.
//!
//! # Components
//!
//! - [`CacheStore`] - storage trait; [`FileSystemCacheStore`] is the on-disk backend
//! - [`CacheEntry`] - one stored message set
//! - [`UserPartitioner`] - derives per-author entries from a channel entry
//! - [`CacheMaintainer`] - scrubs identities out of stored entries
//!
//! # Example
//!
//! ```rust
//! use mimic_cache::{CacheStore, FileSystemCacheStore};
//! use mimic_core::{CacheKey, SystemClock};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemCacheStore::new("/tmp/mimic-cache", chrono::Duration::hours(24), Arc::new(SystemClock))?;
//! let key = CacheKey::guild("1", "2", 3);
//! store.put(&key, Vec::new()).await?;
//! assert!(store.get(&key).await?.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entry;
mod filesystem;
mod layout;
mod maintenance;
mod partition;
mod store;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use filesystem::FileSystemCacheStore;
pub use layout::{file_name, parse_file_name};
pub use maintenance::{CacheMaintainer, PurgeReport};
pub use partition::UserPartitioner;
pub use store::{CacheStore, EntryEdit};
