//! Cache configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the on-disk cache.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct CacheConfig {
    /// Directory holding one file per entry
    #[serde(default = "default_cache_dir")]
    cache_dir: PathBuf,

    /// Age (hours) at which an entry reads as absent
    #[serde(default = "default_ttl_hours")]
    ttl_hours: u64,

    /// Guild entries processed at once during maintenance
    #[serde(default = "default_maintenance_concurrency")]
    maintenance_concurrency: usize,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_maintenance_concurrency() -> usize {
    4
}

impl CacheConfig {
    /// TTL as a duration.
    pub fn ttl(&self) -> chrono::Duration {
        i64::try_from(self.ttl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            ttl_hours: default_ttl_hours(),
            maintenance_concurrency: default_maintenance_concurrency(),
        }
    }
}
