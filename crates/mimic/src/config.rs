//! Configuration loading.
//!
//! Values are merged from, in increasing precedence:
//! - Bundled defaults (include_str! from mimic.toml)
//! - `~/.config/mimic/mimic.toml`
//! - `./mimic.toml`
//! - `MIMIC_*` environment variables (a `.env` file is honoured)

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use derive_getters::Getters;
use mimic_cache::{CacheConfig, CacheConfigBuilder};
use mimic_core::ExclusionList;
use mimic_error::{ConfigError, MimicResult};
use mimic_social::{FetchConfig, FetchConfigBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../mimic.toml");

/// Environment variable holding the Discord bot token.
pub const DISCORD_TOKEN_VAR: &str = "DISCORD_TOKEN";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct MimicConfig {
    /// Directory holding the cache entries
    cache_dir: PathBuf,
    /// Entry age (hours) at which it reads as absent
    cache_ttl_hours: u64,
    /// Months of history covered by a lookup
    time_span_months: u32,
    /// Page ceiling per fetch
    max_batches: u32,
    /// Messages per page
    page_size: u8,
    /// Authors never kept
    #[serde(default)]
    excluded_users: ExclusionList,
    /// Guild entries rewritten at once during maintenance
    maintenance_concurrency: usize,
}

impl MimicConfig {
    /// Load the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a value has the
    /// wrong type.
    #[instrument]
    pub fn load() -> MimicResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }

        let mut builder = Self::defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/mimic/mimic.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("mimic").required(false))
            .add_source(Environment::with_prefix("MIMIC"));

        Self::build(builder)
    }

    /// Bundled defaults overlaid with one TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> MimicResult<Self> {
        Self::build(Self::defaults().add_source(File::from(path.as_ref())))
    }

    /// Bundled defaults overlaid with TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml(text: &str) -> MimicResult<Self> {
        Self::build(Self::defaults().add_source(File::from_str(text, FileFormat::Toml)))
    }

    /// Cache settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache settings cannot be assembled.
    pub fn cache_config(&self) -> MimicResult<CacheConfig> {
        CacheConfigBuilder::default()
            .cache_dir(self.cache_dir.clone())
            .ttl_hours(self.cache_ttl_hours)
            .maintenance_concurrency(self.maintenance_concurrency)
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid cache settings: {}", e)).into())
    }

    /// Pagination settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the pagination settings cannot be assembled.
    pub fn fetch_config(&self) -> MimicResult<FetchConfig> {
        FetchConfigBuilder::default()
            .max_batches(self.max_batches)
            .page_size(self.page_size)
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid fetch settings: {}", e)).into())
    }

    /// Discord bot token from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DISCORD_TOKEN` is unset or empty.
    pub fn discord_token() -> MimicResult<String> {
        match std::env::var(DISCORD_TOKEN_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::new(format!("{DISCORD_TOKEN_VAR} is not set")).into()),
        }
    }

    fn defaults() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> MimicResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build config: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to deserialize config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> MimicResult<()> {
        if self.page_size == 0 || self.page_size > mimic_social::MAX_PAGE_SIZE {
            return Err(ConfigError::new(format!(
                "page_size must be between 1 and {}, got {}",
                mimic_social::MAX_PAGE_SIZE,
                self.page_size
            ))
            .into());
        }
        if self.cache_ttl_hours == 0 {
            return Err(ConfigError::new("cache_ttl_hours must be positive").into());
        }
        Ok(())
    }
}

impl Default for MimicConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            cache_ttl_hours: 24,
            time_span_months: 3,
            max_batches: 30,
            page_size: mimic_social::MAX_PAGE_SIZE,
            excluded_users: ExclusionList::default(),
            maintenance_concurrency: 4,
        }
    }
}
