//! Mimic - time-windowed chat history cache.
//!
//! Mimic answers "what has this user written in this channel over the last
//! few months" without re-reading the whole channel every time. The first
//! lookup in a channel pages through its history, caches it on disk, and
//! splits it into one entry per author; later lookups for any author in that
//! channel are served from those entries until they expire.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mimic::{MessageHistory, MimicConfig, SystemClock};
//! use std::sync::Arc;
//!
//! let config = MimicConfig::load()?;
//! let history = MessageHistory::from_config(&config, source, Arc::new(SystemClock))?;
//! let found = history.lookup("user", "guild", "channel", *config.time_span_months()).await;
//! for text in found.sample_contents(100) {
//!     println!("{text}");
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `discord` - Discord message source
//!
//! # Architecture
//!
//! - `mimic_error` - Error types
//! - `mimic_core` - Messages, cache keys, time windows, exclusions, clocks
//! - `mimic_cache` - On-disk cache, per-user partitioning, maintenance
//! - `mimic_social` - Message sources and paginated fetching
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod history;
mod observability;

pub use config::{DISCORD_TOKEN_VAR, MimicConfig};
pub use history::{HistoryLookup, LookupOrigin, MessageHistory};
pub use observability::{LoggingConfig, init_logging};

pub use mimic_cache::*;
pub use mimic_core::*;
pub use mimic_error::*;
pub use mimic_social::*;
