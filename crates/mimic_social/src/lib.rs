//! Chat history retrieval for Mimic.
//!
//! A [`MessageSource`] serves one channel's history newest-first in pages of
//! at most [`MAX_PAGE_SIZE`] messages, each page older than the cursor it was
//! asked for. [`PaginatedFetcher`] walks those pages backwards until the time
//! window is consumed, the history runs out, or the batch ceiling is hit,
//! filtering excluded authors as it goes.
//!
//! # Platform Support
//!
//! - `discord` - serenity-backed [`DiscordMessageSource`] (requires `discord` feature)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fetcher;
mod source;

#[cfg(feature = "discord")]
mod discord;

pub use fetcher::{
    FetchConfig, FetchConfigBuilder, FetchOutcome, FetchRequest, FetchStop, PaginatedFetcher,
};
pub use source::{MAX_PAGE_SIZE, MessageSource};

#[cfg(feature = "discord")]
pub use discord::{DiscordMessageSource, parse_snowflake, parse_timestamp};
