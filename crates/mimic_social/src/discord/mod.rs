//! Discord message source.
//!
//! Available with the `discord` feature. Talks to the Discord REST API
//! through serenity's [`Http`](serenity::http::Http) client; no gateway
//! connection is opened.
//!
//! ```rust,ignore
//! use mimic_social::{DiscordMessageSource, FetchRequest, PaginatedFetcher};
//!
//! let source = DiscordMessageSource::new(&std::env::var("DISCORD_TOKEN")?);
//! let outcome = fetcher.fetch(&source, &FetchRequest::channel("123", 3), &exclusions).await;
//! ```

mod conversions;
mod source;

pub use conversions::{parse_snowflake, parse_timestamp};
pub use source::DiscordMessageSource;
