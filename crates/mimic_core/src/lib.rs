//! Core data types for Mimic.
//!
//! This crate holds the vocabulary shared by the cache, the fetcher and the
//! lookup layer:
//!
//! - [`Message`] and [`Author`] - immutable chat messages as delivered by a source
//! - [`CacheKey`] and [`ChannelScope`] - identity of a cached message set
//! - [`TimeWindow`] - the rolling window a fetch covers
//! - [`ExclusionList`] - identities whose messages are never kept
//! - [`Clock`] - injectable time source
//! - [`redact_id`] / [`redact_name`] - log-safe renderings of identities

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod exclusion;
mod key;
mod message;
mod redact;
mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use exclusion::ExclusionList;
pub use key::{CacheKey, ChannelScope};
pub use message::{Author, Message};
pub use redact::{redact_id, redact_name};
pub use window::TimeWindow;
