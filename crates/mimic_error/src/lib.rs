//! Error types for Mimic.
//!
//! # Error Hierarchy
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind with the source location that raised it
//! - Constructors use `#[track_caller]` so the location is captured automatically
//!
//! # Examples
//!
//! ```
//! use mimic_error::{FetchError, FetchErrorKind, MimicResult};
//!
//! fn fetch_page() -> MimicResult<Vec<String>> {
//!     Err(FetchError::new(FetchErrorKind::Transient("connection reset".to_string())))?
//! }
//!
//! assert!(fetch_page().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod fetch;
mod json;

pub use cache::{CacheError, CacheErrorKind};
pub use config::ConfigError;
pub use error::{MimicError, MimicErrorKind, MimicResult};
pub use fetch::{FetchError, FetchErrorKind};
pub use json::JsonError;
