//! Top-level error wrapper types.

use crate::{CacheError, ConfigError, FetchError, JsonError};

/// Every error condition a Mimic crate can surface.
///
/// # Examples
///
/// ```
/// use mimic_error::{ConfigError, MimicError};
///
/// let err: MimicError = ConfigError::new("missing cache_dir").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum MimicErrorKind {
    /// Cache store error
    #[from(CacheError)]
    Cache(CacheError),
    /// Message source error
    #[from(FetchError)]
    Fetch(FetchError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Mimic error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Mimic Error: {}", _0)]
pub struct MimicError(Box<MimicErrorKind>);

impl MimicError {
    /// Create a new error from a kind.
    pub fn new(kind: MimicErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MimicErrorKind {
        &self.0
    }
}

impl<T> From<T> for MimicError
where
    T: Into<MimicErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Mimic operations.
pub type MimicResult<T> = std::result::Result<T, MimicError>;
