//! Cache store error types.

/// Kinds of cache store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// Failed to create the cache directory
    #[display("Failed to create cache directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write an entry
    #[display("Failed to write cache entry: {}", _0)]
    FileWrite(String),
    /// Failed to read an entry
    #[display("Failed to read cache entry: {}", _0)]
    FileRead(String),
    /// Failed to delete an entry
    #[display("Failed to remove cache entry: {}", _0)]
    FileRemove(String),
    /// Entry exists but could not be decoded
    #[display("Corrupted cache entry: {}", _0)]
    Corrupted(String),
    /// Messages do not belong to the scope of the entry holding them
    #[display("Scope mismatch: {}", _0)]
    ScopeMismatch(String),
    /// A key or file name could not be interpreted
    #[display("Invalid cache key: {}", _0)]
    InvalidKey(String),
}

/// Cache error with location tracking.
///
/// # Examples
///
/// ```
/// use mimic_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::Corrupted("guild_1_channel_2_3m.json".to_string()));
/// assert!(format!("{}", err).contains("Corrupted"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error means the stored bytes are unusable.
    pub fn is_corruption(&self) -> bool {
        matches!(self.kind, CacheErrorKind::Corrupted(_))
    }
}
