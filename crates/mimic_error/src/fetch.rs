//! Message source error types.

/// Kinds of failures reported by a message source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FetchErrorKind {
    /// A single page request failed; later requests may succeed.
    #[display("Transient fetch failure: {}", _0)]
    Transient(String),
    /// The guild or channel does not exist or is not readable.
    #[display("Scope not found: {}", _0)]
    ScopeNotFound(String),
    /// An identifier could not be interpreted by the source.
    #[display("Invalid ID: {}", _0)]
    InvalidId(String),
}

/// Fetch error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new fetch error with automatic location tracking.
    ///
    /// # Examples
    ///
    /// ```
    /// use mimic_error::{FetchError, FetchErrorKind};
    ///
    /// let err = FetchError::new(FetchErrorKind::ScopeNotFound("channel 42".to_string()));
    /// assert!(err.is_unreachable());
    /// ```
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the scope itself could not be looked at, as opposed to a
    /// single request failing.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self.kind,
            FetchErrorKind::ScopeNotFound(_) | FetchErrorKind::InvalidId(_)
        )
    }
}
