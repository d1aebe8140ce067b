//! Chat message types.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Stable platform identity
    id: String,
    /// Name shown for the author when the message was fetched
    #[serde(alias = "username", default)]
    display_name: String,
}

impl Author {
    /// Create an author.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A single chat message.
///
/// Messages are produced by a message source or decoded from a cache entry
/// and are never mutated afterwards.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mimic_core::{Author, Message};
///
/// let msg = Message::new(
///     "1100",
///     "hello there",
///     Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
///     Author::new("42", "ada"),
/// );
/// assert_eq!(msg.author_id(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Opaque stable id; also the pagination cursor
    id: String,
    /// Message text
    content: String,
    /// Creation instant
    created_at: DateTime<Utc>,
    /// Who wrote it
    author: Author,
}

impl Message {
    /// Create a message.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        author: Author,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at,
            author,
        }
    }

    /// Shorthand for `self.author().id()`.
    pub fn author_id(&self) -> &str {
        &self.author.id
    }

    /// Whether the message carries any non-whitespace text.
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}
