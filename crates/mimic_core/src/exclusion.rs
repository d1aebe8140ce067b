//! Exclusion list applied at fetch time and at cleanup time.

use crate::Message;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Ordered set of author identities whose messages are never kept.
///
/// An empty list disables filtering. Configuration may supply it either as a
/// list or as one comma-separated string (the `EXCLUDED_USERS` form).
///
/// # Examples
///
/// ```
/// use mimic_core::ExclusionList;
///
/// let list = ExclusionList::from_csv(" 111, 222 ,,333");
/// assert_eq!(list.len(), 3);
/// assert!(list.is_excluded("222"));
/// assert!(!list.is_excluded("444"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl ExclusionList {
    /// Build from identities, trimming blanks and dropping duplicates while
    /// keeping first-seen order.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() || list.lookup.contains(id) {
                continue;
            }
            list.lookup.insert(id.to_string());
            list.ordered.push(id.to_string());
        }
        list
    }

    /// Parse a comma-separated list.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Whether `author_id` is excluded.
    pub fn is_excluded(&self, author_id: &str) -> bool {
        self.lookup.contains(author_id)
    }

    /// Whether a message may be kept.
    pub fn admits(&self, message: &Message) -> bool {
        !self.is_excluded(message.author_id())
    }

    /// Drop messages by excluded authors, preserving order.
    pub fn retain(&self, messages: Vec<Message>) -> Vec<Message> {
        if self.is_empty() {
            return messages;
        }
        messages.into_iter().filter(|m| self.admits(m)).collect()
    }

    /// Identities in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether filtering is disabled.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExclusions {
    Csv(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for ExclusionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawExclusions::deserialize(deserializer)? {
            RawExclusions::Csv(raw) => Self::from_csv(&raw),
            RawExclusions::List(ids) => Self::new(ids),
        })
    }
}

impl Serialize for ExclusionList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.ordered.serialize(serializer)
    }
}
