//! Stored message sets and their on-disk form.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use mimic_core::{CacheKey, Message};
use mimic_error::{CacheError, CacheErrorKind, JsonError, MimicResult};
use serde::{Deserialize, Serialize};

/// One cached message set.
///
/// `messages` keep the order they were fetched in (newest first), so the last
/// message is the oldest of the batch. A user-scope entry only ever holds
/// messages written by its user.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CacheEntry {
    key: CacheKey,
    fetched_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl CacheEntry {
    /// Build an entry, rejecting foreign authors in a user-scope entry.
    pub fn new(key: CacheKey, fetched_at: DateTime<Utc>, messages: Vec<Message>) -> MimicResult<Self> {
        if let Some(user_id) = key.user_id()
            && let Some(stray) = messages.iter().find(|m| m.author_id() != user_id)
        {
            return Err(CacheError::new(CacheErrorKind::ScopeMismatch(format!(
                "message {} by {} in entry for user {}",
                stray.id(),
                stray.author_id(),
                user_id
            )))
            .into());
        }
        Ok(Self {
            key,
            fetched_at,
            messages,
        })
    }

    /// Number of messages held.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Time elapsed since the data was fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Whether the entry reads as absent at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }

    /// Consume the entry, keeping only the messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Remove every message by `author_id`, returning how many went.
    pub(crate) fn remove_author(&mut self, author_id: &str) -> usize {
        let before = self.messages.len();
        self.messages.retain(|m| m.author_id() != author_id);
        before - self.messages.len()
    }

    /// Encode as pretty JSON.
    pub(crate) fn to_json(&self) -> MimicResult<Vec<u8>> {
        let scope = self.key.scope();
        let file = CacheFile {
            fetch_date: self.fetched_at,
            guild_id: scope.guild_id.clone(),
            channel_id: scope.channel_id.clone(),
            time_span_months: scope.time_span_months,
            user_id: self.key.user_id().map(str::to_string),
            message_count: self.messages.len(),
            messages: self.messages.clone(),
        };
        let mut bytes = serde_json::to_vec_pretty(&file).map_err(JsonError::from)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Decode from JSON, checking the stored scope against `expected`.
    pub(crate) fn from_json(expected: &CacheKey, bytes: &[u8]) -> MimicResult<Self> {
        let corrupted = |detail: String| CacheError::new(CacheErrorKind::Corrupted(format!("{expected}: {detail}")));

        let file: CacheFile = serde_json::from_slice(bytes).map_err(|e| corrupted(e.to_string()))?;

        let key = match file.user_id {
            Some(user_id) => CacheKey::user(user_id, file.guild_id, file.channel_id, file.time_span_months),
            None => CacheKey::guild(file.guild_id, file.channel_id, file.time_span_months),
        };
        if &key != expected {
            return Err(corrupted(format!("file holds {key}")).into());
        }
        if file.message_count != file.messages.len() {
            return Err(corrupted(format!(
                "messageCount {} but {} messages",
                file.message_count,
                file.messages.len()
            ))
            .into());
        }

        Self::new(key, file.fetch_date, file.messages)
            .map_err(|e| corrupted(e.to_string()).into())
    }

    /// Decode an entry that parses but fails the header checks of
    /// [`from_json`](Self::from_json).
    ///
    /// The file location decides the key. The stored `messageCount` and scope
    /// fields are ignored, and a user entry keeps only that user's messages.
    pub(crate) fn from_json_lenient(expected: &CacheKey, bytes: &[u8]) -> MimicResult<Self> {
        let file: CacheFile = serde_json::from_slice(bytes).map_err(|e| {
            CacheError::new(CacheErrorKind::Corrupted(format!("{expected}: {e}")))
        })?;

        let messages = match expected.user_id() {
            Some(user_id) => file
                .messages
                .into_iter()
                .filter(|m| m.author_id() == user_id)
                .collect(),
            None => file.messages,
        };
        Self::new(expected.clone(), file.fetch_date, messages)
    }
}

/// Serialized layout of one entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    fetch_date: DateTime<Utc>,
    guild_id: String,
    channel_id: String,
    time_span_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    message_count: usize,
    messages: Vec<Message>,
}
