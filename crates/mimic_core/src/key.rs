//! Cache identity types.

use serde::{Deserialize, Serialize};

/// The channel-level part of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelScope {
    /// Guild (server) id
    pub guild_id: String,
    /// Channel id within the guild
    pub channel_id: String,
    /// Length of the rolling window in calendar months
    pub time_span_months: u32,
}

impl ChannelScope {
    /// Create a channel scope.
    pub fn new(guild_id: impl Into<String>, channel_id: impl Into<String>, time_span_months: u32) -> Self {
        Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
            time_span_months,
        }
    }
}

/// Identity of one cache entry.
///
/// The shape is part of identity: a guild-scope key and a user-scope key over
/// the same channel are never equal.
///
/// # Examples
///
/// ```
/// use mimic_core::CacheKey;
///
/// let guild = CacheKey::guild("1", "2", 3);
/// let user = guild.for_user("7");
/// assert_ne!(guild, user);
/// assert_eq!(user.guild_key(), guild);
/// assert_eq!(user.user_id(), Some("7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheKey {
    /// Every message in a channel window
    Guild(ChannelScope),
    /// One author's messages in a channel window
    User {
        /// Author the entry is narrowed to
        user_id: String,
        /// Channel window the messages came from
        scope: ChannelScope,
    },
}

impl CacheKey {
    /// Guild-scope key.
    pub fn guild(guild_id: impl Into<String>, channel_id: impl Into<String>, time_span_months: u32) -> Self {
        Self::Guild(ChannelScope::new(guild_id, channel_id, time_span_months))
    }

    /// User-scope key.
    pub fn user(
        user_id: impl Into<String>,
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
        time_span_months: u32,
    ) -> Self {
        Self::User {
            user_id: user_id.into(),
            scope: ChannelScope::new(guild_id, channel_id, time_span_months),
        }
    }

    /// The channel window this key covers.
    pub fn scope(&self) -> &ChannelScope {
        match self {
            Self::Guild(scope) => scope,
            Self::User { scope, .. } => scope,
        }
    }

    /// The narrowing author, for user-scope keys.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guild(_) => None,
            Self::User { user_id, .. } => Some(user_id),
        }
    }

    /// Whether this key is narrowed to one author.
    pub fn is_user_scope(&self) -> bool {
        matches!(self, Self::User { .. })
    }

    /// The guild-scope key over the same channel window.
    pub fn guild_key(&self) -> CacheKey {
        Self::Guild(self.scope().clone())
    }

    /// A user-scope key over the same channel window.
    pub fn for_user(&self, user_id: impl Into<String>) -> CacheKey {
        Self::User {
            user_id: user_id.into(),
            scope: self.scope().clone(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = self.scope();
        if let Some(user_id) = self.user_id() {
            write!(f, "user {user_id} ")?;
        }
        write!(
            f,
            "guild {} channel {} ({}m)",
            scope.guild_id, scope.channel_id, scope.time_span_months
        )
    }
}
