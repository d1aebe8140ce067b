//! REST-backed Discord message source.

use super::conversions::{parse_snowflake, to_fetch_error, to_message};
use crate::MessageSource;
use async_trait::async_trait;
use mimic_core::{ChannelScope, Message};
use mimic_error::{FetchError, FetchErrorKind};
use serenity::all::{Channel, ChannelId, ChannelType, GetMessages, GuildId, MessageId};
use serenity::http::Http;
use std::sync::Arc;
use tracing::instrument;

/// Reads channel history through the Discord REST API.
#[derive(Clone)]
pub struct DiscordMessageSource {
    http: Arc<Http>,
}

impl DiscordMessageSource {
    /// Source authenticated with a bot token.
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
        }
    }

    /// Source sharing an existing HTTP client.
    pub fn with_http(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl std::fmt::Debug for DiscordMessageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordMessageSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageSource for DiscordMessageSource {
    #[instrument(skip(self), fields(before = before.is_some()))]
    async fn fetch_page(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>, FetchError> {
        let channel = ChannelId::new(parse_snowflake(channel_id)?.get());
        let mut request = GetMessages::new().limit(limit);
        if let Some(before) = before {
            request = request.before(MessageId::new(parse_snowflake(before)?.get()));
        }

        let page = channel
            .messages(self.http.as_ref(), request)
            .await
            .map_err(|e| to_fetch_error(e, &format!("channel {channel_id}")))?;

        page.iter().map(to_message).collect()
    }

    /// The channel must exist, belong to the guild, and be a text channel.
    #[instrument(skip(self, scope), fields(guild = %scope.guild_id, channel = %scope.channel_id))]
    async fn verify_scope(&self, scope: &ChannelScope) -> Result<(), FetchError> {
        let guild = GuildId::new(parse_snowflake(&scope.guild_id)?.get());
        let channel = ChannelId::new(parse_snowflake(&scope.channel_id)?.get());

        let found = self
            .http
            .get_channel(channel)
            .await
            .map_err(|e| to_fetch_error(e, &format!("channel {}", scope.channel_id)))?;

        match found {
            Channel::Guild(gc) if gc.guild_id == guild && gc.kind == ChannelType::Text => Ok(()),
            Channel::Guild(gc) if gc.guild_id != guild => Err(FetchError::new(
                FetchErrorKind::ScopeNotFound(format!(
                    "channel {} is not in guild {}",
                    scope.channel_id, scope.guild_id
                )),
            )),
            _ => Err(FetchError::new(FetchErrorKind::ScopeNotFound(format!(
                "channel {} is not a text channel",
                scope.channel_id
            )))),
        }
    }
}
