//! Message source abstraction.

use async_trait::async_trait;
use mimic_core::{ChannelScope, Message};
use mimic_error::FetchError;

/// Largest page a source is ever asked for.
pub const MAX_PAGE_SIZE: u8 = 100;

/// A cursor-paginated channel history.
///
/// Pages are delivered newest first; the last message of a page is the
/// oldest and its id is the cursor for the next request.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch up to `limit` messages older than `before` (or the newest
    /// messages when `before` is `None`).
    ///
    /// # Errors
    ///
    /// `Transient` when this one request failed, `ScopeNotFound` when the
    /// channel cannot be read at all.
    async fn fetch_page(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>, FetchError>;

    /// Check that the channel exists inside the guild and can be read.
    ///
    /// Sources that cannot tell accept every scope.
    async fn verify_scope(&self, _scope: &ChannelScope) -> Result<(), FetchError> {
        Ok(())
    }
}
