//! Conversions between serenity models and Mimic types.

use chrono::{DateTime, NaiveDateTime, Utc};
use mimic_core::{Author, Message};
use mimic_error::{FetchError, FetchErrorKind};
use std::num::NonZeroU64;

/// Parse a Discord snowflake.
///
/// Zero is rejected; serenity ids cannot hold it.
///
/// # Examples
///
/// ```
/// use mimic_social::parse_snowflake;
///
/// assert_eq!(parse_snowflake("80351110224678912").unwrap().get(), 80351110224678912);
/// assert!(parse_snowflake("0").is_err());
/// assert!(parse_snowflake("general").is_err());
/// ```
pub fn parse_snowflake(raw: &str) -> Result<NonZeroU64, FetchError> {
    raw.trim()
        .parse::<NonZeroU64>()
        .map_err(|e| FetchError::new(FetchErrorKind::InvalidId(format!("{raw}: {e}"))))
}

/// Parse an ISO 8601 timestamp as served by the Discord API.
///
/// Offsets are normalised to UTC; timestamps without one are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt.and_utc());
        }
    }
    Err(FetchError::new(FetchErrorKind::Transient(format!(
        "Invalid ISO 8601 timestamp: {raw}"
    ))))
}

/// Convert a serenity message, preferring the author's global display name.
pub(crate) fn to_message(message: &serenity::all::Message) -> Result<Message, FetchError> {
    let user = &message.author;
    let display_name = user.global_name.clone().unwrap_or_else(|| user.name.clone());
    Ok(Message::new(
        message.id.get().to_string(),
        message.content.clone(),
        parse_timestamp(&message.timestamp.to_string())?,
        Author::new(user.id.get().to_string(), display_name),
    ))
}

/// Classify a serenity error.
///
/// Missing or forbidden resources make the whole scope unreachable;
/// everything else is a failed request.
pub(crate) fn to_fetch_error(err: serenity::Error, context: &str) -> FetchError {
    if let serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response)) = &err
        && matches!(response.status_code.as_u16(), 403 | 404)
    {
        return FetchError::new(FetchErrorKind::ScopeNotFound(format!("{context}: {err}")));
    }
    FetchError::new(FetchErrorKind::Transient(format!("{context}: {err}")))
}
