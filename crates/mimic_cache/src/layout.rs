//! File naming for cache entries.
//!
//! ```text
//! cache/
//! ├── guild_{guild}_channel_{channel}_{months}m.json
//! └── user_{user}_guild_{guild}_channel_{channel}_{months}m.json
//! ```
//!
//! Identity fields are escaped so `_` only ever appears as a separator:
//! ASCII letters, digits and `-` pass through, every other byte becomes
//! `%XX`. Distinct keys therefore map to distinct names, and every name maps
//! back to exactly one key.

use mimic_core::CacheKey;
use mimic_error::{CacheError, CacheErrorKind, MimicResult};

const EXTENSION: &str = ".json";

/// File name for `key`.
///
/// # Examples
///
/// ```
/// use mimic_cache::file_name;
/// use mimic_core::CacheKey;
///
/// assert_eq!(file_name(&CacheKey::guild("10", "20", 3)), "guild_10_channel_20_3m.json");
/// assert_eq!(
///     file_name(&CacheKey::user("7", "10", "20", 3)),
///     "user_7_guild_10_channel_20_3m.json"
/// );
/// ```
pub fn file_name(key: &CacheKey) -> String {
    let scope = key.scope();
    let base = format!(
        "guild_{}_channel_{}_{}m{}",
        escape(&scope.guild_id),
        escape(&scope.channel_id),
        scope.time_span_months,
        EXTENSION
    );
    match key.user_id() {
        Some(user_id) => format!("user_{}_{}", escape(user_id), base),
        None => base,
    }
}

/// Key addressed by a file name, or `None` for names this layout never writes.
pub fn parse_file_name(name: &str) -> Option<CacheKey> {
    let stem = name.strip_suffix(EXTENSION)?;
    let parts: Vec<&str> = stem.split('_').collect();
    match parts.as_slice() {
        ["guild", guild, "channel", channel, months] => Some(CacheKey::guild(
            unescape(guild)?,
            unescape(channel)?,
            parse_months(months)?,
        )),
        ["user", user, "guild", guild, "channel", channel, months] => Some(CacheKey::user(
            unescape(user)?,
            unescape(guild)?,
            unescape(channel)?,
            parse_months(months)?,
        )),
        _ => None,
    }
}

/// Reject keys with empty identity fields; they cannot be told apart on disk.
pub(crate) fn validate(key: &CacheKey) -> MimicResult<()> {
    let scope = key.scope();
    let empty = scope.guild_id.is_empty()
        || scope.channel_id.is_empty()
        || key.user_id().is_some_and(str::is_empty);
    if empty {
        return Err(CacheError::new(CacheErrorKind::InvalidKey(format!("empty identity in {key}"))).into());
    }
    Ok(())
}

fn parse_months(raw: &str) -> Option<u32> {
    let digits = raw.strip_suffix('m')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn unescape(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = raw.get(i + 1..i + 3)?;
                if !hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
                    return None;
                }
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if b.is_ascii_alphanumeric() || b == b'-' => {
                out.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_in_ids_does_not_collide() {
        let a = CacheKey::guild("1_channel_2", "3", 3);
        let b = CacheKey::guild("1", "2_channel_3", 3);
        assert_ne!(file_name(&a), file_name(&b));
        assert_eq!(parse_file_name(&file_name(&a)), Some(a));
        assert_eq!(parse_file_name(&file_name(&b)), Some(b));
    }

    #[test]
    fn test_user_prefix_is_exact() {
        let name = file_name(&CacheKey::user("123", "1", "2", 3));
        assert_eq!(parse_file_name(&name).and_then(|k| k.user_id().map(str::to_string)), Some("123".to_string()));
        assert_ne!(name, file_name(&CacheKey::user("12", "1", "2", 3)));
    }

    #[test]
    fn test_foreign_names_are_ignored() {
        assert_eq!(parse_file_name("guild_1_channel_2_3m.json.tmp"), None);
        assert_eq!(parse_file_name("notes.json"), None);
        assert_eq!(parse_file_name("guild_1_channel_2_xm.json"), None);
        assert_eq!(parse_file_name("guild__channel_2_3m.json"), None);
    }

    #[test]
    fn test_non_ascii_ids_round_trip() {
        let key = CacheKey::user("naïve user", "g.1", "c/2", 12);
        let name = file_name(&key);
        assert!(!name.contains('/'));
        assert_eq!(parse_file_name(&name), Some(key));
    }
}
