//! Log-safe renderings of identities.

/// Keep the first and last four characters of an id.
///
/// ```
/// use mimic_core::redact_id;
///
/// assert_eq!(redact_id("123456789012345678"), "1234...5678");
/// assert_eq!(redact_id("42"), "****");
/// ```
pub fn redact_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.is_empty() {
        return "<none>".to_string();
    }
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Keep the first and last character of a name.
///
/// ```
/// use mimic_core::redact_name;
///
/// assert_eq!(redact_name("ferris"), "f****s");
/// assert_eq!(redact_name("al"), "al");
/// ```
pub fn redact_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= 2 {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    out.push(chars[0]);
    out.extend(std::iter::repeat_n('*', chars.len() - 2));
    out.push(chars[chars.len() - 1]);
    out
}
