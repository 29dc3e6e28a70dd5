//! Normalization of raw submission fields.

/// Longest nickname kept, in characters.
pub const MAX_NICKNAME_CHARS: usize = 30;

/// Longest token kept, in characters.
pub const MAX_TOKEN_CHARS: usize = 500;

/// Nickname used when the submitted one is blank.
pub const DEFAULT_NICKNAME: &str = "Anonymous";

/// Trim, cap at [`MAX_NICKNAME_CHARS`] and fall back to `placeholder` when
/// nothing is left.
///
/// # Examples
///
/// ```
/// use tokenfeed_core::normalize_nickname;
///
/// assert_eq!(normalize_nickname("  Al  ", "Anonymous"), "Al");
/// assert_eq!(normalize_nickname("   ", "Anonymous"), "Anonymous");
/// ```
pub fn normalize_nickname(raw: &str, placeholder: &str) -> String {
    let nickname = truncate_chars(raw.trim(), MAX_NICKNAME_CHARS);
    if nickname.is_empty() {
        truncate_chars(placeholder, MAX_NICKNAME_CHARS).to_string()
    } else {
        nickname.to_string()
    }
}

/// Trim and cap at [`MAX_TOKEN_CHARS`].
pub fn normalize_token(raw: &str) -> String {
    truncate_chars(raw.trim(), MAX_TOKEN_CHARS).to_string()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
