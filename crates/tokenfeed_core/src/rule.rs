//! The embedded-number acceptance rule.
//!
//! A token qualifies when it carries at least one *isolated* three-digit
//! number that is at least [`ACCEPTANCE_THRESHOLD`]. Isolated means the
//! three digits are bounded on both sides by a non-digit or the edge of the
//! string, so `1234` or `x12345y` never yield a three-digit number.
//!
//! Only ASCII digits count. Other Unicode digits are treated as non-digits.

/// Smallest qualifying number a token must carry to be accepted.
pub const ACCEPTANCE_THRESHOLD: u16 = 800;

/// Why a token was turned away.
///
/// Rejections are reported verbatim to the submitting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Rejection {
    /// The token is empty or whitespace only
    #[display("token empty")]
    Empty,
    /// No isolated three-digit run exists in the token
    #[display("no three-digit number found")]
    NoThreeDigitNumber,
    /// Every qualifying number is below the threshold; carries the first one
    #[display("number below threshold: {} < {}", _0, ACCEPTANCE_THRESHOLD)]
    BelowThreshold(u16),
}

/// Collect every isolated three-digit number in `text`, left to right.
///
/// Duplicates are kept.
///
/// # Examples
///
/// ```
/// use tokenfeed_core::rule::extract_qualifying_numbers;
///
/// assert_eq!(extract_qualifying_numbers("abc801x 123 801"), vec![801, 123, 801]);
/// assert!(extract_qualifying_numbers("1234 x12345y").is_empty());
/// ```
pub fn extract_qualifying_numbers(text: &str) -> Vec<u16> {
    let bytes = text.as_bytes();
    let mut numbers = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() {
            start += 1;
            continue;
        }

        // `start` opens a maximal digit run: the byte before it is a non-digit
        // or the string boundary.
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }

        if end - start == 3 {
            let value = bytes[start..end]
                .iter()
                .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
            numbers.push(value);
        }

        start = end;
    }

    numbers
}

/// Decide whether `token` qualifies, returning its numbers on acceptance.
///
/// The returned numbers are exactly [`extract_qualifying_numbers`] of the
/// same token.
///
/// # Examples
///
/// ```
/// use tokenfeed_core::{Rejection, rule::qualifies};
///
/// assert_eq!(qualifies("room801"), Ok(vec![801]));
/// assert_eq!(qualifies("abc123"), Err(Rejection::BelowThreshold(123)));
/// ```
pub fn qualifies(token: &str) -> Result<Vec<u16>, Rejection> {
    if token.trim().is_empty() {
        return Err(Rejection::Empty);
    }

    let numbers = extract_qualifying_numbers(token);
    let Some(&first) = numbers.first() else {
        return Err(Rejection::NoThreeDigitNumber);
    };

    if numbers.iter().any(|&n| n >= ACCEPTANCE_THRESHOLD) {
        Ok(numbers)
    } else {
        Err(Rejection::BelowThreshold(first))
    }
}

/// Validate `token` without keeping the extracted numbers.
pub fn validate(token: &str) -> Result<(), Rejection> {
    qualifies(token).map(|_| ())
}
