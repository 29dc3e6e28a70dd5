//! Tests for the three-digit acceptance rule.

use tokenfeed_core::rule::{extract_qualifying_numbers, qualifies, validate};
use tokenfeed_core::{ACCEPTANCE_THRESHOLD, Rejection};

#[test]
fn test_longer_digit_runs_never_yield_three_digits() {
    for token in ["1234", "x12345y", "99999", "a1234b5678c", "12 3456 78", "1801"] {
        assert!(
            extract_qualifying_numbers(token).is_empty(),
            "expected no qualifying numbers in {token:?}"
        );
    }
}

#[test]
fn test_short_runs_are_ignored() {
    assert!(extract_qualifying_numbers("1 22 x9").is_empty());
}

#[test]
fn test_runs_collected_in_order_with_duplicates() {
    assert_eq!(
        extract_qualifying_numbers("900-123/900 4567 850"),
        vec![900, 123, 900, 850]
    );
}

#[test]
fn test_whitespace_token_is_empty() {
    assert_eq!(validate(""), Err(Rejection::Empty));
    assert_eq!(validate("   \t\n"), Err(Rejection::Empty));
}

#[test]
fn test_no_isolated_run_is_distinct_from_below_threshold() {
    assert_eq!(validate("12345"), Err(Rejection::NoThreeDigitNumber));
    assert_eq!(validate("hello"), Err(Rejection::NoThreeDigitNumber));
    assert_eq!(validate("abc123"), Err(Rejection::BelowThreshold(123)));
}

#[test]
fn test_every_value_below_threshold_is_rejected_citing_it() {
    for value in 100..ACCEPTANCE_THRESHOLD {
        let token = format!("code{value}!");
        assert_eq!(validate(&token), Err(Rejection::BelowThreshold(value)));
    }
}

#[test]
fn test_every_value_at_or_above_threshold_is_accepted() {
    for value in ACCEPTANCE_THRESHOLD..=999 {
        let token = format!("room{value}");
        assert_eq!(qualifies(&token), Ok(vec![value]));
    }
}

#[test]
fn test_mixed_numbers_accepted_when_one_reaches_threshold() {
    assert_eq!(qualifies("123 then 801"), Ok(vec![123, 801]));
    assert_eq!(qualifies("999 and 100"), Ok(vec![999, 100]));
}

#[test]
fn test_qualifies_matches_extraction() {
    let token = "a801 b1234 c950 d7";
    assert_eq!(qualifies(token), Ok(extract_qualifying_numbers(token)));
}

#[test]
fn test_rejection_messages() {
    assert_eq!(Rejection::Empty.to_string(), "token empty");
    assert_eq!(
        Rejection::NoThreeDigitNumber.to_string(),
        "no three-digit number found"
    );
    assert_eq!(
        Rejection::BelowThreshold(123).to_string(),
        "number below threshold: 123 < 800"
    );
}
