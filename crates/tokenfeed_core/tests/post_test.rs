//! Tests for post types and submission normalization.

use chrono::{TimeZone, Utc};
use tokenfeed_core::{
    DEFAULT_NICKNAME, MAX_NICKNAME_CHARS, NewPost, Post, normalize_nickname, normalize_token,
};

#[test]
fn test_post_serializes_for_clients() {
    let created_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let post = Post::new(7, "Al", "room801", vec![801], created_at);

    let json = serde_json::to_value(&post).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["nickname"], "Al");
    assert_eq!(json["token"], "room801");
    assert_eq!(json["numbers"], serde_json::json!([801]));
    assert_eq!(json["createdAt"], 1_700_000_000_123_i64);
}

#[test]
fn test_feed_order_newest_first_then_highest_id() {
    let t0 = Utc.timestamp_millis_opt(1_000).unwrap();
    let t1 = Utc.timestamp_millis_opt(2_000).unwrap();
    let mut posts = vec![
        Post::new(1, "a", "900", vec![900], t0),
        Post::new(3, "c", "902", vec![902], t1),
        Post::new(2, "b", "901", vec![901], t1),
    ];
    posts.sort_by(Post::feed_order);

    let ids: Vec<i64> = posts.iter().map(|p| *p.id()).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn test_from_new_keeps_submission_fields() {
    let created_at = Utc::now();
    let post = Post::from_new(5, NewPost::new("Al", "801", vec![801]), created_at);
    assert_eq!(*post.id(), 5);
    assert_eq!(post.nickname(), "Al");
    assert_eq!(post.token(), "801");
    assert_eq!(*post.created_at(), created_at);
}

#[test]
fn test_nickname_defaults_and_caps() {
    assert_eq!(normalize_nickname("", DEFAULT_NICKNAME), DEFAULT_NICKNAME);
    assert_eq!(normalize_nickname(" \t ", "guest"), "guest");

    let long = "x".repeat(45);
    assert_eq!(
        normalize_nickname(&long, DEFAULT_NICKNAME).len(),
        MAX_NICKNAME_CHARS
    );
}

#[test]
fn test_token_trimmed() {
    assert_eq!(normalize_token("  room801 \n"), "room801");
    assert_eq!(normalize_token("   "), "");
}
