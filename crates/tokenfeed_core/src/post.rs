//! Post types shared by the stores, the pipeline and the transport.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An accepted post as it lives in the feed.
///
/// Posts are immutable. Only a feed store creates them, assigning `id` and
/// `created_at` at acceptance time.
///
/// Serializes with camelCase keys and `createdAt` as epoch milliseconds.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tokenfeed_core::Post;
///
/// let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
/// let post = Post::new(1, "Al", "room801", vec![801], created_at);
/// assert_eq!(post.numbers(), &[801]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: i64,
    nickname: String,
    token: String,
    numbers: Vec<u16>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

impl Post {
    /// Assemble a post from stored fields.
    pub fn new(
        id: i64,
        nickname: impl Into<String>,
        token: impl Into<String>,
        numbers: Vec<u16>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            token: token.into(),
            numbers,
            created_at,
        }
    }

    /// Build the post a store keeps for `new_post`.
    pub fn from_new(id: i64, new_post: NewPost, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            nickname: new_post.nickname,
            token: new_post.token,
            numbers: new_post.numbers,
            created_at,
        }
    }

    /// Feed ordering key: newer first, higher id first on equal timestamps.
    pub fn feed_order(&self, other: &Self) -> std::cmp::Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// A validated submission waiting for the store to assign id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NewPost {
    nickname: String,
    token: String,
    numbers: Vec<u16>,
}

impl NewPost {
    /// Create a new post from normalized fields and its qualifying numbers.
    pub fn new(nickname: impl Into<String>, token: impl Into<String>, numbers: Vec<u16>) -> Self {
        Self {
            nickname: nickname.into(),
            token: token.into(),
            numbers,
        }
    }
}

/// The full ordered feed at one point in time, newest first.
///
/// Shared between every observer of a broadcast, so it is reference counted.
pub type FeedSnapshot = Arc<[Post]>;
