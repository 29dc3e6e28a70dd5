//! Feed store trait definition.

use tokenfeed_core::{NewPost, Post};
use tokenfeed_error::{StorageError, StorageErrorKind, TokenfeedResult};

/// Posts retained when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 500;

/// Ordered, capped collection of accepted posts.
///
/// Implementations must uphold, for every caller:
/// - after `append` returns `Ok`, `list` already contains the new post;
/// - the store never holds more than [`capacity`](FeedStore::capacity)
///   posts, and eviction of the oldest excess happens inside `append`;
/// - `list` is ordered by `created_at` descending, then `id` descending;
/// - `created_at` never decreases as `id` grows.
#[async_trait::async_trait]
pub trait FeedStore: Send + Sync {
    /// Store a validated post, assigning its id and timestamp.
    ///
    /// Evicts the oldest posts beyond capacity as part of the same
    /// operation and returns the post as stored.
    async fn append(&self, post: NewPost) -> TokenfeedResult<Post>;

    /// Current feed, newest first, at most `capacity` posts.
    async fn list(&self) -> TokenfeedResult<Vec<Post>>;

    /// Append `post` and return it together with the feed that results.
    ///
    /// All or nothing: when this returns an error the post is not stored,
    /// and the feed returned on success is the one the append produced.
    async fn append_then_list(&self, post: NewPost) -> TokenfeedResult<(Post, Vec<Post>)>;

    /// Maximum number of posts retained.
    fn capacity(&self) -> usize;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Reject capacities a feed cannot work with.
pub fn check_capacity(capacity: usize) -> Result<usize, StorageError> {
    if capacity == 0 {
        return Err(StorageError::new(StorageErrorKind::InvalidCapacity(
            capacity,
        )));
    }
    Ok(capacity)
}
