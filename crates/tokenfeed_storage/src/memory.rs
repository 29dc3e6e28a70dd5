//! In-memory feed store.

use crate::{FeedStore, check_capacity};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokenfeed_core::{NewPost, Post};
use tokenfeed_error::{StorageError, TokenfeedResult};
use tracing::{debug, instrument};

/// Feed store kept entirely in process memory.
///
/// Posts live in a deque with the newest at the front, so eviction is a
/// truncate of the back. The lock is never held across an await point.
pub struct MemoryFeedStore {
    capacity: usize,
    inner: Mutex<MemoryFeed>,
}

struct MemoryFeed {
    posts: VecDeque<Post>,
    next_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl MemoryFeedStore {
    /// Create an empty store retaining at most `capacity` posts.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, StorageError> {
        let capacity = check_capacity(capacity)?;
        debug!(capacity, "Creating in-memory feed store");
        Ok(Self {
            capacity,
            inner: Mutex::new(MemoryFeed {
                posts: VecDeque::with_capacity(capacity + 1),
                next_id: 1,
                last_created_at: None,
            }),
        })
    }

    /// Number of posts currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().posts.len()
    }

    /// Whether the store holds no posts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MemoryFeed {
    fn push(&mut self, post: NewPost, capacity: usize) -> Post {
        let id = self.next_id;
        self.next_id += 1;

        // The wall clock may step backwards; the feed order may not.
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(created_at);

        let stored = Post::from_new(id, post, created_at);
        self.posts.push_front(stored.clone());

        let evicted = self.posts.len().saturating_sub(capacity);
        self.posts.truncate(capacity);

        debug!(id, evicted, size = self.posts.len(), "Appended post");
        stored
    }

    fn snapshot(&self) -> Vec<Post> {
        self.posts.iter().cloned().collect()
    }
}

#[async_trait::async_trait]
impl FeedStore for MemoryFeedStore {
    #[instrument(skip(self, post), fields(backend = "memory"))]
    async fn append(&self, post: NewPost) -> TokenfeedResult<Post> {
        Ok(self.inner.lock().push(post, self.capacity))
    }

    async fn list(&self) -> TokenfeedResult<Vec<Post>> {
        Ok(self.inner.lock().snapshot())
    }

    #[instrument(skip(self, post), fields(backend = "memory"))]
    async fn append_then_list(&self, post: NewPost) -> TokenfeedResult<(Post, Vec<Post>)> {
        let mut feed = self.inner.lock();
        let stored = feed.push(post, self.capacity);
        Ok((stored, feed.snapshot()))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
