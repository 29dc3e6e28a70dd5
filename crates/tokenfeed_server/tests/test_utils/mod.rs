//! Test utilities for tokenfeed server tests.
//!
//! Provides feed stores whose failures or reads can be controlled from the
//! test, and helpers to wire a pipeline around any store.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokenfeed_core::{NewPost, Post};
use tokenfeed_error::{StorageError, StorageErrorKind, TokenfeedResult};
use tokenfeed_server::{Broadcaster, PipelineMetrics, PostPipeline};
use tokenfeed_storage::{FeedStore, MemoryFeedStore};
use tokio::sync::Notify;

/// Memory store that fails on demand.
pub struct FlakyFeedStore {
    inner: MemoryFeedStore,
    fail_appends: AtomicBool,
    fail_lists: AtomicBool,
}

impl FlakyFeedStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: MemoryFeedStore::new(capacity).unwrap(),
            fail_appends: AtomicBool::new(false),
            fail_lists: AtomicBool::new(false),
        }
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Posts actually held, bypassing failure injection.
    pub fn stored(&self) -> usize {
        self.inner.len()
    }
}

fn unavailable() -> StorageError {
    StorageError::new(StorageErrorKind::Unavailable(
        "connection refused (password=hunter2)".to_string(),
    ))
}

#[async_trait]
impl FeedStore for FlakyFeedStore {
    async fn append(&self, post: NewPost) -> TokenfeedResult<Post> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(unavailable().into());
        }
        self.inner.append(post).await
    }

    async fn list(&self) -> TokenfeedResult<Vec<Post>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(unavailable().into());
        }
        self.inner.list().await
    }

    async fn append_then_list(&self, post: NewPost) -> TokenfeedResult<(Post, Vec<Post>)> {
        // Either failure aborts before anything is stored.
        if self.fail_appends.load(Ordering::SeqCst) || self.fail_lists.load(Ordering::SeqCst) {
            return Err(unavailable().into());
        }
        self.inner.append_then_list(post).await
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

/// Memory store whose next `list` can be held until the test releases it.
pub struct GatedFeedStore {
    inner: MemoryFeedStore,
    armed: AtomicBool,
    entered: Notify,
    released: Notify,
}

impl GatedFeedStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: MemoryFeedStore::new(capacity).unwrap(),
            armed: AtomicBool::new(false),
            entered: Notify::new(),
            released: Notify::new(),
        }
    }

    /// Hold the next `list` call at the gate.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Wait until a `list` call is held at the gate.
    pub async fn wait_at_gate(&self) {
        self.entered.notified().await;
    }

    /// Let the held `list` call read the feed.
    pub fn release(&self) {
        self.released.notify_one();
    }

    /// Posts actually held.
    pub fn stored(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl FeedStore for GatedFeedStore {
    async fn append(&self, post: NewPost) -> TokenfeedResult<Post> {
        self.inner.append(post).await
    }

    async fn list(&self) -> TokenfeedResult<Vec<Post>> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.released.notified().await;
        }
        self.inner.list().await
    }

    async fn append_then_list(&self, post: NewPost) -> TokenfeedResult<(Post, Vec<Post>)> {
        self.inner.append_then_list(post).await
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn backend_name(&self) -> &'static str {
        "gated"
    }
}

/// Pipeline over `store` with a 64-snapshot broadcast buffer.
pub fn pipeline_over(store: Arc<dyn FeedStore>) -> PostPipeline {
    let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&store), 64));
    PostPipeline::new(store, broadcaster, PipelineMetrics::new(), "Anonymous")
}

/// Pipeline over a fresh memory store.
pub fn memory_pipeline(capacity: usize) -> PostPipeline {
    pipeline_over(Arc::new(MemoryFeedStore::new(capacity).unwrap()))
}
