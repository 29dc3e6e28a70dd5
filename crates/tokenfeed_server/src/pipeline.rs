//! Validate, persist and publish one submission at a time.

use crate::{Broadcaster, PipelineMetrics};
use std::sync::Arc;
use tokenfeed_core::{NewPost, Post, Rejection, normalize_nickname, normalize_token, rule};
use tokenfeed_error::TokenfeedError;
use tokenfeed_storage::FeedStore;
use tracing::{debug, error, info, instrument};

/// What a client is told when a submission fails for reasons of its own.
pub const PROCESSING_FAILED: &str = "processing failed, retry later";

/// Why a submission did not produce a post.
#[derive(Debug, derive_more::Display)]
pub enum SubmitError {
    /// The token broke the acceptance rule
    #[display("{}", _0)]
    Rejected(Rejection),
    /// The feed store failed; nothing was published
    #[display("{}", _0)]
    Failed(TokenfeedError),
}

impl SubmitError {
    /// Text safe to show the submitting client.
    ///
    /// Rejections are reported as-is. Backend failures are reduced to
    /// [`PROCESSING_FAILED`].
    pub fn client_message(&self) -> String {
        match self {
            Self::Rejected(rejection) => rejection.to_string(),
            Self::Failed(_) => PROCESSING_FAILED.to_string(),
        }
    }

    /// The rejection, when the token was at fault.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(rejection) => Some(*rejection),
            Self::Failed(_) => None,
        }
    }
}

/// Turns raw submissions into stored, broadcast posts.
///
/// Accepted submissions are serialized on the broadcaster's sequence lock:
/// each one appends, re-reads the canonical feed and publishes it before the
/// next one starts, so every observer sees feeds in acceptance order.
pub struct PostPipeline {
    store: Arc<dyn FeedStore>,
    broadcaster: Arc<Broadcaster>,
    metrics: PipelineMetrics,
    default_nickname: String,
}

impl PostPipeline {
    /// Wire a pipeline to its store and broadcaster.
    pub fn new(
        store: Arc<dyn FeedStore>,
        broadcaster: Arc<Broadcaster>,
        metrics: PipelineMetrics,
        default_nickname: impl Into<String>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            metrics,
            default_nickname: default_nickname.into(),
        }
    }

    /// Validate and, when the token qualifies, store and publish a post.
    ///
    /// Rejected submissions touch neither the store nor the observers.
    #[instrument(skip_all)]
    pub async fn submit(&self, nickname: &str, token: &str) -> Result<Post, SubmitError> {
        let nickname = normalize_nickname(nickname, &self.default_nickname);
        let token = normalize_token(token);

        let numbers = match rule::qualifies(&token) {
            Ok(numbers) => numbers,
            Err(rejection) => {
                self.metrics.record_rejected();
                debug!(%rejection, "Submission rejected");
                return Err(SubmitError::Rejected(rejection));
            }
        };

        let _sequence = self.broadcaster.sequence().await;

        let (post, feed) = match self
            .store
            .append_then_list(NewPost::new(nickname, token, numbers))
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                self.metrics.record_failed();
                error!(error = %e, backend = self.store.backend_name(), "Failed to store submission");
                return Err(SubmitError::Failed(e));
            }
        };

        let reached = self.broadcaster.publish(feed.into());
        self.metrics.record_accepted();
        info!(id = post.id(), numbers = ?post.numbers(), reached, "Post accepted");

        Ok(post)
    }

    /// The broadcaster this pipeline publishes to.
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// The store this pipeline writes to.
    pub fn store(&self) -> &Arc<dyn FeedStore> {
        &self.store
    }

    /// Counters this pipeline records into.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }
}
