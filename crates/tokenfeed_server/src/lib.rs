//! Post pipeline, feed broadcaster and WebSocket server for tokenfeed.
//!
//! A submission flows through [`PostPipeline::submit`]: it is normalized,
//! checked against the token rule, appended to the configured
//! [`FeedStore`](tokenfeed_storage::FeedStore), and the resulting feed is
//! published by the [`Broadcaster`] to every connected observer.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tokenfeed_server::{Broadcaster, PipelineMetrics, PostPipeline};
//! use tokenfeed_storage::{FeedStore, MemoryFeedStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store: Arc<dyn FeedStore> = Arc::new(MemoryFeedStore::new(500).unwrap());
//! let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&store), 64));
//! let pipeline = PostPipeline::new(store, broadcaster, PipelineMetrics::new(), "Anonymous");
//!
//! let post = pipeline.submit("", "room 801").await.unwrap();
//! assert_eq!(post.nickname(), "Anonymous");
//! assert!(pipeline.submit("Al", "room 123").await.is_err());
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod broadcast;
mod config;
mod metrics;
mod observability;
mod pipeline;
pub mod protocol;
mod transport;

pub use app::{build_state, open_feed_store, run, serve};
pub use broadcast::{Broadcaster, FeedSubscription};
pub use config::{
    FeedSettings, LoggingSettings, ServerSettings, StorageBackend, StorageSettings,
    TokenfeedConfig,
};
pub use metrics::{MetricsSnapshot, PipelineMetrics, SubmissionSnapshot};
pub use observability::{ObservabilityGuard, init_observability};
pub use pipeline::{PROCESSING_FAILED, PostPipeline, SubmitError};
pub use transport::{AppState, create_router};
