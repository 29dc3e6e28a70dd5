//! HTTP and WebSocket surface.
//!
//! # Endpoints
//!
//! - `GET /ws` - feed updates and submissions, see [`crate::protocol`]
//! - `GET /health` - liveness plus the storage backend in use
//! - `GET /metrics` - submission and connection counters

use crate::protocol::{ClientMessage, ServerMessage, SubmitAck};
use crate::{Broadcaster, PipelineMetrics, PostPipeline};
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;
use tokenfeed_core::{FeedSnapshot, Post};
use tokenfeed_error::TokenfeedResult;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Frames queued for one connection before senders wait.
const OUTBOX_CAPACITY: usize = 32;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<PostPipeline>,
}

impl AppState {
    /// Creates router state around a pipeline.
    pub fn new(pipeline: Arc<PostPipeline>) -> Self {
        Self { pipeline }
    }

    fn broadcaster(&self) -> &Broadcaster {
        self.pipeline.broadcaster()
    }

    fn metrics(&self) -> &PipelineMetrics {
        self.pipeline.metrics()
    }
}

/// Creates the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "backend": state.pipeline.store().backend_name()})),
    )
}

/// Get current metrics snapshot.
async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics().snapshot()))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive one observer connection.
///
/// A single writer task owns the socket sink. The initial feed, broadcast
/// feeds, refresh replies and acks all reach it through the outbox, so the
/// initial feed is always the first frame.
async fn handle_socket(socket: WebSocket, state: AppState) {
    state.metrics().record_connect();
    debug!("WebSocket client connected");

    let (mut sink, mut stream) = socket.split();
    let (outbox, mut outbox_rx) = mpsc::channel::<String>(OUTBOX_CAPACITY);

    let (mut subscription, initial) = state.broadcaster().connect().await;
    queue_feed(&outbox, &feed_or_empty(initial)).await;

    let writer = tokio::spawn(async move {
        while let Some(text) = outbox_rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break; // Client disconnected
            }
        }
    });

    let updates = outbox.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(feed) = subscription.next().await {
            if !queue_feed(&updates, &feed).await {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_frame(&state, &outbox, &text).await,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(error = %e, "WebSocket read failed");
                break;
            }
            _ => {} // Ping, pong and binary frames carry nothing for us
        }
    }

    forwarder.abort();
    writer.abort();
    state.metrics().record_disconnect();
    debug!("WebSocket client disconnected");
}

async fn handle_frame(state: &AppState, outbox: &mpsc::Sender<String>, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::NewPost {
            nickname,
            token,
            request_id,
        }) => {
            let pipeline = Arc::clone(&state.pipeline);
            let outbox = outbox.clone();
            // Detached so a disconnect cannot cancel a submission midway.
            tokio::spawn(async move {
                let result = pipeline
                    .submit(
                        nickname.as_deref().unwrap_or_default(),
                        token.as_deref().unwrap_or_default(),
                    )
                    .await;
                let ack = ServerMessage::Ack(SubmitAck::new(request_id, &result));
                queue(&outbox, &ack).await;
            });
        }
        Ok(ClientMessage::RequestPosts) => {
            let feed = feed_or_empty(state.broadcaster().refresh().await);
            queue_feed(outbox, &feed).await;
        }
        Err(e) => debug!(error = %e, "Ignoring unparseable frame"),
    }
}

fn feed_or_empty(feed: TokenfeedResult<FeedSnapshot>) -> FeedSnapshot {
    feed.unwrap_or_else(|e| {
        error!(error = %e, "Failed to read feed, sending an empty one");
        FeedSnapshot::from(Vec::<Post>::new())
    })
}

async fn queue_feed(outbox: &mpsc::Sender<String>, feed: &FeedSnapshot) -> bool {
    queue(outbox, &ServerMessage::PostsUpdate { posts: feed }).await
}

/// Returns false once the connection's writer is gone.
async fn queue(outbox: &mpsc::Sender<String>, message: &ServerMessage<'_>) -> bool {
    match message.to_json() {
        Ok(json) => outbox.send(json).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize server message");
            true
        }
    }
}
