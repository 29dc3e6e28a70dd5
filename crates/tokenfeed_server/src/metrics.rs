//! Counters for submissions and observer connections.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics collector shared by the pipeline and the transport.
///
/// Cloning is cheap; clones share the same counters.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    inner: Arc<PipelineMetricsInner>,
}

#[derive(Debug)]
struct PipelineMetricsInner {
    // Submission outcomes
    accepted: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,

    // Observer connections
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,

    last_accepted: parking_lot::Mutex<Option<Instant>>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    /// Creates a collector with every counter at zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PipelineMetricsInner {
                accepted: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                connections_opened: AtomicU64::new(0),
                connections_closed: AtomicU64::new(0),
                last_accepted: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Records an accepted and published post.
    pub fn record_accepted(&self) {
        self.inner.accepted.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_accepted.lock() = Some(Instant::now());
    }

    /// Records a submission turned away by the token rule.
    pub fn record_rejected(&self) {
        self.inner.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a submission lost to a backend failure.
    pub fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an observer connecting.
    pub fn record_connect(&self) {
        self.inner.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an observer disconnecting.
    pub fn record_disconnect(&self) {
        self.inner.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the accepted count.
    pub fn accepted(&self) -> u64 {
        self.inner.accepted.load(Ordering::Relaxed)
    }

    /// Gets the rejected count.
    pub fn rejected(&self) -> u64 {
        self.inner.rejected.load(Ordering::Relaxed)
    }

    /// Gets the failed count.
    pub fn failed(&self) -> u64 {
        self.inner.failed.load(Ordering::Relaxed)
    }

    /// Gets the number of observers currently connected.
    pub fn connected_observers(&self) -> u64 {
        let opened = self.inner.connections_opened.load(Ordering::Relaxed);
        let closed = self.inner.connections_closed.load(Ordering::Relaxed);
        opened.saturating_sub(closed)
    }

    /// Creates a serializable snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions: SubmissionSnapshot {
                accepted: self.accepted(),
                rejected: self.rejected(),
                failed: self.failed(),
                seconds_since_accept: self
                    .inner
                    .last_accepted
                    .lock()
                    .map(|instant| instant.elapsed().as_secs()),
            },
            connected_observers: self.connected_observers(),
            total_connections: self.inner.connections_opened.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of pipeline metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Submission outcome counters
    pub submissions: SubmissionSnapshot,
    /// Observers connected right now
    pub connected_observers: u64,
    /// Observers connected since startup
    pub total_connections: u64,
}

/// Serializable submission counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionSnapshot {
    /// Posts accepted and published
    pub accepted: u64,
    /// Submissions rejected by the token rule
    pub rejected: u64,
    /// Submissions lost to backend failures
    pub failed: u64,
    /// Seconds since the last accepted post
    pub seconds_since_accept: Option<u64>,
}
