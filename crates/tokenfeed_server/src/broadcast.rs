//! Feed fan-out to connected observers.

use std::sync::Arc;
use tokenfeed_core::FeedSnapshot;
use tokenfeed_error::TokenfeedResult;
use tokenfeed_storage::FeedStore;
use tokio::sync::{
    Mutex, MutexGuard,
    broadcast::{
        self,
        error::{RecvError, TryRecvError},
    },
};
use tracing::{debug, instrument};

/// Publishes whole-feed snapshots to every connected observer.
///
/// Every message is the complete ordered feed, so an observer that falls
/// behind can skip to the newest snapshot without losing anything.
///
/// Writers that append and then publish hold [`Broadcaster::sequence`] for
/// the whole step. [`Broadcaster::connect`] takes the same lock, so an
/// observer's initial snapshot is never older than a publish still queued
/// on its subscription.
pub struct Broadcaster {
    store: Arc<dyn FeedStore>,
    sender: broadcast::Sender<FeedSnapshot>,
    sequence: Mutex<()>,
}

impl Broadcaster {
    /// Create a broadcaster reading snapshots from `store`.
    ///
    /// `buffer` is how many snapshots an observer may fall behind before it
    /// starts skipping. Zero is treated as one.
    pub fn new(store: Arc<dyn FeedStore>, buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self {
            store,
            sender,
            sequence: Mutex::new(()),
        }
    }

    /// Exclusive access to the feed's publish order.
    ///
    /// Hold the guard from the store write until the resulting feed has been
    /// published.
    pub async fn sequence(&self) -> MutexGuard<'_, ()> {
        self.sequence.lock().await
    }

    /// Register an observer for future publishes only.
    pub fn subscribe(&self) -> FeedSubscription {
        FeedSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Register an observer and read its initial snapshot.
    ///
    /// Subscribing and reading happen under [`Broadcaster::sequence`]: every
    /// publish lands either in the initial snapshot or after it on the
    /// subscription. The subscription is returned even when the read fails.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> (FeedSubscription, TokenfeedResult<FeedSnapshot>) {
        let (subscription, initial) = {
            let _sequence = self.sequence().await;
            let subscription = self.subscribe();
            (subscription, self.refresh().await)
        };
        debug!(observers = self.observer_count(), "Observer connected");
        (subscription, initial)
    }

    /// Current feed for a single observer. Nothing is broadcast.
    pub async fn refresh(&self) -> TokenfeedResult<FeedSnapshot> {
        let posts = self.store.list().await?;
        Ok(FeedSnapshot::from(posts))
    }

    /// Send `feed` to every connected observer.
    ///
    /// Returns how many observers were reached. Having none is not an error.
    pub fn publish(&self, feed: FeedSnapshot) -> usize {
        let size = feed.len();
        let reached = self.sender.send(feed).unwrap_or(0);
        debug!(reached, size, "Published feed");
        reached
    }

    /// Number of live subscriptions.
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One observer's stream of feed snapshots.
///
/// Dropping it disconnects the observer.
pub struct FeedSubscription {
    receiver: broadcast::Receiver<FeedSnapshot>,
}

impl FeedSubscription {
    /// Wait for the next snapshot.
    ///
    /// After falling behind, returns the newest buffered snapshot and drops
    /// the older ones. Returns `None` once the broadcaster is gone.
    pub async fn next(&mut self) -> Option<FeedSnapshot> {
        loop {
            match self.receiver.recv().await {
                Ok(feed) => return Some(feed),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Observer lagged, skipping to newest feed");
                    if let Some(feed) = self.drain() {
                        return Some(feed);
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take a snapshot if one is already waiting.
    pub fn try_next(&mut self) -> Option<FeedSnapshot> {
        match self.receiver.try_recv() {
            Ok(feed) => Some(feed),
            Err(TryRecvError::Lagged(skipped)) => {
                debug!(skipped, "Observer lagged, skipping to newest feed");
                self.drain()
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    fn drain(&mut self) -> Option<FeedSnapshot> {
        let mut newest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(feed) => newest = Some(feed),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return newest,
            }
        }
    }
}
