//! Capped, ordered feed storage for tokenfeed.
//!
//! The [`FeedStore`] trait is the only way posts enter or leave the feed.
//! Backends are interchangeable: callers pick one at startup and never
//! branch on which one they hold.
//!
//! - [`MemoryFeedStore`]: process-local, lost on restart
//! - `tokenfeed_database::PostgresFeedStore`: durable
//!
//! # Example
//!
//! ```rust
//! use tokenfeed_core::NewPost;
//! use tokenfeed_storage::{FeedStore, MemoryFeedStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryFeedStore::new(500)?;
//! let post = store.append(NewPost::new("Al", "room801", vec![801])).await?;
//!
//! let feed = store.list().await?;
//! assert_eq!(feed[0], post);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod store;

pub use memory::MemoryFeedStore;
pub use store::{DEFAULT_CAPACITY, FeedStore, check_capacity};
pub use tokenfeed_error::{StorageError, StorageErrorKind};
