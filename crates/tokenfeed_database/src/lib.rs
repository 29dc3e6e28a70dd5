//! PostgreSQL feed store for tokenfeed.
//!
//! # Features
//!
//! - Diesel-based PostgreSQL integration over an r2d2 pool
//! - Embedded migrations creating the `posts` table
//! - [`PostgresFeedStore`], the durable [`tokenfeed_storage::FeedStore`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tokenfeed_database::PostgresFeedStore;
//! use tokenfeed_storage::FeedStore;
//!
//! let store = PostgresFeedStore::connect(url, 8, timeout, 500).await?;
//! let feed = store.list().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
#[allow(missing_docs)]
mod models;
#[allow(missing_docs)]
pub mod schema;
mod store;

pub use connection::{PgPool, create_pool, run_migrations};
pub use models::{NewPostRow, PostRow};
pub use store::PostgresFeedStore;

use tokenfeed_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
