//! Error types for tokenfeed.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! Validation rejections are not errors. They are domain values living in
//! `tokenfeed_core` and never pass through this crate.
//!
//! # Examples
//!
//! ```
//! use tokenfeed_error::{StorageError, StorageErrorKind, TokenfeedResult};
//!
//! fn open() -> TokenfeedResult<()> {
//!     Err(StorageError::new(StorageErrorKind::Unavailable("no route to host".into())))?
//! }
//!
//! assert!(open().unwrap_err().to_string().contains("no route to host"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod server;
mod storage;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{TokenfeedError, TokenfeedErrorKind, TokenfeedResult};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
