//! Core data types and the token acceptance rule for tokenfeed.
//!
//! This crate is pure: no I/O, no async. It defines what a [`Post`] is,
//! how a raw submission is normalized, and whether a token qualifies.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod post;
pub mod rule;
mod submission;

pub use post::{FeedSnapshot, NewPost, Post};
pub use rule::{ACCEPTANCE_THRESHOLD, Rejection};
pub use submission::{
    DEFAULT_NICKNAME, MAX_NICKNAME_CHARS, MAX_TOKEN_CHARS, normalize_nickname, normalize_token,
};
