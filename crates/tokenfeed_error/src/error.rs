//! Top-level error wrapper types.

use crate::{ConfigError, ServerError, StorageError};
#[cfg(feature = "database")]
use crate::DatabaseError;

/// Every failure a tokenfeed operation can report.
///
/// # Examples
///
/// ```
/// use tokenfeed_error::{ConfigError, TokenfeedError, TokenfeedErrorKind};
///
/// let err: TokenfeedError = ConfigError::new("capacity must be at least 1").into();
/// assert!(matches!(err.kind(), TokenfeedErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TokenfeedErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Feed store error
    #[from(StorageError)]
    Storage(StorageError),
    /// PostgreSQL error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Transport or process error
    #[from(ServerError)]
    Server(ServerError),
}

/// Tokenfeed error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tokenfeed Error: {}", _0)]
pub struct TokenfeedError(Box<TokenfeedErrorKind>);

impl TokenfeedError {
    /// Create a new error from a kind.
    pub fn new(kind: TokenfeedErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TokenfeedErrorKind {
        &self.0
    }
}

impl<T> From<T> for TokenfeedError
where
    T: Into<TokenfeedErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for tokenfeed operations.
pub type TokenfeedResult<T> = std::result::Result<T, TokenfeedError>;
