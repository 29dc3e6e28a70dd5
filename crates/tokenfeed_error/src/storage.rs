//! Feed store error types.

/// Kinds of feed store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// No backend connection could be obtained in time
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
    /// Store was configured with an unusable capacity
    #[display("Invalid capacity: {}", _0)]
    InvalidCapacity(usize),
    /// A blocking backend task panicked or was cancelled
    #[display("Storage task failed: {}", _0)]
    Task(String),
}

/// Feed store error with location tracking.
///
/// # Examples
///
/// ```
/// use tokenfeed_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::InvalidCapacity(0));
/// assert!(format!("{}", err).contains("Invalid capacity: 0"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
