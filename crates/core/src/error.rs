// Central Error Types for the Queue

use std::fmt;

use thiserror::Error;

/// Take-side and construction error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    #[error("queue is empty")]
    Empty,

    #[error("timed out waiting for an item")]
    TimedOut,

    #[error("wait was cancelled")]
    Cancelled,

    #[error("queue is closed")]
    Closed,
}

/// Result type alias using QueueError by default
pub type Result<T, E = QueueError> = std::result::Result<T, E>;

/// Put-side error type.
///
/// Every variant hands the item that was not enqueued back to the caller,
/// so a failed `put` never destroys data. Implemented by hand rather than
/// derived so that none of the impls demand anything of `T`.
#[derive(Clone, PartialEq, Eq)]
pub enum PutError<T> {
    /// The queue was full and the call was non-blocking.
    Full(T),
    /// The wait for a free slot outlived its deadline.
    TimedOut(T),
    /// The wait for a free slot was cancelled.
    Cancelled(T),
    /// The queue no longer accepts items.
    Closed(T),
}

impl<T> PutError<T> {
    /// Recover the item that failed to enqueue.
    pub fn into_inner(self) -> T {
        match self {
            PutError::Full(item)
            | PutError::TimedOut(item)
            | PutError::Cancelled(item)
            | PutError::Closed(item) => item,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PutError::Full(_) => "queue is full",
            PutError::TimedOut(_) => "timed out waiting for a free slot",
            PutError::Cancelled(_) => "wait was cancelled",
            PutError::Closed(_) => "queue is closed",
        }
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PutError::Full(_) => "Full",
            PutError::TimedOut(_) => "TimedOut",
            PutError::Cancelled(_) => "Cancelled",
            PutError::Closed(_) => "Closed",
        };
        write!(f, "PutError::{}(..)", name)
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T> std::error::Error for PutError<T> {}
