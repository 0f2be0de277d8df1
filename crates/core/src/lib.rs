// Handoff Core - Bounded hand-off queue & cancellation utilities
// NO wiring or I/O here - only the primitive and its contract

pub mod cancel;
pub mod error;
pub mod queue;

pub use cancel::{cancel_channel, CancelSource, CancelToken};
pub use error::{PutError, QueueError, Result};
pub use queue::BoundedQueue;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
