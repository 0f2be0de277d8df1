// Consumer - drains the shared queue until it is closed and empty

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use handoff_core::{BoundedQueue, QueueError};

use crate::constants::CONSUME_INTERVAL;
use crate::message::Message;

/// Consumer loop handling messages off the shared queue
pub struct Consumer {
    id: usize,
    queue: Arc<BoundedQueue<Message>>,
    consumed: Arc<AtomicU64>,
}

impl Consumer {
    pub fn new(id: usize, queue: Arc<BoundedQueue<Message>>, consumed: Arc<AtomicU64>) -> Self {
        Self {
            id,
            queue,
            consumed,
        }
    }

    /// Run until the queue is closed and fully drained.
    ///
    /// Consumers take no cancellation token: shutdown reaches them as
    /// `Closed` once the producers are gone and the queue is closed, so no
    /// accepted message is ever dropped.
    pub async fn run(&self) {
        info!(consumer = self.id, "Consumer started");
        loop {
            match self.queue.take().await {
                Ok(message) => {
                    let total = self.consumed.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(consumer = self.id, message = %message, total, "Consumed");
                    sleep(CONSUME_INTERVAL).await;
                }
                Err(QueueError::Closed) => {
                    debug!(consumer = self.id, "Queue closed and drained");
                    break;
                }
                Err(err) => {
                    warn!(consumer = self.id, error = %err, "Take failed");
                    break;
                }
            }
        }
        info!(consumer = self.id, "Consumer stopped");
    }
}
