// Producer - feeds the shared queue until cancelled

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use handoff_core::{BoundedQueue, CancelToken, PutError};

use crate::constants::{PRODUCE_INTERVAL, VALUE_RANGE};
use crate::message::Message;

/// Producer loop generating random-valued messages
pub struct Producer {
    id: usize,
    queue: Arc<BoundedQueue<Message>>,
    produced: Arc<AtomicU64>,
}

impl Producer {
    pub fn new(id: usize, queue: Arc<BoundedQueue<Message>>, produced: Arc<AtomicU64>) -> Self {
        Self {
            id,
            queue,
            produced,
        }
    }

    /// Run until the token fires or the queue closes.
    ///
    /// A full queue suspends this loop inside `put_cancellable`; that is the
    /// backpressure doing its job, not an error.
    pub async fn run(&self, token: CancelToken) {
        info!(producer = self.id, "Producer started");
        let mut seq: u64 = 0;
        loop {
            let value = rand::thread_rng().gen_range(0..VALUE_RANGE);
            let message = Message::new(seq, self.id, value);

            match self.queue.put_cancellable(message, &token).await {
                Ok(()) => {
                    seq += 1;
                    let total = self.produced.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(producer = self.id, seq, value, total, "Produced");
                }
                Err(PutError::Cancelled(_)) => break,
                Err(err) => {
                    warn!(producer = self.id, error = %err, "Queue stopped accepting messages");
                    break;
                }
            }

            tokio::select! {
                _ = sleep(PRODUCE_INTERVAL) => {}
                _ = token.cancelled() => break,
            }
        }
        info!(producer = self.id, sent = seq, "Producer stopped");
    }
}
