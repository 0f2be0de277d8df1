// Bounded Hand-off Queue

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit, TryAcquireError};
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::error::{PutError, QueueError, Result};

/// Fixed-capacity FIFO hand-off between producer and consumer tasks.
///
/// `put` suspends while the queue is full and `take` suspends while it is
/// empty; neither busy-waits. Items leave in exactly the order they entered,
/// and each item is delivered to exactly one consumer. The queue makes no
/// promise about which of several waiting tasks is woken first.
///
/// Accounting follows the two-semaphore scheme: `slots` starts with one
/// permit per free slot, `items` with none. A `put` turns a slot permit into
/// an item permit; a `take` does the reverse. The buffer itself is only
/// touched under the mutex, and the mutex is never held across an `.await`,
/// so every suspension happens before any state changes. Dropping a pending
/// `put` or `take` future therefore leaves the queue exactly as it was.
pub struct BoundedQueue<T> {
    capacity: usize,
    buffer: Mutex<VecDeque<T>>,
    slots: Semaphore,
    items: Semaphore,
    len: AtomicUsize,
    closed: AtomicBool,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// Fails with [`QueueError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            len: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Maximum number of items the queue can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the current item count.
    ///
    /// Advisory only: the value may be stale the moment it returns. Never
    /// use it to decide whether a `put` or `take` would block.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    /// Whether the snapshot count is zero (advisory, see [`len`](Self::len))
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Insert `item` at the tail, suspending while the queue is full.
    ///
    /// Fails with [`PutError::Closed`] once the queue is closed, handing the
    /// item back. Cancel-safe: dropping the future before it completes
    /// enqueues nothing.
    pub async fn put(&self, item: T) -> Result<(), PutError<T>> {
        match self.slots.acquire().await {
            Ok(permit) => {
                self.commit_put(permit, item);
                Ok(())
            }
            Err(_) => Err(PutError::Closed(item)),
        }
    }

    /// Insert `item` without suspending.
    ///
    /// Fails with [`PutError::Full`] when no slot is free right now.
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        match self.slots.try_acquire() {
            Ok(permit) => {
                self.commit_put(permit, item);
                Ok(())
            }
            Err(TryAcquireError::NoPermits) => Err(PutError::Full(item)),
            Err(TryAcquireError::Closed) => Err(PutError::Closed(item)),
        }
    }

    /// Insert `item`, suspending at most `timeout`.
    ///
    /// Fails with [`PutError::TimedOut`] when the deadline passes first; the
    /// item is handed back and the queue is untouched.
    pub async fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        match tokio::time::timeout(timeout, self.slots.acquire()).await {
            Ok(Ok(permit)) => {
                self.commit_put(permit, item);
                Ok(())
            }
            Ok(Err(_)) => Err(PutError::Closed(item)),
            Err(_) => Err(PutError::TimedOut(item)),
        }
    }

    /// Insert `item`, giving up when `token` fires.
    ///
    /// Fails with [`PutError::Cancelled`] when cancellation wins the race;
    /// the item is handed back and the queue is untouched.
    pub async fn put_cancellable(&self, item: T, token: &CancelToken) -> Result<(), PutError<T>> {
        if token.is_cancelled() {
            return Err(PutError::Cancelled(item));
        }
        tokio::select! {
            acquired = self.slots.acquire() => match acquired {
                Ok(permit) => {
                    self.commit_put(permit, item);
                    Ok(())
                }
                Err(_) => Err(PutError::Closed(item)),
            },
            _ = token.cancelled() => Err(PutError::Cancelled(item)),
        }
    }

    /// Remove and return the head item, suspending while the queue is empty.
    ///
    /// After [`close`](Self::close), keeps returning buffered items until the
    /// queue is drained, then fails with [`QueueError::Closed`]. Each item is
    /// returned to exactly one caller.
    pub async fn take(&self) -> Result<T> {
        match self.items.acquire().await {
            Ok(permit) => self.claim_item(permit),
            Err(_) => self.drain_or_closed(),
        }
    }

    /// Remove the head item without suspending.
    ///
    /// Fails with [`QueueError::Empty`] when nothing is buffered right now.
    pub fn try_take(&self) -> Result<T> {
        match self.items.try_acquire() {
            Ok(permit) => self.claim_item(permit),
            Err(TryAcquireError::NoPermits) => Err(QueueError::Empty),
            Err(TryAcquireError::Closed) => self.drain_or_closed(),
        }
    }

    /// Remove the head item, suspending at most `timeout`.
    pub async fn take_timeout(&self, timeout: Duration) -> Result<T> {
        match tokio::time::timeout(timeout, self.items.acquire()).await {
            Ok(Ok(permit)) => self.claim_item(permit),
            Ok(Err(_)) => self.drain_or_closed(),
            Err(_) => Err(QueueError::TimedOut),
        }
    }

    /// Remove the head item, giving up when `token` fires.
    pub async fn take_cancellable(&self, token: &CancelToken) -> Result<T> {
        if token.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        tokio::select! {
            acquired = self.items.acquire() => match acquired {
                Ok(permit) => self.claim_item(permit),
                Err(_) => self.drain_or_closed(),
            },
            _ = token.cancelled() => Err(QueueError::Cancelled),
        }
    }

    /// Stop accepting items. Idempotent, one-way.
    ///
    /// Producers waiting for a slot fail with `Closed`; a `put` that already
    /// held a slot permit still completes. Consumers keep draining whatever
    /// is buffered and observe `Closed` only once the queue is empty.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.slots.close();
        self.items.close();
        debug!(remaining = self.len(), "queue closed");
    }

    // The critical sections below never panic, so a poisoned mutex can only
    // mean a panic elsewhere in the holder's stack; the buffer is still
    // consistent and safe to reuse.
    fn state(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Append under the mutex, then convert the slot permit into an item
    // permit. Runs strictly after the last suspension point of every put
    // variant: once called, the insert cannot be half-done.
    fn commit_put(&self, permit: SemaphorePermit<'_>, item: T) {
        let mut buf = self.state();
        buf.push_back(item);
        self.len.store(buf.len(), Ordering::SeqCst);
        trace!(len = buf.len(), "item enqueued");
        drop(buf);
        permit.forget();
        self.items.add_permits(1);
    }

    fn claim_item(&self, permit: SemaphorePermit<'_>) -> Result<T> {
        permit.forget();
        match self.pop_item() {
            Some(item) => Ok(item),
            // The item permit guarantees a buffered item while the queue is
            // open. Coming up empty means close() raced us and a draining
            // consumer already took it.
            None => Err(QueueError::Closed),
        }
    }

    fn drain_or_closed(&self) -> Result<T> {
        match self.pop_item() {
            Some(item) => Ok(item),
            None => Err(QueueError::Closed),
        }
    }

    // Pop under the mutex and free the slot. Item permits are not tracked
    // here: the open-queue paths consume theirs via claim_item, and after
    // close() the permit counts stop mattering.
    fn pop_item(&self) -> Option<T> {
        let mut buf = self.state();
        let item = buf.pop_front()?;
        self.len.store(buf.len(), Ordering::SeqCst);
        trace!(len = buf.len(), "item dequeued");
        drop(buf);
        self.slots.add_permits(1);
        Some(item)
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
