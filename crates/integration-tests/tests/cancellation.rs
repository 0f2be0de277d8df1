// Cancellation and timeout safety
//
// A wait that is abandoned - via token, deadline, or dropping the future -
// must leave the queue exactly as it was and hand put items back.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::{assert_pending, assert_ready, task};

use handoff_core::{cancel_channel, BoundedQueue, PutError, QueueError};

#[tokio::test]
async fn test_cancelling_blocked_put_leaves_queue_intact() {
    let queue = BoundedQueue::new(1).unwrap();
    queue.put("a").await.unwrap();

    let (source, token) = cancel_channel();
    let mut blocked = task::spawn(queue.put_cancellable("b", &token));
    assert_pending!(blocked.poll());

    source.cancel();
    assert!(blocked.is_woken());
    match assert_ready!(blocked.poll()) {
        Err(PutError::Cancelled(item)) => assert_eq!(item, "b"),
        other => panic!("expected Cancelled, got {:?}", other),
    }
    drop(blocked);

    // Nothing was inserted and the queue still works.
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.take().await.unwrap(), "a");
    queue.put("c").await.unwrap();
    assert_eq!(queue.take().await.unwrap(), "c");
}

#[tokio::test]
async fn test_cancelling_blocked_take_leaves_queue_intact() {
    let queue = BoundedQueue::<u32>::new(1).unwrap();
    let (source, token) = cancel_channel();

    let mut blocked = task::spawn(queue.take_cancellable(&token));
    assert_pending!(blocked.poll());

    source.cancel();
    assert!(blocked.is_woken());
    assert_eq!(
        assert_ready!(blocked.poll()).unwrap_err(),
        QueueError::Cancelled
    );
    drop(blocked);

    queue.put(9).await.unwrap();
    assert_eq!(queue.take().await.unwrap(), 9);
}

/// Dropping a pending put future is the implicit form of cancellation.
#[tokio::test]
async fn test_dropping_pending_put_enqueues_nothing() {
    let queue = BoundedQueue::new(1).unwrap();
    queue.put(1).await.unwrap();

    {
        let mut blocked = task::spawn(queue.put(2));
        assert_pending!(blocked.poll());
        // Dropped here, mid-wait.
    }

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.take().await.unwrap(), 1);
    // The abandoned wait gave its place back; a fresh put succeeds.
    queue.put(3).await.unwrap();
    assert_eq!(queue.take().await.unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_put_timeout_hands_the_item_back() {
    let queue = BoundedQueue::new(1).unwrap();
    queue.put("a").await.unwrap();

    match queue.put_timeout("b", Duration::from_millis(50)).await {
        Err(PutError::TimedOut(item)) => assert_eq!(item, "b"),
        other => panic!("expected TimedOut, got {:?}", other),
    }

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.take().await.unwrap(), "a");
}

#[tokio::test(start_paused = true)]
async fn test_take_timeout_expires_then_queue_still_works() {
    let queue = BoundedQueue::<u32>::new(2).unwrap();

    assert_eq!(
        queue.take_timeout(Duration::from_millis(50)).await.unwrap_err(),
        QueueError::TimedOut
    );

    queue.put(5).await.unwrap();
    assert_eq!(
        queue.take_timeout(Duration::from_millis(50)).await.unwrap(),
        5
    );
}

/// A deadline that outlives the contention succeeds instead of expiring.
#[tokio::test(start_paused = true)]
async fn test_put_timeout_succeeds_once_a_slot_frees_up() {
    let queue = Arc::new(BoundedQueue::new(1).unwrap());
    queue.put(1).await.unwrap();

    let taker = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            queue.take().await.unwrap()
        })
    };

    queue
        .put_timeout(2, Duration::from_millis(100))
        .await
        .unwrap();
    assert_eq!(taker.await.unwrap(), 1);
    assert_eq!(queue.take().await.unwrap(), 2);
}
