// Close-and-drain behavior

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_test::{assert_pending, assert_ready, task};

use handoff_core::{BoundedQueue, PutError, QueueError};

#[tokio::test]
async fn test_close_wakes_blocked_producer_with_item_back() {
    let queue = BoundedQueue::new(1).unwrap();
    queue.put("a").await.unwrap();

    let mut blocked = task::spawn(queue.put("b"));
    assert_pending!(blocked.poll());

    queue.close();
    assert!(blocked.is_woken());
    match assert_ready!(blocked.poll()) {
        Err(PutError::Closed(item)) => assert_eq!(item, "b"),
        other => panic!("expected Closed, got {:?}", other),
    }
    drop(blocked);

    // The buffered item survives the close.
    assert_eq!(queue.take().await.unwrap(), "a");
    assert_eq!(queue.take().await.unwrap_err(), QueueError::Closed);
}

#[tokio::test]
async fn test_close_wakes_blocked_consumer() {
    let queue = BoundedQueue::<u32>::new(1).unwrap();

    let mut blocked = task::spawn(queue.take());
    assert_pending!(blocked.poll());

    queue.close();
    assert!(blocked.is_woken());
    assert_eq!(
        assert_ready!(blocked.poll()).unwrap_err(),
        QueueError::Closed
    );
}

#[tokio::test]
async fn test_non_blocking_calls_after_close() {
    let queue = BoundedQueue::new(2).unwrap();
    queue.put(1).await.unwrap();
    queue.close();

    match queue.try_put(2) {
        Err(PutError::Closed(item)) => assert_eq!(item, 2),
        other => panic!("expected Closed, got {:?}", other),
    }
    // try_take drains, then reports closed rather than empty.
    assert_eq!(queue.try_take().unwrap(), 1);
    assert_eq!(queue.try_take().unwrap_err(), QueueError::Closed);
}

/// Several consumers racing on the drain path still deliver each buffered
/// item exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_drain_after_close_delivers_each_item_once() {
    let queue = Arc::new(BoundedQueue::new(8).unwrap());
    for i in 0..8 {
        queue.put(i).await.unwrap();
    }
    queue.close();

    let mut consumers = JoinSet::new();
    for _ in 0..4 {
        let queue = Arc::clone(&queue);
        consumers.spawn(async move {
            let mut got = Vec::new();
            loop {
                match queue.take().await {
                    Ok(item) => got.push(item),
                    Err(QueueError::Closed) => break,
                    Err(err) => panic!("unexpected take error: {}", err),
                }
            }
            got
        });
    }

    let mut all = Vec::new();
    while let Some(result) = consumers.join_next().await {
        all.extend(result.unwrap());
    }
    all.sort_unstable();
    assert_eq!(all, (0..8).collect::<Vec<_>>());
}
