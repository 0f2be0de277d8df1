//! Handoff Pipeline - Main Entry Point
//! Wires N producers and M consumers through one bounded queue

mod constants;
mod consumer;
mod message;
mod producer;

use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use handoff_core::{cancel_channel, BoundedQueue};

use constants::{DEFAULT_CAPACITY, DEFAULT_CONSUMERS, DEFAULT_PRODUCERS};
use consumer::Consumer;
use message::Message;
use producer::Producer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = std::env::var("HANDOFF_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("handoff=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Handoff Pipeline v{} starting...", VERSION);

    // 2. Load configuration
    let capacity = env_usize("HANDOFF_CAPACITY", DEFAULT_CAPACITY);
    let producers = env_usize("HANDOFF_PRODUCERS", DEFAULT_PRODUCERS);
    let consumers = env_usize("HANDOFF_CONSUMERS", DEFAULT_CONSUMERS);

    // 3. Build the shared queue and counters
    let queue: Arc<BoundedQueue<Message>> = Arc::new(
        BoundedQueue::new(capacity).map_err(|e| anyhow::anyhow!("queue setup failed: {}", e))?,
    );
    let produced = Arc::new(AtomicU64::new(0));
    let consumed = Arc::new(AtomicU64::new(0));

    // 4. Spawn producers (cancellable) and consumers (drain until closed)
    let (cancel_source, cancel_token) = cancel_channel();

    let mut producer_handles = Vec::with_capacity(producers);
    for id in 0..producers {
        let producer = Producer::new(id, Arc::clone(&queue), Arc::clone(&produced));
        let token = cancel_token.clone();
        producer_handles.push(tokio::spawn(async move { producer.run(token).await }));
    }

    let mut consumer_handles = Vec::with_capacity(consumers);
    for id in 0..consumers {
        let consumer = Consumer::new(id, Arc::clone(&queue), Arc::clone(&consumed));
        consumer_handles.push(tokio::spawn(async move { consumer.run().await }));
    }

    info!(
        capacity,
        producers, consumers, "Pipeline running (Ctrl-C to stop)"
    );

    // 5. Wait for shutdown signal, then stop in dependency order:
    //    producers first, then close so consumers drain what is left.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping producers...");

    cancel_source.cancel();
    for handle in producer_handles {
        let _ = handle.await;
    }

    queue.close();
    for handle in consumer_handles {
        let _ = handle.await;
    }

    info!(
        produced = produced.load(Ordering::SeqCst),
        consumed = consumed.load(Ordering::SeqCst),
        "Pipeline stopped"
    );

    Ok(())
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
