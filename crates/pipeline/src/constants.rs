// Pipeline constants (no magic values)
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_CAPACITY: usize = 8;

/// Default number of producer tasks
pub const DEFAULT_PRODUCERS: usize = 2;

/// Default number of consumer tasks
pub const DEFAULT_CONSUMERS: usize = 2;

/// Pause between produced messages, per producer (250ms)
pub const PRODUCE_INTERVAL: Duration = Duration::from_millis(250);

/// Simulated handling time per consumed message (400ms)
/// Slower than production so backpressure is visible with the defaults
pub const CONSUME_INTERVAL: Duration = Duration::from_millis(400);

/// Upper bound (exclusive) for generated message values
pub const VALUE_RANGE: i64 = 100;
