// Message - the unit of work handed from producers to consumers

use std::fmt;

use serde::{Deserialize, Serialize};

/// One produced value, tagged with its origin and per-producer sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    pub producer: usize,
    pub value: i64,
}

impl Message {
    pub fn new(seq: u64, producer: usize, value: i64) -> Self {
        Self {
            seq,
            producer,
            value,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Compact JSON, matching the structured log output
        match serde_json::to_string(self) {
            Ok(body) => f.write_str(&body),
            Err(_) => write!(f, "message {}#{}", self.producer, self.seq),
        }
    }
}
