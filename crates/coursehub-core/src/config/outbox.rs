//! Outbox relay configuration.

use serde::{Deserialize, Serialize};

/// Settings for the relay that drains commerce events to notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Whether the relay runs inside the server process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sleep between polls when the outbox is empty, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Maximum events fetched per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Events that failed this many times are no longer retried.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            poll_interval_seconds: default_poll_interval(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    5
}

fn default_batch_size() -> u32 {
    50
}

fn default_max_attempts() -> i32 {
    10
}
