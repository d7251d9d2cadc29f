use tab_recorder_core::controller::{DEFAULT_START_TIMEOUT, DEFAULT_STOP_TIMEOUT};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounds on capture start and encoder finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Milliseconds allowed for capture to start.
    #[serde(default = "default_start_ms")]
    pub start_ms: u64,

    /// Milliseconds allowed for the encoder to finalize.
    #[serde(default = "default_stop_ms")]
    pub stop_ms: u64,
}

impl TimeoutConfig {
    /// Start bound as a `Duration`.
    pub fn start(&self) -> Duration {
        Duration::from_millis(self.start_ms)
    }

    /// Stop bound as a `Duration`.
    pub fn stop(&self) -> Duration {
        Duration::from_millis(self.stop_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            start_ms: default_start_ms(),
            stop_ms: default_stop_ms(),
        }
    }
}

fn default_start_ms() -> u64 {
    u64::try_from(DEFAULT_START_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

fn default_stop_ms() -> u64 {
    u64::try_from(DEFAULT_STOP_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}
