use crate::config::{
    DEFAULT_ERROR_BADGE_MS, DEFAULT_NOTIFICATIONS, default_error_badge_ms, default_notifications,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to show desktop notifications on start, stop and errors.
    #[serde(default = "default_notifications")]
    pub notifications: bool,

    /// How long the error badge stays up after a failed toggle.
    #[serde(default = "default_error_badge_ms")]
    pub error_badge_ms: u64,
}

impl BehaviourConfig {
    /// Error badge display time.
    pub fn error_badge(&self) -> Duration {
        Duration::from_millis(self.error_badge_ms)
    }
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            notifications: DEFAULT_NOTIFICATIONS,
            error_badge_ms: DEFAULT_ERROR_BADGE_MS,
        }
    }
}
