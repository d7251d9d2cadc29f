use serde::{Deserialize, Serialize};

/// Lifecycle phase of the recording controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No recording in progress.
    #[default]
    Idle,
    /// Capture requested, waiting for the provider to come up.
    Starting,
    /// Capture running, chunks accumulating.
    Recording,
    /// Encoder finalizing, artifact about to be assembled.
    Stopping,
}

impl SessionPhase {
    /// Whether a transition is in flight.
    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }
}
