use crate::{capture::TargetPolicy, output::ContainerFormat};

use std::time::Duration;

/// Default bound on `CaptureProvider::start`; covers a user picking a source.
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on `CaptureProvider::stop`.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_COMMAND_CAPACITY: usize = 32;

/// Tunables for a [`RecordingController`](crate::controller::RecordingController).
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Bound on capture start before falling back to idle.
    pub start_timeout: Duration,
    /// Bound on encoder finalization.
    pub stop_timeout: Duration,
    /// Container of the assembled artifact.
    pub container: ContainerFormat,
    /// Which targets may be captured.
    pub policy: TargetPolicy,
    /// Command channel capacity.
    pub command_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            start_timeout: DEFAULT_START_TIMEOUT,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            container: ContainerFormat::default(),
            policy: TargetPolicy::default(),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}
