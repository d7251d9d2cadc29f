use crate::{
    CoreResult, RecorderError,
    output::ArtifactRef,
    session::{SessionPhase, SessionStatus, ToggleResponse},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::oneshot;

/// Closed set of requests accepted by the controller.
#[derive(Debug)]
pub enum Command {
    /// Explicit start intent.
    Start {
        /// Resolves with the status after capture is running.
        reply: oneshot::Sender<CoreResult<SessionStatus>>,
    },
    /// Explicit stop intent; no-op when idle.
    Stop {
        /// Resolves with the saved artifact, if one was produced.
        reply: oneshot::Sender<CoreResult<Option<ArtifactRef>>>,
    },
    /// Start when idle, stop when recording.
    Toggle {
        /// Fixed from the published phase when the toggle was issued.
        direction: ToggleDirection,
        /// Resolves with the outcome.
        reply: oneshot::Sender<ToggleResponse>,
    },
    /// Current status as seen by the controller.
    GetStatus {
        /// Resolves immediately, even mid-transition.
        reply: oneshot::Sender<SessionStatus>,
    },
    /// Stop any active recording and end the controller task.
    Shutdown {
        /// Resolves once the controller has finished.
        reply: oneshot::Sender<()>,
    },
}

/// A start/stop request that changes state.
///
/// At most one intent is held back while a transition is in flight.
#[derive(Debug)]
pub enum Intent {
    /// From [`Command::Start`].
    Start(oneshot::Sender<CoreResult<SessionStatus>>),
    /// From [`Command::Stop`].
    Stop(oneshot::Sender<CoreResult<Option<ArtifactRef>>>),
    /// From [`Command::Toggle`].
    Toggle {
        /// Start or stop, as decided when the toggle was issued.
        direction: ToggleDirection,
        /// Resolves with the outcome.
        reply: oneshot::Sender<ToggleResponse>,
    },
}

/// Which way a toggle goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDirection {
    /// Request a new session.
    Start,
    /// Stop the current session.
    Stop,
}

impl ToggleDirection {
    /// A toggle is a start until capture is running.
    ///
    /// A toggle issued while `Starting` is therefore a second start and is
    /// rejected once the first one lands; one issued while `Stopping` is a
    /// stop that finds nothing left to stop.
    pub fn for_phase(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle | SessionPhase::Starting => Self::Start,
            SessionPhase::Recording | SessionPhase::Stopping => Self::Stop,
        }
    }
}

impl Intent {
    /// Answer a displaced intent with [`RecorderError::Superseded`].
    #[track_caller]
    pub(crate) fn supersede(self) {
        let location = ErrorLocation::from(Location::caller());
        let error = RecorderError::Superseded { location };
        match self {
            Self::Start(reply) => {
                let _ = reply.send(Err(error));
            }
            Self::Stop(reply) => {
                let _ = reply.send(Err(error));
            }
            Self::Toggle { reply, .. } => {
                let _ = reply.send(ToggleResponse::failed(&error));
            }
        }
    }
}
