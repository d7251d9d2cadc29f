use crate::{
    CoreResult, RecorderError,
    broadcast::{Notification, StatusReader},
    controller::{Command, ToggleDirection},
    output::ArtifactRef,
    session::{SessionStatus, ToggleResponse},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Cloneable command interface to a running controller.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    command_tx: mpsc::Sender<Command>,
    reader: StatusReader,
}

impl ControllerHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, reader: StatusReader) -> Self {
        Self { command_tx, reader }
    }

    /// Start when idle, stop when recording.
    ///
    /// The direction is read from the published phase at call time, so two
    /// toggles issued before the first start lands are both starts and the
    /// second is rejected with `AlreadyRecording`.
    ///
    /// Never fails outright: an unreachable controller is reported in the
    /// response like any other failure.
    pub async fn toggle(&self) -> ToggleResponse {
        let direction = ToggleDirection::for_phase(self.status().phase);
        match self.request(|reply| Command::Toggle { direction, reply }).await {
            Ok(response) => response,
            Err(e) => ToggleResponse::failed(&e),
        }
    }

    /// Explicit start intent.
    pub async fn start(&self) -> CoreResult<SessionStatus> {
        self.request(|reply| Command::Start { reply }).await?
    }

    /// Explicit stop intent. Returns `Ok(None)` when nothing was recording.
    pub async fn stop(&self) -> CoreResult<Option<ArtifactRef>> {
        self.request(|reply| Command::Stop { reply }).await?
    }

    /// Latest published status. Does not message the controller.
    pub fn status(&self) -> SessionStatus {
        self.reader.status()
    }

    /// Status as answered by the controller task itself.
    pub async fn query_status(&self) -> CoreResult<SessionStatus> {
        self.request(|reply| Command::GetStatus { reply }).await
    }

    /// Subscribe to lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.reader.subscribe()
    }

    /// Stream of status values.
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.reader.watch()
    }

    /// Stop any active recording and end the controller task.
    pub async fn shutdown(&self) -> CoreResult<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> CoreResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|e| RecorderError::ControllerUnavailable {
                reason: format!("Failed to send command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        reply_rx
            .await
            .map_err(|e| RecorderError::ControllerUnavailable {
                reason: format!("Controller dropped the reply: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
