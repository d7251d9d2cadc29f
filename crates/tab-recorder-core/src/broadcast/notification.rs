use crate::{
    ErrorKind,
    capture::CaptureTarget,
    output::ArtifactRef,
    session::SessionStatus,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages pushed from the controller to presentation surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    /// A transition completed; carries the new status.
    Status(SessionStatus),
    /// Capture is running.
    #[serde(rename_all = "camelCase")]
    Started {
        /// Session ID for log correlation.
        session_id: Uuid,
        /// When capture became ready.
        started_at: DateTime<Utc>,
        /// What is being captured.
        target: CaptureTarget,
    },
    /// Session ended and an artifact went to the sink.
    #[serde(rename_all = "camelCase")]
    Completed {
        /// Session that produced the artifact.
        session_id: Uuid,
        /// The saved artifact.
        artifact: ArtifactRef,
    },
    /// A transition failed; reported once.
    Failed {
        /// Error discriminant.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}
