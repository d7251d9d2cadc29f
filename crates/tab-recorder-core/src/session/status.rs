use crate::{RecorderError, capture::CaptureTarget, session::SessionPhase};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status snapshot answered to presentation surfaces.
///
/// `Default` is the idle status reported when no session exists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// True while capture is running.
    pub active: bool,
    /// Present iff `active`.
    pub started_at: Option<DateTime<Utc>>,
    /// Target being captured, if any.
    #[serde(rename = "targetContext")]
    pub target: Option<CaptureTarget>,
    /// Controller phase at the time of the snapshot.
    pub phase: SessionPhase,
    /// Session ID, present iff `active`.
    pub session_id: Option<Uuid>,
}

/// Reply to a toggle command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    /// Whether the toggle took effect.
    pub success: bool,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleResponse {
    /// Successful toggle.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed toggle carrying the user-facing message of `error`.
    pub fn failed(error: &RecorderError) -> Self {
        Self {
            success: false,
            error: Some(error.user_message()),
        }
    }
}
