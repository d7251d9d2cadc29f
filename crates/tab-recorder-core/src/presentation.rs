//! View models for presentation surfaces (badge, overlay, popup timer).

use crate::session::{SessionPhase, SessionStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Toolbar badge states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeState {
    /// Ready to record.
    #[default]
    Idle,
    /// Capture starting up or finalizing.
    Busy,
    /// Capture running.
    Recording,
    /// Last transition failed; shown transiently.
    Error,
}

impl BadgeState {
    /// Badge for a status snapshot.
    pub fn from_status(status: &SessionStatus) -> Self {
        if status.phase.is_transitioning() {
            return Self::Busy;
        }
        match status.phase {
            SessionPhase::Recording => Self::Recording,
            _ => Self::Idle,
        }
    }

    /// Short badge text.
    pub fn text(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Busy => "...",
            Self::Recording => "REC",
            Self::Error => "ERR",
        }
    }

    /// Badge background as `#rrggbb`.
    pub fn color(self) -> &'static str {
        match self {
            Self::Idle => "#000000",
            Self::Busy => "#ff8c00",
            Self::Recording | Self::Error => "#ff0000",
        }
    }

    /// Badge background as RGBA.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Idle => [0x80, 0x80, 0x80, 0xff],
            Self::Busy => [0xff, 0x8c, 0x00, 0xff],
            Self::Recording => [0xff, 0x00, 0x00, 0xff],
            Self::Error => [0xb0, 0x00, 0x00, 0xff],
        }
    }
}

/// Popup timer text `MM:SS`; minutes keep counting past 59.
pub fn elapsed_label(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - started_at).num_seconds().max(0);
    format!("{:02}:{:02}", elapsed / 60, elapsed % 60)
}
