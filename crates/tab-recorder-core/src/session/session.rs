use crate::{
    capture::CaptureTarget,
    session::{SessionPhase, SessionStatus},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The single global recording session.
///
/// Modelled as an enum so that a start timestamp exists exactly when the
/// session is active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No capture running.
    #[default]
    Idle,
    /// Capture running.
    Active {
        /// Unique session ID for log correlation.
        id: Uuid,
        /// When the capture became ready.
        started_at: DateTime<Utc>,
        /// What is being captured.
        target: CaptureTarget,
    },
}

impl Session {
    /// Whether capture is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Session ID, if active.
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Active { id, .. } => Some(*id),
        }
    }

    /// Start timestamp, if active.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Idle => None,
            Self::Active { started_at, .. } => Some(*started_at),
        }
    }

    /// Snapshot this session as a status seen in `phase`.
    pub fn status(&self, phase: SessionPhase) -> SessionStatus {
        match self {
            Self::Idle => SessionStatus {
                phase,
                ..SessionStatus::default()
            },
            Self::Active {
                id,
                started_at,
                target,
            } => SessionStatus {
                active: true,
                started_at: Some(*started_at),
                target: Some(target.clone()),
                phase,
                session_id: Some(*id),
            },
        }
    }
}
