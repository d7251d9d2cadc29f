//! Maps controller status to tray commands.

use crate::{TrayCommand, tray_manager::READY_TOOLTIP};

use tab_recorder_core::{
    presentation::{BadgeState, elapsed_label},
    session::{SessionPhase, SessionStatus},
};

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Tracks what the tray currently shows so only changes are sent.
#[derive(Debug)]
pub struct BadgePresenter {
    error_hold: Duration,
    error_until: Option<Instant>,
    badge: Option<BadgeState>,
    tooltip: Option<String>,
}

impl BadgePresenter {
    /// Presenter holding the error badge for `error_hold` after a failure.
    pub fn new(error_hold: Duration) -> Self {
        Self {
            error_hold,
            error_until: None,
            badge: None,
            tooltip: None,
        }
    }

    /// Show the error badge from `now` on.
    pub fn hold_error(&mut self, now: Instant) {
        self.error_until = Some(now + self.error_hold);
    }

    /// Badge for `status`; a held error wins until it expires.
    pub fn badge(&self, status: &SessionStatus, now: Instant) -> BadgeState {
        match self.error_until {
            Some(until) if now < until => BadgeState::Error,
            _ => BadgeState::from_status(status),
        }
    }

    /// Commands needed to bring the tray in line with `status`.
    pub fn refresh(
        &mut self,
        status: &SessionStatus,
        now: Instant,
        wall_clock: DateTime<Utc>,
    ) -> Vec<TrayCommand> {
        if self.error_until.is_some_and(|until| now >= until) {
            self.error_until = None;
        }

        let mut commands = Vec::new();

        let badge = self.badge(status, now);
        if self.badge != Some(badge) {
            self.badge = Some(badge);
            commands.push(TrayCommand::SetBadge(badge));
        }

        let tooltip = tooltip(status, wall_clock);
        if self.tooltip.as_deref() != Some(tooltip.as_str()) {
            self.tooltip = Some(tooltip.clone());
            commands.push(TrayCommand::SetTooltip(tooltip));
        }

        commands
    }
}

/// Hover text, including the running timer while recording.
pub fn tooltip(status: &SessionStatus, now: DateTime<Utc>) -> String {
    match (status.phase, status.started_at) {
        (SessionPhase::Idle, _) => READY_TOOLTIP.to_string(),
        (SessionPhase::Starting, _) => "Tab Recorder - Starting...".to_string(),
        (SessionPhase::Recording, Some(started_at)) => {
            format!("Tab Recorder - Recording {}", elapsed_label(started_at, now))
        }
        (SessionPhase::Recording, None) => "Tab Recorder - Recording".to_string(),
        (SessionPhase::Stopping, _) => "Tab Recorder - Saving...".to_string(),
    }
}
