//! Desktop notifications for lifecycle events.

use crate::{AppError, AppResult, hotkey_handler::TOGGLE_SHORTCUT};

use tab_recorder_core::{ErrorKind, broadcast::Notification};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, warn};

const APP_NAME: &str = "Tab Recorder";

/// Title and body of a desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Bold first line.
    pub summary: String,
    /// Detail text.
    pub body: String,
}

impl Notice {
    /// Notice for a controller notification, if it warrants one.
    ///
    /// Status updates and superseded intents stay silent.
    pub fn for_notification(notification: &Notification, recordings_dir: &Path) -> Option<Self> {
        match notification {
            Notification::Status(_) => None,
            Notification::Started { .. } => Some(Self {
                summary: "Recording Started".to_string(),
                body: format!("Press {} again to stop recording", TOGGLE_SHORTCUT),
            }),
            Notification::Completed { .. } => {
                let folder = recordings_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| recordings_dir.display().to_string());
                Some(Self {
                    summary: "Recording Stopped".to_string(),
                    body: format!("Video saved to {} folder", folder),
                })
            }
            Notification::Failed {
                kind: ErrorKind::Superseded,
                ..
            } => None,
            Notification::Failed { message, .. } => Some(Self {
                summary: "Recording Error".to_string(),
                body: message.clone(),
            }),
        }
    }
}

/// Shows [`Notice`]s through the platform notification service.
#[derive(Debug, Clone)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    /// Notifier that stays silent when `enabled` is false.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Show `notice` without blocking the caller.
    pub fn show(&self, notice: Notice) {
        if !self.enabled {
            debug!(summary = %notice.summary, "Notifications disabled, skipping");
            return;
        }

        // D-Bus on Linux blocks until the server answers.
        tokio::task::spawn_blocking(move || {
            if let Err(e) = send(&notice) {
                warn!(error = ?e, "Failed to show notification");
            }
        });
    }
}

#[track_caller]
fn send(notice: &Notice) -> AppResult<()> {
    notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(&notice.summary)
        .body(&notice.body)
        .show()
        .map(|_| ())
        .map_err(|e| AppError::NotificationFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}
