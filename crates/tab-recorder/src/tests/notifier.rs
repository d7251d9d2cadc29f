use crate::notifier::Notice;

use tab_recorder_core::{
    ErrorKind,
    broadcast::Notification,
    capture::CaptureTarget,
    output::ArtifactRef,
    session::SessionStatus,
};

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

/// WHAT: Start and stop produce the familiar notices
/// WHY: Users learn the shortcut and where the file went
#[test]
#[allow(clippy::unwrap_used)]
fn given_lifecycle_notifications_when_mapping_then_start_and_stop_notices() {
    // Given: Started and Completed notifications
    let dir = Path::new("/home/user/Downloads");
    let started = Notification::Started {
        session_id: Uuid::new_v4(),
        started_at: Utc::now(),
        target: CaptureTarget::new(1, ":0.0"),
    };
    let completed = Notification::Completed {
        session_id: Uuid::new_v4(),
        artifact: ArtifactRef {
            filename: "tab-recording-x.webm".to_string(),
            size_bytes: 10,
            chunk_count: 1,
            created_at: Utc::now(),
        },
    };

    // When: Mapping
    let start_notice = Notice::for_notification(&started, dir).unwrap();
    let stop_notice = Notice::for_notification(&completed, dir).unwrap();

    // Then: Expected texts
    assert_eq!(start_notice.summary, "Recording Started");
    assert_eq!(start_notice.body, "Press Ctrl+Shift+R again to stop recording");
    assert_eq!(stop_notice.summary, "Recording Stopped");
    assert_eq!(stop_notice.body, "Video saved to Downloads folder");
}

/// WHAT: Failures show their message; superseded intents and status stay silent
/// WHY: Replaced requests are not errors from the user's point of view
#[test]
#[allow(clippy::unwrap_used)]
fn given_failures_when_mapping_then_only_real_errors_notified() {
    // Given: A real failure, a superseded intent and a status update
    let dir = Path::new("/tmp");
    let denied = Notification::Failed {
        kind: ErrorKind::CaptureDenied,
        message: "Capture was denied: no display".to_string(),
    };
    let superseded = Notification::Failed {
        kind: ErrorKind::Superseded,
        message: "Request replaced by a newer one".to_string(),
    };
    let status = Notification::Status(SessionStatus::default());

    // When/Then
    let notice = Notice::for_notification(&denied, dir).unwrap();
    assert_eq!(notice.summary, "Recording Error");
    assert_eq!(notice.body, "Capture was denied: no display");
    assert!(Notice::for_notification(&superseded, dir).is_none());
    assert!(Notice::for_notification(&status, dir).is_none());
}
