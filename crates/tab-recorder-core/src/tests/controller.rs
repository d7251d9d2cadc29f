use crate::{
    ErrorKind, RecorderError,
    broadcast::Notification,
    capture::CaptureTarget,
    controller::{ControllerOptions, ToggleDirection},
    session::SessionPhase,
    store::{MemorySessionStore, SessionRecord, SessionStore},
    tests::support::{
        ScriptedProvider, TEST_WAIT, fast_options, harness, harness_with, next_notification,
        wait_for_phase, web_target,
    },
};

use std::sync::Arc;

use tokio::sync::Notify;

fn with_chunk(bytes: &[u8]) -> ScriptedProvider {
    ScriptedProvider {
        initial_chunks: vec![bytes.to_vec()],
        ..ScriptedProvider::default()
    }
}

/// WHAT: Toggle from idle starts capture and publishes an active status
/// WHY: The shortcut and badge click both rely on toggle starting a session
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_controller_when_toggled_then_recording_with_start_time() {
    // Given: An idle controller with a capturable target
    let h = harness(ScriptedProvider::default());
    let mut events = h.handle.subscribe();

    // When: Toggling
    let response = h.handle.toggle().await;

    // Then: Session is active with a start time and Started was broadcast
    assert!(response.success);
    assert!(response.error.is_none());

    let status = h.handle.status();
    assert!(status.active);
    assert!(status.started_at.is_some());
    assert!(status.session_id.is_some());
    assert_eq!(status.phase, SessionPhase::Recording);
    assert_eq!(status.target, Some(web_target()));
    assert!(h.store.get().unwrap());

    let started =
        next_notification(&mut events, |n| matches!(n, Notification::Started { .. })).await;
    assert!(started.is_some());
    assert_eq!(h.probe.start_calls(), 1);
}

/// WHAT: Second toggle stops capture and hands one artifact to the sink
/// WHY: Every emitted chunk must end up in the saved file, in order
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_with_chunks_when_toggled_then_artifact_saved_and_idle() {
    // Given: A recording session that has emitted three chunks
    let h = harness(ScriptedProvider::default());
    let mut events = h.handle.subscribe();
    assert!(h.handle.toggle().await.success);
    h.probe.emit(b"one-").await;
    h.probe.emit(b"two-").await;
    h.probe.emit(b"three").await;

    // When: Toggling again
    let response = h.handle.toggle().await;

    // Then: Idle, one artifact with all bytes, store cleared and counted
    assert!(response.success);

    let status = h.handle.status();
    assert!(!status.active);
    assert!(status.started_at.is_none());
    assert_eq!(status.phase, SessionPhase::Idle);

    let saved = h.sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].bytes, b"one-two-three".to_vec());
    assert_eq!(saved[0].chunk_count, 3);
    assert!(saved[0].filename.starts_with("tab-recording-"));
    assert!(saved[0].filename.ends_with(".webm"));

    let record = h.store.load().unwrap();
    assert!(!record.active);
    assert_eq!(record.recording_count, 1);

    let completed =
        next_notification(&mut events, |n| matches!(n, Notification::Completed { .. })).await;
    let Some(Notification::Completed { artifact, .. }) = completed else {
        unreachable!("Completed notification was matched above");
    };
    assert_eq!(artifact.filename, saved[0].filename);
    assert_eq!(artifact.size_bytes, 13);
}

/// WHAT: Restricted targets are rejected before the provider is touched
/// WHY: Browser internal pages cannot be captured and must not flicker the badge
#[tokio::test]
async fn given_browser_internal_target_when_toggled_then_not_capturable() {
    // Given: The active target is a browser settings page
    let h = harness_with(
        ScriptedProvider::default(),
        Some(CaptureTarget::new(3, "chrome://settings")),
        Arc::new(MemorySessionStore::new()),
        ControllerOptions::default(),
    );

    // When: Toggling
    let response = h.handle.toggle().await;

    // Then: Failure with the internal-page message; nothing started
    assert!(!response.success);
    let message = response.error.unwrap_or_default();
    assert!(message.contains("Cannot record browser internal pages"));
    assert_eq!(h.probe.start_calls(), 0);
    assert_eq!(h.handle.status().phase, SessionPhase::Idle);
    assert!(!h.handle.status().active);
}

/// WHAT: No active target yields NoActiveTarget
/// WHY: The user gets a clear message instead of a silent no-op
#[tokio::test]
async fn given_no_active_target_when_started_then_no_active_target_error() {
    // Given: A resolver with no target
    let h = harness_with(
        ScriptedProvider::default(),
        None,
        Arc::new(MemorySessionStore::new()),
        ControllerOptions::default(),
    );

    // When: Starting explicitly
    let result = h.handle.start().await;

    // Then: NoActiveTarget, still idle
    assert!(matches!(result, Err(RecorderError::NoActiveTarget { .. })));
    assert!(!h.handle.status().active);

    let toggled = h.handle.toggle().await;
    assert_eq!(toggled.error.as_deref(), Some("No active tab found"));
}

/// WHAT: Capture ending out-of-band stops the session and saves the data
/// WHY: Revoking sharing from the platform UI must not lose the recording
#[tokio::test]
async fn given_recording_when_capture_ends_out_of_band_then_saved_and_idle() {
    // Given: A recording session with one chunk delivered
    let h = harness(ScriptedProvider::default());
    let mut events = h.handle.subscribe();
    assert!(h.handle.toggle().await.success);
    h.probe.emit(b"frame").await;

    // When: The capture source ends by itself
    h.probe.end().await;

    // Then: The controller completes the session without any command
    let completed =
        next_notification(&mut events, |n| matches!(n, Notification::Completed { .. })).await;
    assert!(completed.is_some());

    let status = wait_for_phase(&h.handle, SessionPhase::Idle).await;
    assert!(!status.active);
    assert_eq!(h.sink.saved().len(), 1);
    assert_eq!(h.sink.saved()[0].bytes, b"frame".to_vec());
    assert_eq!(h.probe.stop_calls(), 1);
}

/// WHAT: Explicit start while recording is rejected
/// WHY: Only one session may exist at a time
#[tokio::test]
async fn given_recording_when_started_again_then_already_recording() {
    // Given: An active session
    let h = harness(ScriptedProvider::default());
    let first = h.handle.start().await;
    assert!(first.is_ok());
    let session_id = h.handle.status().session_id;

    // When: Starting again
    let second = h.handle.start().await;

    // Then: AlreadyRecording and the original session is untouched
    assert!(matches!(second, Err(RecorderError::AlreadyRecording { .. })));
    assert_eq!(h.handle.status().session_id, session_id);
    assert_eq!(h.probe.start_calls(), 1);
}

/// WHAT: Stop while idle is a no-op
/// WHY: Stop intents are idempotent for surfaces that do not track state
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_controller_when_stopped_then_no_artifact() {
    // Given: An idle controller
    let h = harness(ScriptedProvider::default());

    // When: Stopping
    let result = h.handle.stop().await.unwrap();

    // Then: Nothing produced, provider never asked
    assert!(result.is_none());
    assert_eq!(h.probe.stop_calls(), 0);
    assert!(h.sink.saved().is_empty());
}

/// WHAT: Status queries are answered while a start is in flight
/// WHY: Presentation surfaces must never block on the capture picker
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_start_in_flight_when_status_queried_then_starting_reported() {
    // Given: A start blocked inside the provider
    let gate = Arc::new(Notify::new());
    let h = harness(ScriptedProvider {
        start_gate: Some(gate.clone()),
        ..ScriptedProvider::default()
    });
    let handle = h.handle.clone();
    let toggle = tokio::spawn(async move { handle.toggle().await });
    wait_for_phase(&h.handle, SessionPhase::Starting).await;

    // When: Querying the controller
    let status = tokio::time::timeout(TEST_WAIT, h.handle.query_status())
        .await
        .unwrap()
        .unwrap();

    // Then: Starting, not yet active; start then completes normally
    assert_eq!(status.phase, SessionPhase::Starting);
    assert!(!status.active);
    assert!(status.started_at.is_none());

    gate.notify_one();
    let response = toggle.await.unwrap();
    assert!(response.success);
    assert!(h.handle.status().active);
}

/// WHAT: A newer intent replaces the pending one, which is superseded
/// WHY: Rapid presses during a start must resolve deterministically
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_start_in_flight_when_two_intents_arrive_then_latest_wins() {
    // Given: A start blocked inside the provider
    let gate = Arc::new(Notify::new());
    let h = harness(ScriptedProvider {
        start_gate: Some(gate.clone()),
        initial_chunks: vec![b"data".to_vec()],
        ..ScriptedProvider::default()
    });
    let handle = h.handle.clone();
    let first = tokio::spawn(async move { handle.toggle().await });
    wait_for_phase(&h.handle, SessionPhase::Starting).await;

    // When: A stop and then a toggle arrive before the start completes
    let (stop, toggle, ()) = tokio::join!(h.handle.stop(), h.handle.toggle(), async {
        let _ = h.handle.query_status().await;
        gate.notify_one();
    });

    // Then: The stop is superseded, the toggle counts as a second start
    assert!(matches!(stop, Err(RecorderError::Superseded { .. })));
    assert!(!toggle.success);
    assert_eq!(
        toggle.error.as_deref(),
        Some("A recording is already in progress")
    );
    assert!(first.await.unwrap().success);

    let status = h.handle.status();
    assert!(status.active);
    assert_eq!(status.phase, SessionPhase::Recording);
    assert!(h.sink.saved().is_empty());
    assert_eq!(h.probe.start_calls(), 1);
}

/// WHAT: Two toggles issued back to back start exactly one session
/// WHY: A double press must not start and immediately stop a recording
#[tokio::test]
async fn given_idle_controller_when_toggled_twice_at_once_then_one_session_active() {
    // Given: An idle controller with a provider that starts at once
    let h = harness(ScriptedProvider {
        initial_chunks: vec![b"data".to_vec()],
        ..ScriptedProvider::default()
    });

    // When: Two toggles are issued together
    let (first, second) = tokio::join!(h.handle.toggle(), h.handle.toggle());

    // Then: The first starts, the second is rejected, one session remains
    assert!(first.success);
    assert!(!second.success);

    let status = h.handle.status();
    assert!(status.active);
    assert_eq!(status.phase, SessionPhase::Recording);
    assert!(h.sink.saved().is_empty());
    assert_eq!(h.probe.start_calls(), 1);
    assert_eq!(h.probe.stop_calls(), 0);
}

/// WHAT: A toggle is a start until capture is running, then a stop
/// WHY: Presses during Starting or Stopping must not flip the outcome
#[test]
fn given_each_phase_when_resolving_toggle_then_direction_follows_capture() {
    // Given/When/Then: Idle and Starting start, Recording and Stopping stop
    assert_eq!(ToggleDirection::for_phase(SessionPhase::Idle), ToggleDirection::Start);
    assert_eq!(ToggleDirection::for_phase(SessionPhase::Starting), ToggleDirection::Start);
    assert_eq!(ToggleDirection::for_phase(SessionPhase::Recording), ToggleDirection::Stop);
    assert_eq!(ToggleDirection::for_phase(SessionPhase::Stopping), ToggleDirection::Stop);
}

/// WHAT: A hung start falls back to idle with a timeout
/// WHY: An unanswered picker must not wedge the controller in Starting
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_provider_never_starts_when_toggled_then_timeout_and_idle() {
    // Given: A provider whose start never resolves
    let h = harness_with(
        ScriptedProvider {
            hang_start: true,
            ..ScriptedProvider::default()
        },
        Some(web_target()),
        Arc::new(MemorySessionStore::new()),
        fast_options(),
    );

    // When: Starting
    let result = h.handle.start().await;

    // Then: Timeout, capture aborted, idle and not persisted
    assert!(matches!(
        result,
        Err(RecorderError::Timeout {
            operation: "start",
            ..
        })
    ));
    assert_eq!(h.probe.abort_calls(), 1);
    assert_eq!(h.handle.status().phase, SessionPhase::Idle);
    assert!(!h.store.get().unwrap());

    // And the controller still accepts work afterwards
    assert!(h.handle.query_status().await.is_ok());
}

/// WHAT: A hung encoder stop still saves what was captured
/// WHY: Chunks already received belong to the user even if finalization fails
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_encoder_hangs_on_stop_when_stopped_then_timeout_but_artifact_saved() {
    // Given: A recording whose provider never finishes stopping
    let h = harness_with(
        ScriptedProvider {
            hang_stop: true,
            initial_chunks: vec![b"abc".to_vec()],
            ..ScriptedProvider::default()
        },
        Some(web_target()),
        Arc::new(MemorySessionStore::new()),
        fast_options(),
    );
    assert!(h.handle.start().await.is_ok());

    // When: Stopping
    let result = h.handle.stop().await;

    // Then: Timeout reported, artifact saved, session cleared
    assert!(matches!(
        result,
        Err(RecorderError::Timeout {
            operation: "stop",
            ..
        })
    ));
    let saved = h.sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].bytes, b"abc".to_vec());
    assert!(!h.handle.status().active);
    assert!(!h.store.get().unwrap());
}

/// WHAT: Stopping a session that produced nothing fails assembly
/// WHY: Empty files are never handed to the user
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_without_chunks_when_stopped_then_assembly_failure() {
    // Given: A session with no data
    let h = harness(ScriptedProvider::default());
    assert!(h.handle.start().await.is_ok());

    // When: Stopping
    let result = h.handle.stop().await;

    // Then: AssemblyFailure, nothing saved, session still cleared
    assert!(matches!(result, Err(RecorderError::AssemblyFailure { .. })));
    assert!(h.sink.saved().is_empty());
    assert!(!h.handle.status().active);

    let record = h.store.load().unwrap();
    assert!(!record.active);
    assert_eq!(record.recording_count, 0);
}

/// WHAT: A denied capture is broadcast as a failure
/// WHY: The badge and notifications surface errors from any intent source
#[tokio::test]
async fn given_user_denies_capture_when_toggled_then_failed_notification() {
    // Given: A provider that is declined
    let h = harness(ScriptedProvider {
        deny: true,
        ..ScriptedProvider::default()
    });
    let mut events = h.handle.subscribe();

    // When: Toggling
    let response = h.handle.toggle().await;

    // Then: Failure response and a CaptureDenied notification
    assert!(!response.success);
    let failed = next_notification(&mut events, |n| matches!(n, Notification::Failed { .. })).await;
    assert!(matches!(
        failed,
        Some(Notification::Failed {
            kind: ErrorKind::CaptureDenied,
            ..
        })
    ));
    assert_eq!(h.probe.abort_calls(), 1);
    assert_eq!(h.handle.status().phase, SessionPhase::Idle);
}

/// WHAT: Every published status keeps active and startedAt in lockstep
/// WHY: Surfaces compute the elapsed timer from startedAt whenever active
#[tokio::test]
async fn given_full_session_when_observing_statuses_then_active_matches_started_at() {
    // Given: A subscriber attached once the controller is idle and running
    let h = harness(with_chunk(b"x"));
    assert!(h.handle.query_status().await.is_ok());
    let mut events = h.handle.subscribe();

    // When: Running a complete session
    assert!(h.handle.toggle().await.success);
    assert!(h.handle.toggle().await.success);

    // Then: Every status notification up to Completed is consistent
    let mut seen = Vec::new();
    while let Some(n) = next_notification(&mut events, |_| true).await {
        let done = matches!(n, Notification::Completed { .. });
        seen.push(n);
        if done {
            break;
        }
    }

    let statuses: Vec<_> = seen
        .iter()
        .filter_map(|n| match n {
            Notification::Status(status) => Some(status),
            _ => None,
        })
        .collect();
    let phases: Vec<_> = statuses.iter().map(|s| s.phase).collect();
    assert_eq!(
        phases,
        vec![
            SessionPhase::Starting,
            SessionPhase::Recording,
            SessionPhase::Stopping,
            SessionPhase::Idle,
        ]
    );
    for status in statuses {
        assert_eq!(status.active, status.started_at.is_some());
        assert_eq!(status.active, status.session_id.is_some());
    }
}

/// WHAT: Shutdown stops and saves an active recording
/// WHY: Quitting the app must not discard the capture in progress
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_when_shutdown_then_saved_and_task_exits() {
    // Given: An active session with data
    let h = harness(with_chunk(b"final"));
    assert!(h.handle.start().await.is_ok());

    // When: Shutting down
    h.handle.shutdown().await.unwrap();

    // Then: Artifact saved, store cleared, task finished
    assert_eq!(h.sink.saved().len(), 1);
    assert!(!h.store.get().unwrap());
    tokio::time::timeout(TEST_WAIT, h.task).await.unwrap().unwrap();

    // And further commands report the controller as unavailable
    assert!(matches!(
        h.handle.start().await,
        Err(RecorderError::ControllerUnavailable { .. })
    ));
}

/// WHAT: Dropping every handle ends the controller task
/// WHY: The host can tear down without an explicit shutdown
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_controller_when_handles_dropped_then_task_exits() {
    // Given: A running controller
    let h = harness(ScriptedProvider::default());

    // When: Dropping the only handle
    drop(h.handle);

    // Then: The task completes
    tokio::time::timeout(TEST_WAIT, h.task).await.unwrap().unwrap();
}

/// WHAT: An active flag left by a previous process is cleared at startup
/// WHY: After a restart the capture is gone; claiming to record would lie
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_store_marked_active_when_controller_starts_then_recovered_to_idle() {
    // Given: A store claiming a session is active
    let store = Arc::new(MemorySessionStore::with_record(SessionRecord {
        active: true,
        recording_count: 4,
    }));

    // When: A controller starts over it
    let h = harness_with(
        ScriptedProvider::default(),
        Some(web_target()),
        store,
        ControllerOptions::default(),
    );
    let mut events = h.handle.subscribe();

    // Then: The flag is cleared and the interruption reported
    let failed = next_notification(&mut events, |n| matches!(n, Notification::Failed { .. })).await;
    assert!(matches!(
        failed,
        Some(Notification::Failed {
            kind: ErrorKind::ProcessRestartInterruption,
            ..
        })
    ));
    let status = h.handle.query_status().await.unwrap();
    assert!(!status.active);
    assert!(!h.store.get().unwrap());
    assert_eq!(h.store.load().unwrap().recording_count, 4);
}
