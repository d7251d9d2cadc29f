use crate::{
    CoreResult, ErrorKind, RecorderError,
    broadcast::{Notification, StatusBroadcaster},
    capture::{CaptureEvent, CaptureProvider, CaptureTarget, TargetResolver},
    controller::{
        CaptureBuffer, Command, ControllerHandle, ControllerOptions, Inbox, Intent,
        ToggleDirection,
    },
    output::{ArtifactRef, OutputArtifact, OutputSink},
    session::{Session, SessionPhase, SessionStatus, ToggleResponse},
    store::SessionStore,
};

use std::{future::Future, panic::Location, sync::Arc, time::Duration};

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Owner of the recording session state machine.
///
/// Runs as a single task. `Idle -> Starting -> Recording -> Stopping -> Idle`;
/// intents arriving mid-transition wait in a single latest-wins slot.
pub struct RecordingController<P: CaptureProvider> {
    provider: P,
    resolver: Arc<dyn TargetResolver>,
    store: Arc<dyn SessionStore>,
    sink: Arc<dyn OutputSink>,
    broadcaster: StatusBroadcaster,
    options: ControllerOptions,
    session: Session,
    phase: SessionPhase,
    capture: CaptureBuffer,
    inbox: Inbox,
}

impl<P: CaptureProvider> RecordingController<P> {
    /// Build a controller and the handle used to reach it.
    ///
    /// Nothing happens until [`run`](Self::run) is polled.
    pub fn new(
        provider: P,
        resolver: Arc<dyn TargetResolver>,
        store: Arc<dyn SessionStore>,
        sink: Arc<dyn OutputSink>,
        options: ControllerOptions,
    ) -> (Self, ControllerHandle) {
        let (command_tx, command_rx) = mpsc::channel(options.command_capacity.max(1));
        let broadcaster = StatusBroadcaster::new();
        let handle = ControllerHandle::new(command_tx, broadcaster.reader());

        let controller = Self {
            provider,
            resolver,
            store,
            sink,
            broadcaster,
            options,
            session: Session::Idle,
            phase: SessionPhase::Idle,
            capture: CaptureBuffer::default(),
            inbox: Inbox::new(command_rx),
        };

        (controller, handle)
    }

    /// Build a controller and run it on the current tokio runtime.
    pub fn spawn(
        provider: P,
        resolver: Arc<dyn TargetResolver>,
        store: Arc<dyn SessionStore>,
        sink: Arc<dyn OutputSink>,
        options: ControllerOptions,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (controller, handle) = Self::new(provider, resolver, store, sink, options);
        let task = tokio::spawn(controller.run());
        (handle, task)
    }

    /// Controller event loop. Returns after shutdown or once every handle
    /// has been dropped; an active recording is stopped and saved first.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Recording controller starting");

        self.recover_interrupted_session();
        self.publish();

        loop {
            if let Some(intent) = self.inbox.take_pending() {
                self.apply(intent).await;
                continue;
            }

            if self.inbox.shutdown_requested() {
                break;
            }

            if self.capture.has_ended() {
                info!(session_id = ?self.session.id(), "Capture ended out-of-band");
                if let Err(e) = self.stop_session().await {
                    self.report_failure(&e);
                }
                continue;
            }

            tokio::select! {
                cmd = self.inbox.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => info!("All controller handles dropped"),
                },
                event = self.capture.next_event(), if self.capture.is_listening() => {
                    self.capture.absorb(event);
                }
            }
        }

        if self.session.is_active() {
            info!("Stopping active recording before shutdown");
            if let Err(e) = self.stop_session().await {
                self.report_failure(&e);
            }
        }

        self.inbox.finish_shutdown();
        info!("Recording controller shut down");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::GetStatus { reply } => {
                let _ = reply.send(self.current_status());
            }
            Command::Shutdown { reply } => {
                info!("Shutdown requested");
                self.inbox.request_shutdown(Some(reply));
            }
            Command::Start { reply } => self.apply(Intent::Start(reply)).await,
            Command::Stop { reply } => self.apply(Intent::Stop(reply)).await,
            Command::Toggle { direction, reply } => {
                self.apply(Intent::Toggle { direction, reply }).await;
            }
        }
    }

    async fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Start(reply) => {
                let result = self.start_session().await;
                if let Err(e) = &result {
                    self.report_failure(e);
                }
                let _ = reply.send(result);
            }
            Intent::Stop(reply) => {
                let result = self.stop_session().await;
                if let Err(e) = &result {
                    self.report_failure(e);
                }
                let _ = reply.send(result);
            }
            Intent::Toggle { direction, reply } => {
                debug!(direction = ?direction, "Applying toggle");
                let result = match direction {
                    ToggleDirection::Start => self.start_session().await.map(|_| ()),
                    ToggleDirection::Stop => self.stop_session().await.map(|_| ()),
                };
                let response = match &result {
                    Ok(()) => ToggleResponse::ok(),
                    Err(e) => {
                        self.report_failure(e);
                        ToggleResponse::failed(e)
                    }
                };
                let _ = reply.send(response);
            }
        }
    }

    /// Idle -> Starting -> Recording.
    #[instrument(skip(self))]
    async fn start_session(&mut self) -> CoreResult<SessionStatus> {
        if self.session.is_active() {
            return Err(RecorderError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let target = self
            .resolver
            .active_target()
            .ok_or_else(|| RecorderError::NoActiveTarget {
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.options.policy.validate(&target)?;

        self.enter(SessionPhase::Starting);

        let events = match self.request_capture(&target).await {
            Ok(events) => events,
            Err(e) => {
                self.provider.abort();
                self.enter(SessionPhase::Idle);
                return Err(e);
            }
        };

        if let Err(e) = self.store.set(true) {
            error!(error = ?e, "Failed to persist active session, aborting capture");
            self.provider.abort();
            self.enter(SessionPhase::Idle);
            return Err(e);
        }

        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        self.session = Session::Active {
            id: session_id,
            started_at,
            target: target.clone(),
        };
        self.capture.begin(events);
        self.enter(SessionPhase::Recording);

        self.broadcaster.notify(Notification::Started {
            session_id,
            started_at,
            target: target.clone(),
        });

        info!(
            session_id = %session_id,
            target_id = target.id,
            uri = %target.uri,
            "Recording started"
        );

        Ok(self.current_status())
    }

    async fn request_capture(
        &mut self,
        target: &CaptureTarget,
    ) -> CoreResult<mpsc::Receiver<CaptureEvent>> {
        let status = self.current_status();
        let limit = self.options.start_timeout;
        drive_transition(
            self.provider.start(target),
            limit,
            "start",
            &mut self.inbox,
            &mut self.capture,
            &status,
        )
        .await
        .and_then(|started| started)
    }

    /// Recording -> Stopping -> Idle. A no-op when nothing is active.
    ///
    /// The session is cleared even when finalization or assembly fails.
    #[instrument(skip(self))]
    async fn stop_session(&mut self) -> CoreResult<Option<ArtifactRef>> {
        let (Some(session_id), Some(started_at)) = (self.session.id(), self.session.started_at())
        else {
            debug!("Stop requested while idle");
            return Ok(None);
        };

        self.enter(SessionPhase::Stopping);

        let status = self.current_status();
        let limit = self.options.stop_timeout;
        let finalized = drive_transition(
            self.provider.stop(),
            limit,
            "stop",
            &mut self.inbox,
            &mut self.capture,
            &status,
        )
        .await
        .and_then(|tail| tail);

        let mut failure = None;
        match finalized {
            Ok(tail) => {
                self.capture.drain_ready();
                self.capture.extend(tail);
            }
            Err(e) => {
                warn!(session_id = %session_id, error = ?e, "Encoder did not finalize cleanly");
                self.provider.abort();
                self.capture.drain_ready();
                failure = Some(e);
            }
        }

        debug!(
            session_id = %session_id,
            chunks = self.capture.chunk_count(),
            "Assembling recording"
        );
        let chunks = self.capture.finish();
        let stopped_at = Utc::now();

        let artifact = match OutputArtifact::assemble(chunks, &self.options.container, stopped_at) {
            Ok(artifact) => {
                let artifact_ref = artifact.describe();
                self.sink.save(artifact);
                Some(artifact_ref)
            }
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to assemble recording");
                if failure.is_none() {
                    failure = Some(e);
                }
                None
            }
        };

        self.persist_idle(artifact.is_some());
        self.session = Session::Idle;
        self.enter(SessionPhase::Idle);

        let duration = stopped_at - started_at;
        info!(
            session_id = %session_id,
            duration_ms = duration.num_milliseconds(),
            artifact = ?artifact.as_ref().map(|a| &a.filename),
            "Recording stopped"
        );

        if let Some(artifact) = &artifact {
            self.broadcaster.notify(Notification::Completed {
                session_id,
                artifact: artifact.clone(),
            });
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(artifact),
        }
    }

    /// Store says a session was active but no controller was running it.
    fn recover_interrupted_session(&self) {
        match self.store.get() {
            Ok(true) => {
                warn!(
                    kind = ?ErrorKind::ProcessRestartInterruption,
                    "Previous process exited mid-recording, forcing idle"
                );
                if let Err(e) = self.store.set(false) {
                    error!(error = ?e, "Failed to clear interrupted session flag");
                }
                self.broadcaster.notify(Notification::Failed {
                    kind: ErrorKind::ProcessRestartInterruption,
                    message: "The previous recording was interrupted and could not be recovered"
                        .to_string(),
                });
            }
            Ok(false) => debug!("No interrupted session found"),
            Err(e) => warn!(error = ?e, "Could not read session store, starting idle"),
        }
    }

    fn persist_idle(&self, artifact_produced: bool) {
        let result = self.store.load().and_then(|mut record| {
            record.active = false;
            if artifact_produced {
                record.recording_count += 1;
            }
            self.store.save(&record)
        });

        if let Err(e) = result {
            error!(error = ?e, "Failed to persist idle session");
        }
    }

    fn report_failure(&self, error: &RecorderError) {
        error!(kind = ?error.kind(), error = ?error, "Recording transition failed");
        self.broadcaster.notify(Notification::Failed {
            kind: error.kind(),
            message: error.user_message(),
        });
    }

    fn enter(&mut self, phase: SessionPhase) {
        debug!(from = ?self.phase, to = ?phase, "Phase transition");
        self.phase = phase;
        self.publish();
    }

    fn publish(&self) {
        self.broadcaster.publish(self.current_status());
    }

    fn current_status(&self) -> SessionStatus {
        self.session.status(self.phase)
    }
}

/// Await an in-flight provider call without going deaf.
///
/// While `transition` runs, commands are deferred (status answered at once)
/// and capture events keep flowing into the buffer. Gives up after `limit`.
async fn drive_transition<F: Future>(
    transition: F,
    limit: Duration,
    operation: &'static str,
    inbox: &mut Inbox,
    capture: &mut CaptureBuffer,
    status: &SessionStatus,
) -> CoreResult<F::Output> {
    let deadline = tokio::time::sleep(limit);
    tokio::pin!(transition);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            biased;

            output = &mut transition => return Ok(output),

            () = &mut deadline => {
                warn!(operation, timeout_ms = limit.as_millis(), "Capture provider timed out");
                return Err(RecorderError::Timeout {
                    operation,
                    after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            event = capture.next_event(), if capture.is_listening() => {
                capture.absorb(event);
            }

            cmd = inbox.recv(), if !inbox.is_closed() => {
                if let Some(cmd) = cmd {
                    inbox.defer(cmd, status);
                }
            }
        }
    }
}
