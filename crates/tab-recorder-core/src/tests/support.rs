//! Test doubles for the controller's collaborators.

use crate::{
    CoreResult, RecorderError,
    broadcast::Notification,
    capture::{CaptureEvent, CaptureProvider, CaptureTarget, Chunk, TargetResolver},
    controller::{ControllerHandle, ControllerOptions, RecordingController},
    output::{OutputArtifact, OutputSink},
    session::{SessionPhase, SessionStatus},
    store::MemorySessionStore,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{
    sync::{Notify, broadcast, mpsc},
    task::JoinHandle,
};

/// Upper bound for any single wait in controller tests.
pub(crate) const TEST_WAIT: Duration = Duration::from_secs(5);

/// Shared view into a [`ScriptedProvider`] after it moved into the controller.
#[derive(Clone, Default)]
pub(crate) struct ProviderProbe {
    start_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
    abort_calls: Arc<AtomicUsize>,
    event_tx: Arc<Mutex<Option<mpsc::Sender<CaptureEvent>>>>,
}

impl ProviderProbe {
    pub(crate) fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn abort_calls(&self) -> usize {
        self.abort_calls.load(Ordering::SeqCst)
    }

    fn sender(&self) -> Option<mpsc::Sender<CaptureEvent>> {
        self.event_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn install(&self, tx: Option<mpsc::Sender<CaptureEvent>>) {
        *self.event_tx.lock().unwrap_or_else(|e| e.into_inner()) = tx;
    }

    /// Emit one encoded chunk from the running capture.
    pub(crate) async fn emit(&self, bytes: &[u8]) {
        if let Some(tx) = self.sender() {
            let _ = tx.send(CaptureEvent::Chunk(Chunk::from(bytes))).await;
        }
    }

    /// Simulate the user revoking sharing.
    pub(crate) async fn end(&self) {
        if let Some(tx) = self.sender() {
            let _ = tx.send(CaptureEvent::Ended).await;
        }
        self.install(None);
    }
}

/// Scriptable in-memory capture provider.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    pub(crate) probe: ProviderProbe,
    pub(crate) deny: bool,
    pub(crate) start_gate: Option<Arc<Notify>>,
    pub(crate) hang_start: bool,
    pub(crate) hang_stop: bool,
    pub(crate) initial_chunks: Vec<Vec<u8>>,
    pub(crate) tail: Vec<Vec<u8>>,
}

impl CaptureProvider for ScriptedProvider {
    async fn start(&mut self, _target: &CaptureTarget) -> CoreResult<mpsc::Receiver<CaptureEvent>> {
        self.probe.start_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.start_gate {
            gate.notified().await;
        }
        if self.hang_start {
            std::future::pending::<()>().await;
        }
        if self.deny {
            return Err(RecorderError::CaptureDenied {
                reason: "user dismissed the picker".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (tx, rx) = mpsc::channel(64);
        for bytes in &self.initial_chunks {
            let _ = tx.send(CaptureEvent::Chunk(Chunk::from(bytes.clone()))).await;
        }
        self.probe.install(Some(tx));

        Ok(rx)
    }

    async fn stop(&mut self) -> CoreResult<Vec<Chunk>> {
        self.probe.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_stop {
            std::future::pending::<()>().await;
        }
        self.probe.install(None);
        Ok(self.tail.iter().cloned().map(Chunk::from).collect())
    }

    fn abort(&mut self) {
        self.probe.abort_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.install(None);
    }
}

/// Sink that keeps artifacts in memory.
#[derive(Clone, Default)]
pub(crate) struct CollectingSink {
    saved: Arc<Mutex<Vec<OutputArtifact>>>,
}

impl CollectingSink {
    pub(crate) fn saved(&self) -> Vec<OutputArtifact> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl OutputSink for CollectingSink {
    fn save(&self, artifact: OutputArtifact) {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(artifact);
    }
}

/// Resolver whose active target can be swapped by the test.
pub(crate) struct SwitchableResolver {
    target: Mutex<Option<CaptureTarget>>,
}

impl SwitchableResolver {
    pub(crate) fn new(target: Option<CaptureTarget>) -> Self {
        Self {
            target: Mutex::new(target),
        }
    }
}

impl TargetResolver for SwitchableResolver {
    fn active_target(&self) -> Option<CaptureTarget> {
        self.target.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// A running controller plus everything a test inspects.
pub(crate) struct Harness {
    pub(crate) handle: ControllerHandle,
    pub(crate) probe: ProviderProbe,
    pub(crate) sink: CollectingSink,
    pub(crate) store: Arc<MemorySessionStore>,
    pub(crate) task: JoinHandle<()>,
}

pub(crate) fn web_target() -> CaptureTarget {
    CaptureTarget::new(7, "https://example.com/")
}

pub(crate) fn fast_options() -> ControllerOptions {
    ControllerOptions {
        start_timeout: Duration::from_millis(200),
        stop_timeout: Duration::from_millis(200),
        ..ControllerOptions::default()
    }
}

pub(crate) fn harness(provider: ScriptedProvider) -> Harness {
    harness_with(
        provider,
        Some(web_target()),
        Arc::new(MemorySessionStore::new()),
        ControllerOptions::default(),
    )
}

pub(crate) fn harness_with(
    provider: ScriptedProvider,
    target: Option<CaptureTarget>,
    store: Arc<MemorySessionStore>,
    options: ControllerOptions,
) -> Harness {
    let probe = provider.probe.clone();
    let sink = CollectingSink::default();
    let (handle, task) = RecordingController::spawn(
        provider,
        Arc::new(SwitchableResolver::new(target)),
        store.clone(),
        Arc::new(sink.clone()),
        options,
    );

    Harness {
        handle,
        probe,
        sink,
        store,
        task,
    }
}

/// Wait until the published status reaches `phase`.
pub(crate) async fn wait_for_phase(
    handle: &ControllerHandle,
    phase: SessionPhase,
) -> SessionStatus {
    let mut rx = handle.watch();
    let waited = tokio::time::timeout(TEST_WAIT, async {
        loop {
            let status = rx.borrow_and_update().clone();
            if status.phase == phase {
                return Some(status);
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    })
    .await;

    match waited {
        Ok(Some(status)) => status,
        _ => handle.status(),
    }
}

/// Wait for the first notification accepted by `matches`.
pub(crate) async fn next_notification(
    rx: &mut broadcast::Receiver<Notification>,
    matches: impl Fn(&Notification) -> bool,
) -> Option<Notification> {
    tokio::time::timeout(TEST_WAIT, async {
        loop {
            match rx.recv().await {
                Ok(n) if matches(&n) => return Some(n),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
