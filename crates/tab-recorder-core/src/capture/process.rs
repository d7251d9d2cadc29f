//! Capture provider backed by an external encoder process.
//!
//! The encoder (ffmpeg by default) writes its container stream to stdout.
//! Output is cut into chunks of `chunk_size` bytes and forwarded as
//! [`CaptureEvent::Chunk`]; encoder exit is reported as [`CaptureEvent::Ended`].

use crate::{
    CoreResult, RecorderError,
    capture::{CaptureEvent, CaptureProvider, CaptureTarget, Chunk},
};

use std::{panic::Location, process::Stdio};

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::{Child, ChildStdout, Command},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// Placeholder in encoder arguments replaced by the target URI.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Buffered events between the reader task and the controller.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Size of a single read from the encoder's stdout.
const READ_BUFFER_BYTES: usize = 16 * 1024;

/// Encoder process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCaptureConfig {
    /// Encoder executable.
    pub program: String,
    /// Encoder arguments; [`TARGET_PLACEHOLDER`] is substituted.
    pub args: Vec<String>,
    /// Bytes per emitted chunk.
    pub chunk_size: usize,
}

struct RunningCapture {
    child: Child,
    reader: JoinHandle<CoreResult<Vec<Chunk>>>,
}

/// [`CaptureProvider`] that spawns an encoder process per session.
pub struct ProcessCaptureProvider {
    config: ProcessCaptureConfig,
    running: Option<RunningCapture>,
}

impl ProcessCaptureProvider {
    /// Create a provider; nothing is spawned until `start`.
    pub fn new(config: ProcessCaptureConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    fn expand_args(&self, target: &CaptureTarget) -> Vec<String> {
        self.config
            .args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, &target.uri))
            .collect()
    }
}

impl CaptureProvider for ProcessCaptureProvider {
    #[instrument(skip(self))]
    async fn start(&mut self, target: &CaptureTarget) -> CoreResult<mpsc::Receiver<CaptureEvent>> {
        if self.running.is_some() {
            return Err(RecorderError::CaptureDenied {
                reason: "encoder already running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let args = self.expand_args(target);

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecorderError::CaptureDenied {
                reason: format!("Failed to launch {}: {}", self.config.program, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RecorderError::CaptureDenied {
                reason: "Encoder stdout unavailable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let chunk_size = self.config.chunk_size.max(1);
        let reader = tokio::spawn(forward_chunks(stdout, chunk_size, event_tx));

        info!(
            program = %self.config.program,
            pid = ?child.id(),
            "Encoder process started"
        );

        self.running = Some(RunningCapture { child, reader });

        Ok(event_rx)
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> CoreResult<Vec<Chunk>> {
        let Some(mut running) = self.running.take() else {
            debug!("Stop requested with no encoder running");
            return Ok(Vec::new());
        };

        // ffmpeg finalizes the container on "q"; other encoders see EOF.
        if let Some(mut stdin) = running.child.stdin.take() {
            if let Err(e) = stdin.write_all(b"q").await {
                debug!(error = ?e, "Encoder stdin already closed");
            }
            drop(stdin);
        }

        let status = running.child.wait().await?;
        debug!(?status, "Encoder process exited");

        let tail = running
            .reader
            .await
            .map_err(|e| RecorderError::AssemblyFailure {
                reason: format!("Chunk reader task failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })??;

        info!(tail_chunks = tail.len(), "Encoder finalized");

        Ok(tail)
    }

    fn abort(&mut self) {
        if let Some(mut running) = self.running.take() {
            if let Err(e) = running.child.start_kill() {
                warn!(error = ?e, "Failed to kill encoder process");
            }
            running.reader.abort();
            info!("Encoder process aborted");
        }
    }
}

/// Read encoder output until EOF, forwarding full chunks as events.
///
/// Returns the trailing partial chunk plus anything the controller stopped
/// listening for.
async fn forward_chunks(
    mut stdout: ChildStdout,
    chunk_size: usize,
    event_tx: mpsc::Sender<CaptureEvent>,
) -> CoreResult<Vec<Chunk>> {
    let mut pending = Vec::with_capacity(chunk_size);
    let mut undelivered = Vec::new();
    let mut buf = vec![0u8; READ_BUFFER_BYTES];

    loop {
        let n = stdout.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        pending.extend_from_slice(&buf[..n]);

        while pending.len() >= chunk_size {
            let rest = pending.split_off(chunk_size);
            let chunk = Chunk::from(std::mem::replace(&mut pending, rest));
            if let Err(mpsc::error::SendError(CaptureEvent::Chunk(chunk))) =
                event_tx.send(CaptureEvent::Chunk(chunk)).await
            {
                undelivered.push(chunk);
            }
        }
    }

    debug!("Encoder output reached EOF");
    let _ = event_tx.send(CaptureEvent::Ended).await;

    if !pending.is_empty() {
        undelivered.push(Chunk::from(pending));
    }

    Ok(undelivered)
}
