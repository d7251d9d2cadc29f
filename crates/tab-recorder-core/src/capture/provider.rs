use crate::{CoreResult, capture::CaptureTarget};

use std::future::Future;

use tokio::sync::mpsc;

/// One encoder-emitted binary segment of an in-progress recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk(Vec<u8>);

impl Chunk {
    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chunk carries no data.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for Chunk {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

/// Typed messages sent from the capture context to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A new encoded segment is available.
    Chunk(Chunk),
    /// Capture terminated out-of-band (e.g. the user revoked sharing).
    Ended,
}

/// Platform capture and encoder, owned by exactly one controller.
///
/// `start` hands back the receiving half of the event channel; the provider
/// keeps the sender for as long as capture runs. Both async operations are
/// suspension points bounded by the controller's timeouts.
pub trait CaptureProvider: Send + 'static {
    /// Begin capturing `target`.
    ///
    /// Fails with [`crate::RecorderError::CaptureDenied`] when the platform
    /// or the user declines.
    fn start(
        &mut self,
        target: &CaptureTarget,
    ) -> impl Future<Output = CoreResult<mpsc::Receiver<CaptureEvent>>> + Send;

    /// Finalize the encoder and return chunks it still held.
    ///
    /// Chunks already delivered as [`CaptureEvent::Chunk`] are not repeated.
    fn stop(&mut self) -> impl Future<Output = CoreResult<Vec<Chunk>>> + Send;

    /// Tear down a half-started or hung capture without finalizing.
    fn abort(&mut self) {}
}
