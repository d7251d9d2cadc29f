use crate::capture::{CaptureEvent, Chunk};

use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Chunk buffer of the active session and the event stream feeding it.
///
/// Append-only while recording; drained once at stop.
#[derive(Default)]
pub(crate) struct CaptureBuffer {
    events: Option<mpsc::Receiver<CaptureEvent>>,
    chunks: Vec<Chunk>,
    ended: bool,
}

impl CaptureBuffer {
    /// Start buffering a new session fed by `events`.
    pub(crate) fn begin(&mut self, events: mpsc::Receiver<CaptureEvent>) {
        self.events = Some(events);
        self.chunks.clear();
        self.ended = false;
    }

    pub(crate) fn is_listening(&self) -> bool {
        self.events.is_some() && !self.ended
    }

    pub(crate) fn has_ended(&self) -> bool {
        self.ended
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Next event; never resolves when not listening.
    pub(crate) async fn next_event(&mut self) -> Option<CaptureEvent> {
        match self.events.as_mut() {
            Some(events) if !self.ended => events.recv().await,
            _ => std::future::pending().await,
        }
    }

    /// Fold one event into the buffer. A closed channel counts as ended.
    pub(crate) fn absorb(&mut self, event: Option<CaptureEvent>) {
        match event {
            Some(CaptureEvent::Chunk(chunk)) => self.push(chunk),
            Some(CaptureEvent::Ended) => {
                debug!(chunks = self.chunks.len(), "Capture reported end of stream");
                self.ended = true;
            }
            None => {
                debug!("Capture event channel closed");
                self.ended = true;
            }
        }
    }

    /// Pull in events already queued without waiting.
    pub(crate) fn drain_ready(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return;
        };
        let mut drained = Vec::new();
        while let Ok(event) = events.try_recv() {
            drained.push(event);
        }
        for event in drained {
            if let CaptureEvent::Chunk(chunk) = event {
                self.push(chunk);
            }
        }
    }

    pub(crate) fn extend(&mut self, tail: Vec<Chunk>) {
        for chunk in tail {
            self.push(chunk);
        }
    }

    /// Hand over every buffered chunk and forget the event stream.
    pub(crate) fn finish(&mut self) -> Vec<Chunk> {
        self.events = None;
        self.ended = false;
        std::mem::take(&mut self.chunks)
    }

    fn push(&mut self, chunk: Chunk) {
        if chunk.is_empty() {
            return;
        }
        trace!(size = chunk.len(), total = self.chunks.len() + 1, "Chunk buffered");
        self.chunks.push(chunk);
    }
}
