//! Capture provider seam, targets and the encoder-process provider.

mod process;
mod provider;
mod target;

pub use {
    process::{ProcessCaptureConfig, ProcessCaptureProvider, TARGET_PLACEHOLDER},
    provider::{CaptureEvent, CaptureProvider, Chunk},
    target::{CaptureTarget, FixedTarget, TargetPolicy, TargetResolver},
};
