//! Tab Recorder Core Library
//!
//! Recording session lifecycle: one controller task owns the session, drives
//! a [`CaptureProvider`](capture::CaptureProvider), persists the active flag
//! through a [`SessionStore`](store::SessionStore), and publishes status to
//! presentation surfaces.
//!
//! # Example
//!
//! ```no_run
//! use tab_recorder_core::{
//!     capture::{CaptureTarget, FixedTarget, ProcessCaptureConfig, ProcessCaptureProvider},
//!     controller::{ControllerOptions, RecordingController},
//!     output::DirectorySink,
//!     store::FileSessionStore,
//! };
//!
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = ProcessCaptureProvider::new(ProcessCaptureConfig {
//!         program: "ffmpeg".to_string(),
//!         args: vec!["-i".into(), "{target}".into(), "-f".into(), "webm".into(), "pipe:1".into()],
//!         chunk_size: 256 * 1024,
//!     });
//!
//!     let (handle, task) = RecordingController::spawn(
//!         provider,
//!         Arc::new(FixedTarget(CaptureTarget::new(1, ":0.0"))),
//!         Arc::new(FileSessionStore::new("session.toml")),
//!         Arc::new(DirectorySink::new("recordings")),
//!         ControllerOptions::default(),
//!     );
//!
//!     let response = handle.toggle().await;
//!     println!("started: {}", response.success);
//!     let _ = handle.toggle().await;
//!     let _ = handle.shutdown().await;
//!     let _ = task.await;
//! }
//! ```

pub mod broadcast;
pub mod capture;
pub mod controller;
mod error;
pub mod output;
pub mod presentation;
pub mod session;
pub mod store;

pub use error::{ErrorKind, RecorderError, Result as CoreResult};

#[cfg(test)]
mod tests;
