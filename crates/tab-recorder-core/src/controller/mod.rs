//! Recording session lifecycle.
//!
//! A single controller task owns the [`Session`](crate::session::Session),
//! the chunk buffer and the capture provider. Every other context talks to
//! it through a [`ControllerHandle`].

mod capture_buffer;
mod command;
mod handle;
mod inbox;
mod options;
mod recording_controller;

pub(crate) use {capture_buffer::CaptureBuffer, inbox::Inbox};

pub use {
    command::{Command, Intent, ToggleDirection},
    handle::ControllerHandle,
    options::{ControllerOptions, DEFAULT_START_TIMEOUT, DEFAULT_STOP_TIMEOUT},
    recording_controller::RecordingController,
};
