//! Session model and status snapshots.

mod phase;
#[allow(clippy::module_inception)]
mod session;
mod status;

pub use {
    phase::SessionPhase,
    session::Session,
    status::{SessionStatus, ToggleResponse},
};
