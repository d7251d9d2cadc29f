use tab_recorder_core::presentation::BadgeState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayCommand {
    /// Redraw the badge.
    SetBadge(BadgeState),
    /// Replace the hover text (status and running timer).
    SetTooltip(String),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
