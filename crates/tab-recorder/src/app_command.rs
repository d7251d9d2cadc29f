/// Commands sent from input sources (hotkey, tray menu) to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start when idle, stop when recording.
    ToggleRecording,
    /// Request application shutdown.
    Shutdown,
}
