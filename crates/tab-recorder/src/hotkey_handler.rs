//! Global hotkey handler.
//!
//! Registers CTRL+SHIFT+R as a global hotkey and forwards each press to the
//! main application as a toggle. The recording state itself lives in the
//! controller; this handler is stateless.

use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Human-readable shortcut, shown in notifications.
pub const TOGGLE_SHORTCUT: &str = "Ctrl+Shift+R";

/// Forwards presses of the registered hotkey as [`AppCommand::ToggleRecording`].
pub struct HotkeyHandler {
    hotkey_id: u32,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register CTRL+SHIFT+R as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao`/`winit` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey() -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = toggle_hotkey();

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", TOGGLE_SHORTCUT, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = TOGGLE_SHORTCUT, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`register_hotkey`](Self::register_hotkey).
    /// This struct is `Send` and can live on any thread; it only listens on
    /// the global [`GlobalHotKeyEvent`] channel.
    pub fn new(hotkey_id: u32, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            hotkey_id,
            command_tx,
        }
    }

    /// Run the hotkey handler event loop until shutdown is signalled.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a blocking crossbeam receiver.
        // Dropping event_rx makes the next blocking_send fail and ends the task.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if self.is_toggle_press(&event) {
                        self.handle_hotkey_press().await?;
                    }
                }
            }
        }

        drop(event_rx);

        // The blocking task may be parked in recv() until the next hotkey
        // event; it is cleaned up on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Only key-down of our hotkey toggles; releases are ignored.
    pub(crate) fn is_toggle_press(&self, event: &GlobalHotKeyEvent) -> bool {
        event.id == self.hotkey_id && matches!(event.state, HotKeyState::Pressed)
    }

    #[instrument(skip(self))]
    pub(crate) async fn handle_hotkey_press(&self) -> AppResult<()> {
        self.command_tx
            .send(AppCommand::ToggleRecording)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send ToggleRecording: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Toggle requested from hotkey");

        Ok(())
    }
}

/// The CTRL+SHIFT+R accelerator.
pub(crate) fn toggle_hotkey() -> HotKey {
    HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyR)
}
