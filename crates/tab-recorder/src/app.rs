use crate::{
    AppCommand, AppResult, TrayCommand,
    badge_presenter::BadgePresenter,
    notifier::{Notice, Notifier},
};

use tab_recorder_core::{
    ErrorKind,
    broadcast::Notification,
    capture::{CaptureProvider, TargetResolver},
    controller::{ControllerHandle, ControllerOptions, RecordingController},
    output::OutputSink,
    store::SessionStore,
};

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use tao::event_loop::EventLoopProxy;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::{MenuEvent, MenuId};

/// Tooltip timer refresh interval.
const TICK: Duration = Duration::from_secs(1);

/// How long shutdown waits for the controller to save an active recording.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

/// Spawn the recording controller with a notification receiver attached.
///
/// The receiver exists before the controller's first publish, so a restart
/// interruption reported at startup reaches the app.
pub(crate) fn start_controller<P: CaptureProvider>(
    provider: P,
    resolver: Arc<dyn TargetResolver>,
    store: Arc<dyn SessionStore>,
    sink: Arc<dyn OutputSink>,
    options: ControllerOptions,
) -> (ControllerHandle, broadcast::Receiver<Notification>, JoinHandle<()>) {
    let (controller, handle) = RecordingController::new(provider, resolver, store, sink, options);
    let notifications = handle.subscribe();
    let task = tokio::spawn(controller.run());
    (handle, notifications, task)
}

/// Ask the controller to finish, saving an active recording first.
pub(crate) async fn shutdown_controller(controller: &ControllerHandle) -> AppResult<()> {
    controller.shutdown().await?;
    Ok(())
}

/// Main application state.
///
/// Runs on the async runtime thread. Communicates tray icon updates
/// back to the main thread via `tray_proxy` because `TrayIcon` is `!Send`
/// and must remain on the UI thread.
pub struct App {
    pub(crate) controller: ControllerHandle,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) notifier: Notifier,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) recordings_dir: PathBuf,
    pub(crate) error_badge: Duration,
    pub(crate) toggle_menu_id: MenuId,
    pub(crate) open_folder_menu_id: MenuId,
    pub(crate) exit_menu_id: MenuId,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self, notifications))]
    pub(crate) async fn run(
        mut self,
        mut notifications: broadcast::Receiver<Notification>,
    ) -> AppResult<()> {
        info!("Tab Recorder starting");

        // MenuEvent::receiver() is a blocking crossbeam receiver; one
        // blocking task forwards it. Dropping tray_event_rx ends the task.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let mut presenter = BadgePresenter::new(self.error_badge);
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if let Err(e) = self.handle_tray_event(event).await {
                        error!(error = ?e, "Failed to handle tray event");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::ToggleRecording => self.spawn_toggle(),
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                received = notifications.recv() => {
                    match received {
                        Ok(notification) => self.handle_notification(notification, &mut presenter),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Notification receiver lagged");
                            self.refresh_tray(&mut presenter);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("Controller stopped publishing, shutting down");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => self.refresh_tray(&mut presenter),
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, shutdown_controller(&self.controller)).await {
            Ok(Ok(())) => info!("Recording controller stopped"),
            Ok(Err(e)) => debug!(error = ?e, "Recording controller already gone"),
            Err(_) => warn!("Recording controller did not stop within timeout"),
        }

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        self.send_tray(TrayCommand::Shutdown);
        info!("Tab Recorder shut down successfully");

        Ok(())
    }

    /// Toggle without holding up the event loop; the controller serializes
    /// concurrent requests itself.
    fn spawn_toggle(&self) {
        let controller = self.controller.clone();
        tokio::spawn(async move {
            let response = controller.toggle().await;
            if response.success {
                debug!("Toggle completed");
            } else {
                warn!(error = ?response.error, "Toggle failed");
            }
        });
    }

    fn handle_notification(&self, notification: Notification, presenter: &mut BadgePresenter) {
        if let Notification::Failed { kind, .. } = &notification {
            if *kind != ErrorKind::Superseded {
                presenter.hold_error(Instant::now());
            }
        }

        if let Some(notice) = Notice::for_notification(&notification, &self.recordings_dir) {
            self.notifier.show(notice);
        }

        self.refresh_tray(presenter);
    }

    fn refresh_tray(&self, presenter: &mut BadgePresenter) {
        let status = self.controller.status();
        for cmd in presenter.refresh(&status, Instant::now(), Utc::now()) {
            self.send_tray(cmd);
        }
    }

    fn send_tray(&self, cmd: TrayCommand) {
        if let Err(e) = self.tray_proxy.send_event(cmd) {
            debug!(error = ?e, "Tray event loop closed");
        }
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_tray_event(&mut self, event: MenuEvent) -> AppResult<()> {
        let event_id = &event.id;

        if *event_id == self.toggle_menu_id {
            self.spawn_toggle();
        } else if *event_id == self.open_folder_menu_id {
            std::fs::create_dir_all(&self.recordings_dir)?;
            if let Err(e) = open::that(&self.recordings_dir) {
                warn!(dir = ?self.recordings_dir, error = ?e, "Failed to open recordings folder");
            } else {
                info!(dir = ?self.recordings_dir, "Opened recordings folder");
            }
        } else if *event_id == self.exit_menu_id {
            info!("Exit requested from tray menu");
            if let Err(e) = self.command_tx.send(AppCommand::Shutdown).await {
                error!(error = ?e, "Failed to send shutdown command");
            }
        }

        Ok(())
    }
}
