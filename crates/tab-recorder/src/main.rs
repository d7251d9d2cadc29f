//! Tab Recorder: desktop screen recorder toggled from a global hotkey or the tray.

mod app;
mod app_command;
mod badge_presenter;
mod config;
mod error;
mod hotkey_handler;
mod notifier;
#[cfg(test)]
mod tests;
mod tray_command;
mod tray_manager;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    tray_command::TrayCommand,
    tray_manager::TrayManager,
};

use crate::{app::start_controller, config::Config, notifier::Notifier};

use tab_recorder_core::{
    capture::{FixedTarget, ProcessCaptureProvider},
    output::DirectorySink,
    store::FileSessionStore,
};

use std::{sync::Arc, time::Duration};

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "tab_recorder=debug,tab_recorder_core=debug";

/// Name prefix of the daily rolling log file.
const LOG_FILE_NAME: &str = "tab-recorder.log";

/// Session record file inside the data directory.
const SESSION_FILE_NAME: &str = "session.toml";

/// Application entry point.
fn main() {
    let log_guard = init_logging();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping the manager unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                let result = match cmd {
                    TrayCommand::SetBadge(state) => tray_manager.set_badge(state),
                    TrayCommand::SetTooltip(tooltip) => tray_manager.set_tooltip(&tooltip),
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    error!(error = ?e, "Failed to update tray icon");
                }
                return;
            }
            Event::NewEvents(StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let session_path = match Config::data_dir() {
                    Ok(dir) => dir.join(SESSION_FILE_NAME),
                    Err(e) => {
                        error!("Failed to resolve data directory: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Register hotkey on the main thread: tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_id) = match HotkeyHandler::register_hotkey() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkey: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let tray_proxy = tray_proxy.clone();
                let toggle_menu_id = tray_manager.toggle_item_id().clone();
                let open_folder_menu_id = tray_manager.open_folder_item_id().clone();
                let exit_menu_id = tray_manager.exit_item_id().clone();

                // Tokio runtime on a separate thread; TrayManager and
                // hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let recordings_dir = config.output.recordings_dir();
                        info!(
                            recordings_dir = ?recordings_dir,
                            session_path = ?session_path,
                            target = %config.capture.target,
                            "Starting recording controller"
                        );

                        let (controller, notifications, controller_task) = start_controller(
                            ProcessCaptureProvider::new(config.capture.provider_config()),
                            Arc::new(FixedTarget(config.capture.capture_target())),
                            Arc::new(FileSessionStore::new(session_path)),
                            Arc::new(DirectorySink::new(recordings_dir.clone())),
                            config.controller_options(),
                        );

                        let (command_tx, command_rx) = mpsc::channel(32);
                        let (shutdown_tx, shutdown_rx) = watch::channel(false);

                        let hotkey_handler = HotkeyHandler::new(hotkey_id, command_tx.clone());

                        let app = App {
                            controller,
                            tray_proxy,
                            notifier: Notifier::new(config.behaviour.notifications),
                            command_tx,
                            command_rx,
                            shutdown_tx,
                            recordings_dir,
                            error_badge: config.behaviour.error_badge(),
                            toggle_menu_id,
                            open_folder_menu_id,
                            exit_menu_id,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run(notifications).await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );

                        if tokio::time::timeout(Duration::from_secs(1), controller_task)
                            .await
                            .is_err()
                        {
                            warn!("Recording controller task still running at exit");
                        }
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager and the log writer alive for the app's lifetime.
        let _ = &hotkey_manager;
        let _ = &log_guard;
    });
}

/// Console output plus a daily rolling JSON log in the data directory.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let data_dir = Config::data_dir();
    let (file_layer, guard) = match &data_dir {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Err(e) = data_dir {
        warn!(error = ?e, "File logging disabled");
    }

    guard
}
