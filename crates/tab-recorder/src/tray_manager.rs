//! System tray badge.
//!
//! Draws a coloured dot per [`BadgeState`] and carries the context menu
//! (Toggle Recording, Open Recordings Folder, Exit).

use crate::{AppError, AppResult};

use tab_recorder_core::presentation::BadgeState;

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Edge length of the generated icon, in pixels.
pub(crate) const ICON_SIZE: u32 = 32;

/// Ring thickness of the idle badge.
const RING_WIDTH: f32 = 3.0;

/// Tooltip shown while idle.
pub(crate) const READY_TOOLTIP: &str = "Tab Recorder - Ready";

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    toggle_item_id: MenuId,
    open_folder_item_id: MenuId,
    exit_item_id: MenuId,
}

impl TrayManager {
    /// Create a new tray manager showing the idle badge.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let toggle_item = MenuItem::new("Toggle Recording", true, None);
        let open_folder_item = MenuItem::new("Open Recordings Folder", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let toggle_id = toggle_item.id().clone();
        let open_folder_id = open_folder_item.id().clone();
        let exit_id = exit_item.id().clone();

        menu.append_items(&[
            &toggle_item,
            &open_folder_item,
            &PredefinedMenuItem::separator(),
            &exit_item,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = badge_icon(BadgeState::Idle)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(READY_TOOLTIP)
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            toggle_item_id: toggle_id,
            open_folder_item_id: open_folder_id,
            exit_item_id: exit_id,
        })
    }

    /// Redraw the badge. The badge text doubles as the menu bar title on macOS.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn set_badge(&mut self, state: BadgeState) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(badge_icon(state)?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let text = state.text();
        self.tray_icon
            .set_title(if text.is_empty() { None } else { Some(text) });

        Ok(())
    }

    /// Replace the hover text.
    #[track_caller]
    pub fn set_tooltip(&mut self, tooltip: &str) -> AppResult<()> {
        self.tray_icon
            .set_tooltip(Some(tooltip))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Get the toggle menu item ID.
    pub fn toggle_item_id(&self) -> &MenuId {
        &self.toggle_item_id
    }

    /// Get the open-folder menu item ID.
    pub fn open_folder_item_id(&self) -> &MenuId {
        &self.open_folder_item_id
    }

    /// Get the exit menu item ID.
    pub fn exit_item_id(&self) -> &MenuId {
        &self.exit_item_id
    }
}

#[track_caller]
fn badge_icon(state: BadgeState) -> AppResult<Icon> {
    Icon::from_rgba(badge_pixels(state, ICON_SIZE), ICON_SIZE, ICON_SIZE).map_err(|e| {
        AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }
    })
}

/// RGBA pixels of a `size`x`size` badge: a ring when idle, a filled dot otherwise.
pub(crate) fn badge_pixels(state: BadgeState, size: u32) -> Vec<u8> {
    let [r, g, b, a] = state.rgba();
    let center = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 / 2.0 - 1.0;
    let inner = if state == BadgeState::Idle {
        outer - RING_WIDTH
    } else {
        -1.0
    };

    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= outer && distance > inner {
                pixels.extend_from_slice(&[r, g, b, a]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    pixels
}
