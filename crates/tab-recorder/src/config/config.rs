//! Configuration management for tab-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{BehaviourConfig, CaptureConfig, OutputConfig, TimeoutConfig},
};

use tab_recorder_core::controller::ControllerOptions;

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Encoder and target settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Start/stop bounds.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Recordings destination.
    #[serde(default)]
    pub output: OutputConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behaviour: BehaviourConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    #[track_caller]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to parse config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Controller tunables derived from this config.
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            start_timeout: self.timeouts.start(),
            stop_timeout: self.timeouts.stop(),
            container: self.capture.container(),
            policy: self.capture.policy(),
            ..ControllerOptions::default()
        }
    }

    /// Per-user data directory holding the session record and logs.
    #[track_caller]
    pub fn data_dir() -> AppResult<PathBuf> {
        let data_dir = Self::project_dirs()?.data_dir().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
            debug!(data_dir = ?data_dir, "Created data directory");
        }

        Ok(data_dir)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "tab-recorder", "Tab-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
