use crate::{
    CoreResult, RecorderError,
    store::{SessionRecord, SessionStore},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// TOML-file backed [`SessionStore`] with atomic writes.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store persisting to `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    fn load(&self) -> CoreResult<SessionRecord> {
        if !self.path.exists() {
            debug!("No session record on disk, using default");
            return Ok(SessionRecord::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| RecorderError::StoreError {
            reason: format!("Failed to read session record: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        toml::from_str(&contents).map_err(|e| RecorderError::StoreError {
            reason: format!("Failed to parse session record: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Writes to a temporary file first, then renames over the record.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    fn save(&self, record: &SessionRecord) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                debug!(dir = ?parent, "Created session store directory");
            }
        }

        let contents = toml::to_string_pretty(record).map_err(|e| RecorderError::StoreError {
            reason: format!("Failed to serialize session record: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = self.path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| RecorderError::StoreError {
            reason: format!("Failed to create temp session file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| RecorderError::StoreError {
                reason: format!("Failed to write temp session file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| RecorderError::StoreError {
            reason: format!("Failed to sync temp session file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| RecorderError::StoreError {
            reason: format!("Failed to rename temp session file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(active = record.active, count = record.recording_count, "Session record saved");

        Ok(())
    }
}
