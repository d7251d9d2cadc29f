use std::path::PathBuf;

use directories::UserDirs;
use serde::{Deserialize, Serialize};

/// Where finished recordings are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Recordings directory (None = the user's Downloads folder).
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl OutputConfig {
    /// Configured directory, else Downloads, else home, else the working dir.
    pub fn recordings_dir(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }

        match UserDirs::new() {
            Some(dirs) => dirs
                .download_dir()
                .map(|d| d.to_path_buf())
                .unwrap_or_else(|| dirs.home_dir().join("Downloads")),
            None => PathBuf::from("."),
        }
    }
}
