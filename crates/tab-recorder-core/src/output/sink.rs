use crate::output::OutputArtifact;

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{error, info};

/// Upper bound on `-N` suffixes tried before giving up on a name.
const MAX_NAME_COLLISIONS: u32 = 1000;

/// Destination for finished artifacts. Fire-and-forget.
pub trait OutputSink: Send + Sync {
    /// Take ownership of `artifact` and persist it; must not block the caller.
    fn save(&self, artifact: OutputArtifact);
}

/// Writes artifacts into a directory (the user's Downloads by default).
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`; the directory is created on demand.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn save(&self, artifact: OutputArtifact) {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || match write_new_file(&dir, &artifact) {
            Ok(path) => info!(
                path = ?path,
                size_bytes = artifact.bytes.len(),
                "Recording saved"
            ),
            Err(e) => error!(
                filename = %artifact.filename,
                error = ?e,
                "Failed to save recording"
            ),
        });
    }
}

/// Write without overwriting: `name.ext`, then `name-1.ext`, `name-2.ext`...
pub(crate) fn write_new_file(dir: &Path, artifact: &OutputArtifact) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let original = Path::new(&artifact.filename);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| artifact.filename.clone());
    let extension = original
        .extension()
        .map(|e| e.to_string_lossy().into_owned());

    for attempt in 0..MAX_NAME_COLLISIONS {
        let name = match (attempt, &extension) {
            (0, _) => artifact.filename.clone(),
            (n, Some(ext)) => format!("{stem}-{n}.{ext}"),
            (n, None) => format!("{stem}-{n}"),
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(&artifact.bytes)?;
                file.sync_all()?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {}", artifact.filename),
    ))
}
