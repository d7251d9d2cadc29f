use crate::{CoreResult, RecorderError, capture::Chunk};

use std::panic::Location;

use chrono::{DateTime, SecondsFormat, Utc};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Leading part of every artifact filename.
pub const FILENAME_PREFIX: &str = "tab-recording-";

/// Container produced by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFormat {
    /// File extension without the dot.
    pub extension: String,
    /// MIME type of the assembled file.
    pub mime_type: String,
}

impl Default for ContainerFormat {
    fn default() -> Self {
        Self {
            extension: "webm".to_string(),
            mime_type: "video/webm".to_string(),
        }
    }
}

/// Deterministic artifact name for a stop at `created_at`.
///
/// `tab-recording-<ISO8601>.<ext>` with `:` and `.` in the timestamp
/// replaced by `-`, keeping millisecond resolution.
pub fn artifact_filename(created_at: DateTime<Utc>, extension: &str) -> String {
    let timestamp = created_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{FILENAME_PREFIX}{timestamp}.{extension}")
}

/// The finalized file assembled from a session's chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// File name offered to the sink.
    pub filename: String,
    /// Concatenated chunk bytes.
    pub bytes: Vec<u8>,
    /// Stop timestamp the name was derived from.
    pub created_at: DateTime<Utc>,
    /// Number of chunks drained into this artifact.
    pub chunk_count: usize,
    /// MIME type of the container.
    pub mime_type: String,
}

impl OutputArtifact {
    /// Drain `chunks` into one artifact named after `created_at`.
    ///
    /// # Errors
    ///
    /// [`RecorderError::AssemblyFailure`] when there is no data to save.
    #[track_caller]
    pub fn assemble(
        chunks: Vec<Chunk>,
        format: &ContainerFormat,
        created_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let chunk_count = chunks.iter().filter(|c| !c.is_empty()).count();
        if chunk_count == 0 {
            return Err(RecorderError::AssemblyFailure {
                reason: "No recording data to save".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let total: usize = chunks.iter().map(Chunk::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in &chunks {
            bytes.extend_from_slice(chunk.as_bytes());
        }

        Ok(Self {
            filename: artifact_filename(created_at, &format.extension),
            bytes,
            created_at,
            chunk_count,
            mime_type: format.mime_type.clone(),
        })
    }

    /// Lightweight description for notifications.
    pub fn describe(&self) -> ArtifactRef {
        ArtifactRef {
            filename: self.filename.clone(),
            size_bytes: self.bytes.len() as u64,
            chunk_count: self.chunk_count,
            created_at: self.created_at,
        }
    }
}

/// Reference to an artifact handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    /// File name offered to the sink.
    pub filename: String,
    /// Artifact size.
    pub size_bytes: u64,
    /// Chunks drained into the artifact.
    pub chunk_count: usize,
    /// Stop timestamp.
    pub created_at: DateTime<Utc>,
}
