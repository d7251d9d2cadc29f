use serde::{Deserialize, Serialize};

/// The one globally keyed persisted record. Not versioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Whether a recording was active when last written.
    #[serde(default)]
    pub active: bool,
    /// Number of artifacts handed to the output sink so far.
    #[serde(default)]
    pub recording_count: u64,
}
