use crate::{CoreResult, RecorderError};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefixes of surfaces that must never be captured.
const DEFAULT_RESTRICTED_PREFIXES: &[&str] =
    &["chrome://", "chrome-extension://", "edge://", "about:"];

/// Opaque handle for the tab or surface being captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTarget {
    /// Host-assigned identifier.
    pub id: u32,
    /// Location of the surface (page URL or capture device spec).
    pub uri: String,
}

impl CaptureTarget {
    /// Create a target.
    pub fn new(id: u32, uri: impl Into<String>) -> Self {
        Self {
            id,
            uri: uri.into(),
        }
    }
}

/// Resolves which target a start intent refers to.
pub trait TargetResolver: Send + Sync {
    /// The currently active target, if any.
    fn active_target(&self) -> Option<CaptureTarget>;
}

/// Resolver that always answers the same target.
#[derive(Debug, Clone)]
pub struct FixedTarget(pub CaptureTarget);

impl TargetResolver for FixedTarget {
    fn active_target(&self) -> Option<CaptureTarget> {
        Some(self.0.clone())
    }
}

/// Pre-start validation rules for capture targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPolicy {
    restricted_prefixes: Vec<String>,
}

impl TargetPolicy {
    /// Policy rejecting targets whose URI starts with any of `prefixes`.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            restricted_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Restricted URI prefixes.
    pub fn restricted_prefixes(&self) -> &[String] {
        &self.restricted_prefixes
    }

    /// Reject restricted targets with [`RecorderError::TargetNotCapturable`].
    #[track_caller]
    pub fn validate(&self, target: &CaptureTarget) -> CoreResult<()> {
        let uri = target.uri.trim();
        let restricted = self
            .restricted_prefixes
            .iter()
            .any(|prefix| uri.to_ascii_lowercase().starts_with(&prefix.to_ascii_lowercase()));

        if restricted {
            warn!(target_id = target.id, uri = %uri, "Refusing restricted target");
            return Err(RecorderError::TargetNotCapturable {
                uri: uri.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(target_id = target.id, uri = %uri, "Target accepted");
        Ok(())
    }
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESTRICTED_PREFIXES.iter().copied())
    }
}
