use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recording lifecycle errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The target is a restricted surface (browser internals, our own pages).
    #[error("Target not capturable: {uri} {location}")]
    TargetNotCapturable {
        /// URI of the rejected target.
        uri: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No target is currently active.
    #[error("No active target found {location}")]
    NoActiveTarget {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform or the user declined the capture request.
    #[error("Capture denied: {reason} {location}")]
    CaptureDenied {
        /// Description of why capture was denied.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A start intent arrived while a session is already active.
    #[error("A recording session is already active {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Chunks could not be assembled into an output artifact.
    #[error("Assembly failure: {reason} {location}")]
    AssemblyFailure {
        /// Description of the assembly failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture provider operation did not finish in time.
    #[error("Capture {operation} timed out after {after_ms}ms {location}")]
    Timeout {
        /// Operation that timed out ("start" or "stop").
        operation: &'static str,
        /// Configured timeout in milliseconds.
        after_ms: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A pending intent was replaced by a newer one before it could run.
    #[error("Intent superseded by a newer request {location}")]
    Superseded {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session store could not be read or written.
    #[error("Session store error: {reason} {location}")]
    StoreError {
        /// Description of the store failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The controller task is gone or did not reply.
    #[error("Controller unavailable: {reason} {location}")]
    ControllerUnavailable {
        /// Description of the channel failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from process or filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Serializable discriminant of [`RecorderError`], carried in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// See [`RecorderError::TargetNotCapturable`].
    TargetNotCapturable,
    /// See [`RecorderError::NoActiveTarget`].
    NoActiveTarget,
    /// See [`RecorderError::CaptureDenied`].
    CaptureDenied,
    /// See [`RecorderError::AlreadyRecording`].
    AlreadyRecording,
    /// See [`RecorderError::AssemblyFailure`].
    AssemblyFailure,
    /// See [`RecorderError::Timeout`].
    Timeout,
    /// See [`RecorderError::Superseded`].
    Superseded,
    /// Store showed an active session with no live controller at startup.
    ProcessRestartInterruption,
    /// See [`RecorderError::StoreError`].
    Store,
    /// See [`RecorderError::ControllerUnavailable`].
    ControllerUnavailable,
    /// See [`RecorderError::IoError`].
    Io,
}

impl RecorderError {
    /// Discriminant for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TargetNotCapturable { .. } => ErrorKind::TargetNotCapturable,
            Self::NoActiveTarget { .. } => ErrorKind::NoActiveTarget,
            Self::CaptureDenied { .. } => ErrorKind::CaptureDenied,
            Self::AlreadyRecording { .. } => ErrorKind::AlreadyRecording,
            Self::AssemblyFailure { .. } => ErrorKind::AssemblyFailure,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Superseded { .. } => ErrorKind::Superseded,
            Self::StoreError { .. } => ErrorKind::Store,
            Self::ControllerUnavailable { .. } => ErrorKind::ControllerUnavailable,
            Self::IoError { .. } => ErrorKind::Io,
        }
    }

    /// Single human-readable message for presentation surfaces.
    ///
    /// Unlike `Display`, this omits the source location.
    pub fn user_message(&self) -> String {
        match self {
            Self::TargetNotCapturable { .. } => "Cannot record browser internal pages. \
                 Please navigate to a regular website and try again."
                .to_string(),
            Self::NoActiveTarget { .. } => "No active tab found".to_string(),
            Self::CaptureDenied { reason, .. } => format!("Capture was denied: {reason}"),
            Self::AlreadyRecording { .. } => "A recording is already in progress".to_string(),
            Self::AssemblyFailure { reason, .. } => {
                format!("The recording could not be saved: {reason}")
            }
            Self::Timeout { operation, .. } => {
                format!("Capture {operation} did not respond in time")
            }
            Self::Superseded { .. } => "Request replaced by a newer one".to_string(),
            Self::StoreError { reason, .. } => format!("Could not persist state: {reason}"),
            Self::ControllerUnavailable { .. } => "Recorder is not running".to_string(),
            Self::IoError { source, .. } => source.to_string(),
        }
    }
}

impl From<std::io::Error> for RecorderError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        RecorderError::IoError {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
