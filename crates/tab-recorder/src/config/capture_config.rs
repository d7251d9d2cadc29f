use crate::config::{DEFAULT_CHUNK_SIZE, default_chunk_size};

use tab_recorder_core::{
    capture::{CaptureTarget, ProcessCaptureConfig, TARGET_PLACEHOLDER, TargetPolicy},
    output::ContainerFormat,
};

use serde::{Deserialize, Serialize};

/// Encoder process and capture target configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Encoder executable (ffmpeg by default).
    #[serde(default = "default_program")]
    pub program: String,

    /// Encoder arguments; `{target}` is replaced by `target`.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Input handed to the encoder (display, window or device name).
    #[serde(default = "default_target")]
    pub target: String,

    /// Bytes per chunk read from the encoder.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Extension of saved recordings, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// MIME type of saved recordings.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Targets starting with any of these are refused.
    #[serde(default = "default_restricted_prefixes")]
    pub restricted_prefixes: Vec<String>,
}

impl CaptureConfig {
    /// Settings for the encoder process provider.
    pub fn provider_config(&self) -> ProcessCaptureConfig {
        ProcessCaptureConfig {
            program: self.program.clone(),
            args: self.args.clone(),
            chunk_size: self.chunk_size,
        }
    }

    /// The fixed capture target.
    pub fn capture_target(&self) -> CaptureTarget {
        CaptureTarget::new(0, self.target.clone())
    }

    /// Container of saved recordings.
    pub fn container(&self) -> ContainerFormat {
        ContainerFormat {
            extension: self.extension.clone(),
            mime_type: self.mime_type.clone(),
        }
    }

    /// Target validation rules.
    pub fn policy(&self) -> TargetPolicy {
        TargetPolicy::new(self.restricted_prefixes.iter().cloned())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            target: default_target(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            extension: default_extension(),
            mime_type: default_mime_type(),
            restricted_prefixes: default_restricted_prefixes(),
        }
    }
}

fn default_program() -> String {
    "ffmpeg".to_string()
}

#[cfg(target_os = "linux")]
const INPUT_FORMAT: &str = "x11grab";
#[cfg(target_os = "macos")]
const INPUT_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
const INPUT_FORMAT: &str = "gdigrab";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const INPUT_FORMAT: &str = "x11grab";

fn default_target() -> String {
    match INPUT_FORMAT {
        "avfoundation" => "1:none".to_string(),
        "gdigrab" => "desktop".to_string(),
        _ => ":0.0".to_string(),
    }
}

/// VP8 in WebM on stdout; stdin stays open so "q" can finalize.
fn default_args() -> Vec<String> {
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        INPUT_FORMAT,
        "-framerate",
        "30",
        "-i",
        TARGET_PLACEHOLDER,
        "-c:v",
        "libvpx",
        "-deadline",
        "realtime",
        "-b:v",
        "2500k",
        "-f",
        "webm",
        "pipe:1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extension() -> String {
    ContainerFormat::default().extension
}

fn default_mime_type() -> String {
    ContainerFormat::default().mime_type
}

fn default_restricted_prefixes() -> Vec<String> {
    TargetPolicy::default().restricted_prefixes().to_vec()
}
