mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod output_config;
mod timeout_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    output_config::OutputConfig, timeout_config::TimeoutConfig,
};

pub(crate) const DEFAULT_NOTIFICATIONS: bool = true;
pub(crate) const DEFAULT_ERROR_BADGE_MS: u64 = 3_000;
pub(crate) const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub(crate) fn default_notifications() -> bool {
    DEFAULT_NOTIFICATIONS
}

pub(crate) fn default_error_badge_ms() -> u64 {
    DEFAULT_ERROR_BADGE_MS
}

pub(crate) fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
