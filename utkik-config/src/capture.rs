//! Capture loop configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Parameters of the capture session loop.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CaptureConfig {
    /// Network interface to listen on.
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default = "default_interface")]
    pub interface: String,

    /// How long one poll waits for traffic (milliseconds).
    #[validate(range(min = 100, max = 5000))]
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Hard upper bound on a session's runtime (seconds).
    #[validate(range(min = 10, max = 86400))]
    #[serde(default = "default_max_session")]
    pub max_session_secs: u64,

    /// Grace period a stop request waits for the worker to wind down
    /// (milliseconds).
    #[validate(range(min = 0, max = 5000))]
    #[serde(default = "default_stop_grace")]
    pub stop_grace_ms: u64,

    /// Most packets taken from the source per poll.
    #[validate(range(min = 1, max = 4096))]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_interface() -> String {
    "eth0".into()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_max_session() -> u64 {
    300
}

fn default_stop_grace() -> u64 {
    500
}

fn default_batch_size() -> usize {
    256
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            poll_interval_ms: default_poll_interval(),
            max_session_secs: default_max_session(),
            stop_grace_ms: default_stop_grace(),
            batch_size: default_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capture_config_validates() {
        CaptureConfig::default().validate().unwrap();
    }

    #[test]
    fn bad_interface_name_fails_validation() {
        let config = CaptureConfig {
            interface: "eth0; rm -rf /".into(),
            ..CaptureConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
