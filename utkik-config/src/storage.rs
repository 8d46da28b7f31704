//! Log file locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where the three session logs live.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StorageConfig {
    /// Primary JSON-Lines log of classified records.
    #[serde(default = "default_primary_log")]
    pub primary_log: PathBuf,

    /// JSON-Lines log of suspicious connections.
    #[serde(default = "default_suspicious_log")]
    pub suspicious_log: PathBuf,

    /// Plain-text diagnostic log. Never truncated.
    #[serde(default = "default_diagnostic_log")]
    pub diagnostic_log: PathBuf,
}

fn default_primary_log() -> PathBuf {
    "network_urls.jsonl".into()
}

fn default_suspicious_log() -> PathBuf {
    "suspicious_connections.jsonl".into()
}

fn default_diagnostic_log() -> PathBuf {
    "capture_debug.log".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary_log: default_primary_log(),
            suspicious_log: default_suspicious_log(),
            diagnostic_log: default_diagnostic_log(),
        }
    }
}
