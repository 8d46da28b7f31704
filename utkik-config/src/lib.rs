//! # utkik-config
//!
//! Layered configuration for the probe. Values come from defaults, then
//! `config/utkik.yaml`, then an optional `config/<environment>.yaml`
//! selected by `UTKIK_ENV`, then `UTKIK_*` environment variables, and the
//! merged result is validated before anything runs with it.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

mod api;
mod capture;
mod error;
mod storage;
mod validation;

pub use api::ApiConfig;
pub use capture::CaptureConfig;
pub use error::ConfigError;
pub use storage::StorageConfig;

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct UtkikConfig {
    /// Capture loop parameters.
    #[validate(nested)]
    pub capture: CaptureConfig,

    /// Log file locations.
    #[validate(nested)]
    pub storage: StorageConfig,

    /// Control API parameters.
    #[validate(nested)]
    pub api: ApiConfig,
}

impl UtkikConfig {
    /// Loads configuration from the default locations and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/utkik.yaml`, if present
    /// 3. `config/<UTKIK_ENV>.yaml`, if present
    /// 4. `UTKIK_*` environment variables, `__` splitting nested fields
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(UtkikConfig::default()));

        if Path::new("config/utkik.yaml").exists() {
            figment = figment.merge(Yaml::file("config/utkik.yaml"));
        } else {
            info!("config/utkik.yaml not found, using default configuration");
        }

        if let Ok(env) = std::env::var("UTKIK_ENV") {
            let env_file = format!("config/{env}.yaml");
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        figment
            .merge(Env::prefixed("UTKIK_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Loads configuration from a specific file, still honoring `UTKIK_*`
    /// environment overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(UtkikConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("UTKIK_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_validates() {
        let config = UtkikConfig::default();
        config.validate().expect("default config should validate");
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "capture:\n  interface: wlan0\n  poll_interval_ms: 250\nstorage:\n  primary_log: /tmp/urls.jsonl"
        )
        .unwrap();

        let config = UtkikConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.capture.interface, "wlan0");
        assert_eq!(config.capture.poll_interval_ms, 250);
        assert_eq!(
            config.storage.primary_log,
            PathBuf::from("/tmp/urls.jsonl")
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.api.bind, "127.0.0.1:8000");
    }

    #[test]
    fn out_of_range_poll_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "capture:\n  poll_interval_ms: 7").unwrap();

        let err = UtkikConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn missing_explicit_file_is_reported() {
        let err = UtkikConfig::load_from_path("definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
