//! Control API configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Bind parameters for the REST control surface.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ApiConfig {
    /// Socket address the API listens on.
    #[validate(custom(function = validation::validate_bind_addr))]
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}
