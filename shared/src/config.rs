use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::ValidatedUrl;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_AVATAR: &str = "/static/img/default-avatar.png";
pub const ANONYMOUS_PLACEHOLDER: &str = "Инкогнито";
pub const FALLBACK_TELEGRAM_USER_ID: &str = "test_id";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Malformed(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Runtime settings handed over by the shell at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub csrf_token: Option<String>,
    pub screen_fade_ms: u64,
    pub upload_min_display_ms: u64,
    pub save_min_display_ms: u64,
    pub default_avatar: String,
    pub anonymous_placeholder: String,
    pub fallback_telegram_user_id: String,
    pub min_text_len: usize,
    pub min_signature_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_token: None,
            screen_fade_ms: 400,
            upload_min_display_ms: 1500,
            save_min_display_ms: 2500,
            default_avatar: DEFAULT_AVATAR.to_string(),
            anonymous_placeholder: ANONYMOUS_PLACEHOLDER.to_string(),
            fallback_telegram_user_id: FALLBACK_TELEGRAM_USER_ID.to_string(),
            min_text_len: 5,
            min_signature_len: 3,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ValidatedUrl::new(self.base_url.as_str())
            .map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;

        if self.min_text_len == 0 {
            return Err(ConfigError::Zero {
                field: "min_text_len",
            });
        }
        if self.min_signature_len == 0 {
            return Err(ConfigError::Zero {
                field: "min_signature_len",
            });
        }
        Ok(())
    }
}
