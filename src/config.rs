//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;
use crate::lang::Language;
use crate::retry::RetryPolicy;

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Assistant name for identification.
    pub name: String,
    /// Active conversation language.
    pub language: Language,
    /// Retry policy applied to chat, analysis, and strategy calls.
    pub retry: RetryPolicy,
    /// Base URL of the remote chat-completion service.
    pub chat_base_url: String,
    /// Request timeout for remote calls.
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "morvo".to_string(),
            language: Language::default(),
            retry: RetryPolicy::default(),
            chat_base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AssistantConfig {
    /// Build the config from `MORVO_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("MORVO_CHAT_URL") {
            config.chat_base_url = url;
        }
        if let Ok(code) = std::env::var("MORVO_LANGUAGE") {
            config.language = Language::from_code(&code);
        }
        if let Ok(raw) = std::env::var("MORVO_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MORVO_REQUEST_TIMEOUT_SECS".to_string(),
                message: format!("not a number of seconds: {raw}"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
