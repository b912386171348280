//! Configuration management for the review API client

use std::{path::PathBuf, time::Duration};

use compact_str::CompactString;

use super::error::{ClientError, Result};
use crate::config::BotConfig;

/// Main configuration for the review API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Review API base URL, e.g. `https://review-api.udacity.com/api/v1`
    pub base_url: CompactString,
    /// Credential sent in the `Authorization` header
    pub token: CompactString,
    /// Request configuration
    pub request: RequestConfig,
    /// Debug configuration
    pub debug: DebugConfig,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout
    pub timeout: Duration,
}

/// Claim loop configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Delay between two claim rounds
    pub interval: Duration,
}

/// Debug and logging configuration
#[derive(Debug, Clone, Default)]
pub struct DebugConfig {
    /// Write every response body to `log_directory`
    pub log_responses: bool,
    /// Directory for storing response dumps
    pub log_directory: Option<PathBuf>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(20) }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<CompactString>, token: impl Into<CompactString>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            request: RequestConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::config_validation("api_url", "Base URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::config_validation(
                "api_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(ClientError::InvalidUrl { url: self.base_url.clone() });
        }

        if self.token.trim().is_empty() {
            return Err(ClientError::config_validation(
                "token",
                "No token configured, run `reviewbot token <token>` first",
            ));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "request_timeout_secs",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Same settings, different credential.
    pub fn with_token(mut self, token: impl Into<CompactString>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug.log_responses = enabled;
        if enabled && self.debug.log_directory.is_none() {
            self.debug.log_directory = Some(PathBuf::from("reviewbot-responses"));
        }
        self
    }
}

impl From<&BotConfig> for ClientConfig {
    fn from(config: &BotConfig) -> Self {
        let mut client = Self::new(config.api_url.clone(), config.token.clone());
        client.request.timeout = Duration::from_secs(config.request_timeout_secs);
        client
    }
}
