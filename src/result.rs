use std::path::PathBuf;

use compact_str::{CompactString, ToCompactString};
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Clone, Error)]
pub enum BotError {
    #[error("The review API rejected the token.")]
    Unauthorized,

    #[error("Failed to load configuration from: {path}: {message}")]
    ConfigLoadError { path: PathBuf, message: String },

    #[error("Failed to save configuration to: {path}: {message}")]
    ConfigSaveError { path: PathBuf, message: String },

    #[error("Invalid configuration: {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to send {channel} notification: {message}")]
    NotificationError { channel: &'static str, message: String },

    #[error("{0}")]
    GeneralError(CompactString),
}

impl From<ClientError> for BotError {
    fn from(e: ClientError) -> Self {
        BotError::from(&e)
    }
}

impl From<&ClientError> for BotError {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Unauthorized => BotError::Unauthorized,
            ClientError::ConfigValidation { field, message } => {
                BotError::config_validation_error(field.as_str(), message.as_str())
            },
            other => BotError::GeneralError(other.to_compact_string()),
        }
    }
}

impl BotError {
    pub fn config_load_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigLoadError { path, message: source.to_string() }
    }

    pub fn config_save_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigSaveError { path, message: source.to_string() }
    }

    pub fn config_validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidationError { field: field.into(), message: message.into() }
    }

    pub fn notification_error(channel: &'static str, source: impl std::fmt::Display) -> Self {
        Self::NotificationError { channel, message: source.to_string() }
    }
}
