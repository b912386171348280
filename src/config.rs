use std::path::{Path, PathBuf};

use compact_str::CompactString;
use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    domain::{Certification, ReviewLanguage},
    result::{BotError, Result},
};

pub const DEFAULT_API_URL: &str = "https://review-api.udacity.com/api/v1";
pub const DEFAULT_REVIEW_URL: &str = "https://review.udacity.com";
pub const SMTP_PASSWORD_ENV: &str = "REVIEWBOT_SMTP_PASSWORD";

fn default_api_url() -> CompactString {
    DEFAULT_API_URL.into()
}

fn default_review_url() -> CompactString {
    DEFAULT_REVIEW_URL.into()
}

fn default_languages() -> Vec<ReviewLanguage> {
    ReviewLanguage::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_smtp_port() -> u16 {
    465
}

/// The persisted record. Only `token` and `certified` are required to exist in
/// older files; everything else falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: CompactString,
    #[serde(default)]
    pub certified: Vec<Certification>,
    /// Extra credentials used by the claim loop
    #[serde(default)]
    pub tokens: Vec<CompactString>,
    #[serde(default = "default_api_url")]
    pub api_url: CompactString,
    #[serde(default = "default_review_url")]
    pub review_url: CompactString,
    #[serde(default = "default_languages")]
    pub languages: Vec<ReviewLanguage>,
    #[serde(default = "default_true")]
    pub desktop_notifications: bool,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CompactString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub host: CompactString,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// TLS from the first byte (port 465) rather than STARTTLS
    #[serde(default = "default_true")]
    pub implicit_tls: bool,
    pub username: CompactString,
    #[serde(default)]
    pub password: CompactString,
    pub from: CompactString,
    pub to: Vec<CompactString>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: CompactString::default(),
            certified: Vec::new(),
            tokens: Vec::new(),
            api_url: default_api_url(),
            review_url: default_review_url(),
            languages: default_languages(),
            desktop_notifications: true,
            email: None,
            request_timeout_secs: default_request_timeout_secs(),
            log_level: None,
        }
    }
}

impl BotConfig {
    /// Primary token first, then the extra tokens, without blanks or repeats.
    pub fn credentials(&self) -> Vec<CompactString> {
        std::iter::once(&self.token)
            .chain(self.tokens.iter())
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .unique()
            .map(CompactString::from)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("api_url", &self.api_url), ("review_url", &self.review_url)] {
            let parsed = url::Url::parse(value)
                .map_err(|e| BotError::config_validation_error(field, e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(BotError::config_validation_error(
                    field,
                    "must start with http:// or https://",
                ));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(BotError::config_validation_error(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }

        if let Some(email) = &self.email
            && email.to.is_empty()
        {
            return Err(BotError::config_validation_error(
                "email.to",
                "at least one recipient is required",
            ));
        }

        Ok(())
    }

    /// Web page for a single submission.
    pub fn submission_url(&self, id: impl std::fmt::Display) -> String {
        format!("{}/#!/submissions/{id}", self.review_url.trim_end_matches('/'))
    }
}

impl EmailConfig {
    /// The environment takes precedence so the secret can stay out of the file.
    pub fn password(&self) -> CompactString {
        std::env::var(SMTP_PASSWORD_ENV)
            .map(CompactString::from)
            .unwrap_or_else(|_| self.password.clone())
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "reviewbot") {
        dirs.config_dir().join("config.json")
    } else {
        PathBuf::from("config.json")
    }
}

/// Load the config at `path`; a missing file yields the default config.
pub fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(BotConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| BotError::config_load_error(path.to_path_buf(), e))?;
    let config: BotConfig = serde_json::from_str(&raw)
        .map_err(|e| BotError::config_load_error(path.to_path_buf(), e))?;

    debug!(
        path = %path.display(),
        certified = config.certified.len(),
        tokens = config.credentials().len(),
        "Loaded config"
    );
    Ok(config)
}

pub fn save_config(path: &Path, config: &BotConfig) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| BotError::config_save_error(path.to_path_buf(), e))?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| BotError::config_save_error(path.to_path_buf(), e))?;
    std::fs::write(path, json).map_err(|e| BotError::config_save_error(path.to_path_buf(), e))?;

    debug!(path = %path.display(), "Saved config");
    Ok(())
}
