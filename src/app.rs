//! Command implementations shared by the binary and the integration tests

use std::{path::PathBuf, sync::mpsc::Sender, time::Duration};

use compact_str::CompactString;
use tracing::{info, instrument};

use crate::{
    client::{ClaimPoller, ClientConfig, PollingConfig, ReviewApi, ReviewService, RoundSummary},
    config::{BotConfig, save_config},
    domain::{Certification, SubmissionDto},
    event::ReviewEvent,
    id::SubmissionId,
    result::{BotError, Result},
};

pub struct App {
    config: BotConfig,
    config_path: PathBuf,
    sender: Sender<ReviewEvent>,
    debug_responses: bool,
}

impl App {
    pub fn new(config_path: PathBuf, config: BotConfig, sender: Sender<ReviewEvent>) -> Self {
        Self { config, config_path, sender, debug_responses: false }
    }

    /// Dump every response body to disk.
    pub fn with_debug_responses(mut self, enabled: bool) -> Self {
        self.debug_responses = enabled;
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    fn client_config(&self) -> ClientConfig {
        ClientConfig::from(&self.config).with_debug_logging(self.debug_responses)
    }

    /// Client for the primary token
    pub fn api(&self) -> Result<ReviewApi> {
        Ok(ReviewApi::new(self.client_config())?)
    }

    pub fn service(&self) -> Result<ReviewService> {
        Ok(ReviewService::from_api(self.api()?, self.sender.clone()))
    }

    fn save(&self) -> Result<()> {
        save_config(&self.config_path, &self.config)
    }

    #[instrument(skip(self, token))]
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BotError::config_validation_error("token", "token cannot be empty"));
        }
        self.config.token = token.into();
        self.save()?;
        info!("Token updated");
        Ok(())
    }

    /// Stored certifications, refreshed from the API when `update` is set or none are stored.
    #[instrument(skip(self))]
    pub async fn certs(&mut self, update: bool) -> Result<&[Certification]> {
        if update || self.config.certified.is_empty() {
            let certified = self.service()?.refresh_certifications().await?;
            self.config.certified = certified;
            self.save()?;
            info!(count = self.config.certified.len(), "Certifications saved");
        }
        Ok(&self.config.certified)
    }

    pub async fn assigned(&self) -> Result<Vec<SubmissionDto>> {
        Ok(self.service()?.fetch_assigned().await?)
    }

    /// One claim round with the primary token.
    pub async fn review(&mut self) -> Result<RoundSummary> {
        self.certs(false).await?;
        let service = self.service()?;
        Ok(service
            .claim_round(&self.config.certified, &self.config.languages)
            .await)
    }

    /// A poller over every configured credential, claiming every `seconds` seconds.
    pub async fn claim_poller(&mut self, seconds: u64) -> Result<ClaimPoller> {
        if seconds == 0 {
            return Err(BotError::config_validation_error("seconds", "interval must be at least 1"));
        }
        self.certs(false).await?;

        let credentials = self.config.credentials();
        let Some(first) = credentials.first() else {
            return Err(BotError::config_validation_error("token", "no tokens configured"));
        };
        let base = ReviewApi::new(self.client_config().with_token(first.clone()))?;
        let apis = credentials
            .into_iter()
            .map(|token| base.with_token(token))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ClaimPoller::new(
            apis,
            self.sender.clone(),
            self.config.certified.clone(),
            self.config.languages.clone(),
            PollingConfig { interval: Duration::from_secs(seconds) },
        ))
    }

    pub async fn unassign(&self, submission_id: SubmissionId) -> Result<()> {
        self.api()?.unassign(submission_id).await?;
        info!(%submission_id, "Submission released");
        Ok(())
    }

    pub async fn submissions(&self) -> Result<Vec<SubmissionDto>> {
        Ok(self.api()?.get_submissions().await?)
    }

    pub async fn feedbacks(&self) -> Result<Vec<serde_json::Value>> {
        Ok(self.api()?.get_feedbacks().await?)
    }

    pub async fn completed(&self) -> Result<Vec<SubmissionDto>> {
        Ok(self.api()?.get_completed().await?)
    }

    pub async fn stats(&self) -> Result<serde_json::Value> {
        Ok(self.api()?.get_feedback_stats().await?)
    }

    /// Returns `false` when the token was already known.
    pub fn add_token(&mut self, token: &str) -> Result<bool> {
        let token: CompactString = token.trim().into();
        if token.is_empty() {
            return Err(BotError::config_validation_error("token", "token cannot be empty"));
        }
        if self.config.token == token || self.config.tokens.contains(&token) {
            return Ok(false);
        }
        self.config.tokens.push(token);
        self.save()?;
        Ok(true)
    }

    /// Returns `false` when the token was not in the list.
    pub fn remove_token(&mut self, token: &str) -> Result<bool> {
        let before = self.config.tokens.len();
        self.config.tokens.retain(|t| t.as_str() != token.trim());
        if self.config.tokens.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
