//! Core HTTP client for the review API

use chrono::Local;
use compact_str::{CompactString, format_compact};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{
    config::ClientConfig,
    endpoint::Endpoint,
    error::{ClientError, Result},
    outcome::AssignOutcome,
};
use crate::{
    domain::{CertificationDto, ReviewLanguage, SubmissionDto},
    id::{ProjectId, SubmissionId},
};

/// Pure HTTP client for the review API, bound to one credential
#[derive(Debug, Clone)]
pub struct ReviewApi {
    client: Client,
    config: ClientConfig,
}

/// Error body returned by the review API
#[derive(Debug, Deserialize)]
struct ReviewApiError {
    #[serde(alias = "message")]
    error: CompactString,
}

impl ReviewApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request.timeout)
            .user_agent(concat!("reviewbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { client, config })
    }

    /// A client for another credential sharing this one's connection pool.
    pub fn with_token(&self, token: impl Into<CompactString>) -> Result<Self> {
        let config = self.config.clone().with_token(token);
        config.validate()?;
        Ok(Self { client: self.client.clone(), config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token with everything but the last four characters masked, for logs
    pub fn token_hint(&self) -> CompactString {
        redact_token(&self.config.token)
    }

    #[instrument(skip(self), fields(token = %self.token_hint()))]
    pub async fn get_certifications(&self) -> Result<Vec<CertificationDto>> {
        let certifications: Vec<CertificationDto> =
            self.get_json(Endpoint::Certifications).await?;
        debug!(count = certifications.len(), "Fetched certifications");
        Ok(certifications)
    }

    #[instrument(skip(self), fields(token = %self.token_hint()))]
    pub async fn get_assigned(&self) -> Result<Vec<SubmissionDto>> {
        self.get_json(Endpoint::Assigned).await
    }

    #[instrument(skip(self), fields(token = %self.token_hint()))]
    pub async fn get_submissions(&self) -> Result<Vec<SubmissionDto>> {
        self.get_json(Endpoint::Submissions).await
    }

    #[instrument(skip(self), fields(token = %self.token_hint()))]
    pub async fn get_completed(&self) -> Result<Vec<SubmissionDto>> {
        self.get_json(Endpoint::Completed).await
    }

    #[instrument(skip(self), fields(token = %self.token_hint()))]
    pub async fn get_feedbacks(&self) -> Result<Vec<serde_json::Value>> {
        self.get_json(Endpoint::Feedbacks).await
    }

    #[instrument(skip(self), fields(token = %self.token_hint()))]
    pub async fn get_feedback_stats(&self) -> Result<serde_json::Value> {
        self.get_json(Endpoint::FeedbackStats).await
    }

    /// Try to claim the next open submission of `project_id`.
    ///
    /// Status codes the API uses to refuse a claim are not errors here; they
    /// come back as an [`AssignOutcome`]. Only transport and parse failures
    /// are returned as `Err`.
    #[instrument(skip(self), fields(token = %self.token_hint(), project_id = %project_id, language = %language))]
    pub async fn assign(
        &self,
        project_id: ProjectId,
        language: ReviewLanguage,
    ) -> Result<AssignOutcome> {
        let endpoint = Endpoint::Assign(project_id);
        let mut request = self.authenticated_request(endpoint);
        if language == ReviewLanguage::Chinese {
            request = request.form(&[("lang", language.code())]);
        }

        let response = request.send().await?;
        let path = response.url().path().to_string();
        let status = response.status().as_u16();
        let body = response.text().await?;
        self.maybe_log_response(&path, &body);

        let outcome = AssignOutcome::classify(status, &body, &path);
        debug!(status, claimed = outcome.is_claimed(), "Assign request finished");
        Ok(outcome)
    }

    #[instrument(skip(self), fields(token = %self.token_hint(), submission_id = %submission_id))]
    pub async fn unassign(&self, submission_id: SubmissionId) -> Result<()> {
        let response = self
            .authenticated_request(Endpoint::Unassign(submission_id))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(status.as_u16(), &body)
        }
    }

    /// Perform authenticated request and deserialize JSON response
    async fn get_json<T>(&self, endpoint: Endpoint) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.authenticated_request(endpoint).send().await?;
        self.handle_response(response).await
    }

    /// Create authenticated request builder
    fn authenticated_request(&self, endpoint: Endpoint) -> RequestBuilder {
        let url = endpoint.url(&self.config.base_url);
        self.client
            .request(endpoint.method(), url.as_str())
            .header("Authorization", self.config.token.as_str())
            .header("Accept", "application/json")
    }

    /// Handle HTTP response and deserialize JSON
    async fn handle_response<T>(&self, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url_path = response.url().path().to_string();
        let status = response.status();
        let body = response.text().await?;
        self.maybe_log_response(&url_path, &body);

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                debug!(endpoint = %url_path, body = %body, "Unparseable response body");
                ClientError::json_parse(url_path, "Failed to parse response", e)
            })
        } else {
            self.handle_error_response(status.as_u16(), &body)
        }
    }

    /// Handle error responses from the review API
    fn handle_error_response<T>(&self, status: u16, body: &str) -> Result<T> {
        match status {
            401 => Err(ClientError::Unauthorized),
            404 => Err(ClientError::not_found("Resource")),
            429 => Err(ClientError::RateLimited),
            _ => {
                let message = serde_json::from_str::<ReviewApiError>(body)
                    .map(|e| e.error)
                    .unwrap_or_else(|_| body.into());
                Err(ClientError::api(status, message))
            },
        }
    }

    fn maybe_log_response(&self, path: &str, body: &str) {
        if self.config.debug.log_responses {
            self.log_response_to_file(path, body);
        }
    }

    /// Log HTTP response to file for debugging
    fn log_response_to_file(&self, path: &str, body: &str) {
        let Some(log_dir) = &self.config.debug.log_directory else {
            return;
        };

        if !log_dir.exists()
            && let Err(e) = std::fs::create_dir_all(log_dir)
        {
            warn!("Failed to create log directory: {}", e);
            return;
        }

        let filename = format!(
            "{}_{}.json",
            Local::now().format("%Y-%m-%d_%H-%M-%S%.3f"),
            path.replace('/', "_")
        );
        let log_path = log_dir.join(filename);

        if let Err(e) = std::fs::write(&log_path, body) {
            warn!("Failed to write response log to {:?}: {}", log_path, e);
        } else {
            debug!("Response logged to {:?}", log_path);
        }
    }
}

pub fn redact_token(token: &str) -> CompactString {
    let count = token.chars().count();
    if count <= 4 {
        return "****".into();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format_compact!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_all_but_the_tail() {
        assert_eq!(redact_token("eyJhbGciOiJIUzI1NiJ9.abcd"), "****abcd");
        assert_eq!(redact_token("abc"), "****");
    }
}
