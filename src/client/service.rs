//! High-level review operations

use std::sync::mpsc::Sender;

use chrono::Local;
use tracing::{debug, error, info, instrument, warn};

use super::{
    api::ReviewApi,
    error::Result,
    outcome::AssignOutcome,
};
use crate::{
    dispatcher::Dispatcher,
    domain::{Certification, ReviewLanguage, SubmissionDto},
    event::ReviewEvent,
};

/// Tally of one claim round for one credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub attempted: usize,
    pub claimed: usize,
    pub failed: usize,
    /// Set when an outcome made the remaining claims pointless
    pub stopped_early: bool,
}

/// Orchestrates API calls and dispatches the results as events
#[derive(Debug, Clone)]
pub struct ReviewService {
    api: ReviewApi,
    sender: Sender<ReviewEvent>,
}

impl ReviewService {
    pub fn from_api(api: ReviewApi, sender: Sender<ReviewEvent>) -> Self {
        Self { api, sender }
    }

    pub fn api(&self) -> &ReviewApi {
        &self.api
    }

    /// Fetch certifications and keep the ones that are actually certified, in API order
    #[instrument(skip(self))]
    pub async fn refresh_certifications(&self) -> Result<Vec<Certification>> {
        info!("Refreshing certifications");

        let certified: Vec<Certification> = self
            .api
            .get_certifications()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch certifications"))?
            .into_iter()
            .filter(|c| c.is_certified())
            .map(Certification::from)
            .collect();

        debug!(count = certified.len(), "Certified projects");
        Ok(certified)
    }

    /// Fetch currently assigned submissions and dispatch one event per submission
    #[instrument(skip(self))]
    pub async fn fetch_assigned(&self) -> Result<Vec<SubmissionDto>> {
        let assigned = self
            .api
            .get_assigned()
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch assigned submissions"))?;

        if assigned.is_empty() {
            self.sender.dispatch(ReviewEvent::NothingAssigned);
        }
        for submission in &assigned {
            self.sender
                .dispatch(ReviewEvent::CurrentlyAssigned(submission.clone()));
        }

        Ok(assigned)
    }

    /// Try every certification under every language once.
    ///
    /// Claims run sequentially. A transport failure is reported and skipped;
    /// an outcome for which [`AssignOutcome::ends_round`] holds stops the round.
    #[instrument(skip(self, certifications, languages), fields(token = %self.api.token_hint(), certs = certifications.len()))]
    pub async fn claim_round(
        &self,
        certifications: &[Certification],
        languages: &[ReviewLanguage],
    ) -> RoundSummary {
        let token = self.api.token_hint();
        let mut summary = RoundSummary::default();

        'round: for certification in certifications {
            for &language in languages {
                summary.attempted += 1;

                match self.api.assign(certification.id, language).await {
                    Ok(mut outcome) => {
                        let ends_round = outcome.ends_round();
                        if let AssignOutcome::Claimed(submission) = &mut outcome {
                            submission.fill_missing(certification, language);
                            summary.claimed += 1;
                            info!(
                                project = %certification.name,
                                submission_id = %submission.id,
                                "Claimed a submission"
                            );
                        }
                        if ends_round {
                            warn!(project = %certification.name, ?outcome, "Stopping round");
                        }

                        self.sender.dispatch(ReviewEvent::ClaimResult {
                            token: token.clone(),
                            certification: certification.clone(),
                            language,
                            outcome,
                            at: Local::now(),
                        });

                        if ends_round {
                            summary.stopped_early = true;
                            break 'round;
                        }
                    },
                    Err(e) => {
                        summary.failed += 1;
                        warn!(error = %e, project = %certification.name, "Assign request failed");
                        self.sender.dispatch(ReviewEvent::RequestFailed {
                            token: token.clone(),
                            certification: certification.clone(),
                            message: e.to_string().into(),
                            at: Local::now(),
                        });
                    },
                }
            }
        }

        self.sender.dispatch(ReviewEvent::RoundFinished {
            token,
            attempted: summary.attempted,
            claimed: summary.claimed,
        });
        summary
    }
}
