//! Fixed-interval claim loop across several credentials

use std::{
    sync::{Arc, mpsc::Sender},
    time::Duration,
};

use tokio::{
    sync::broadcast,
    task::JoinSet,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, instrument};

use super::{
    api::ReviewApi,
    config::PollingConfig,
    service::{ReviewService, RoundSummary},
};
use crate::{
    domain::{Certification, ReviewLanguage},
    event::ReviewEvent,
};

/// Runs a claim round for every credential each time the interval elapses.
///
/// Credentials are claimed concurrently; a round only ends once every
/// credential has finished its own sequential pass.
#[derive(Debug)]
pub struct ClaimPoller {
    services: Vec<ReviewService>,
    certifications: Arc<[Certification]>,
    languages: Arc<[ReviewLanguage]>,
    config: PollingConfig,
    shutdown_tx: broadcast::Sender<()>,
    /// Subscribed at construction so a signal sent before `start` is kept
    shutdown_rx: broadcast::Receiver<()>,
}

impl ClaimPoller {
    pub fn new(
        apis: Vec<ReviewApi>,
        sender: Sender<ReviewEvent>,
        certifications: Vec<Certification>,
        languages: Vec<ReviewLanguage>,
        config: PollingConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let services = apis
            .into_iter()
            .map(|api| ReviewService::from_api(api, sender.clone()))
            .collect();

        Self {
            services,
            certifications: certifications.into(),
            languages: languages.into(),
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Get a shutdown sender for external shutdown control
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Poll until a shutdown signal arrives. Returns the number of rounds run.
    #[instrument(skip(self), fields(interval = ?self.config.interval, credentials = self.services.len()))]
    pub async fn start(self) -> u64 {
        self.run(None).await
    }

    /// Like [`start`](Self::start) but stops on its own after `max_rounds`.
    pub async fn run(mut self, max_rounds: Option<u64>) -> u64 {
        info!(
            interval = ?self.config.interval,
            credentials = self.services.len(),
            certifications = self.certifications.len(),
            "Starting claim loop"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rounds = 0;

        loop {
            if max_rounds.is_some_and(|max| rounds >= max) {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    rounds += 1;
                    debug!(round = rounds, "Claim round");
                    self.run_round().await;
                }
                _ = self.shutdown_rx.recv() => {
                    debug!("Claim loop received shutdown signal");
                    break;
                }
            }
        }

        info!(rounds, "Claim loop ended");
        rounds
    }

    /// One round for every credential, all credentials in flight at once.
    pub async fn run_round(&self) -> Vec<RoundSummary> {
        let mut tasks = JoinSet::new();

        for (index, service) in self.services.iter().enumerate() {
            let service = service.clone();
            let certifications = Arc::clone(&self.certifications);
            let languages = Arc::clone(&self.languages);
            tasks.spawn(async move {
                (index, service.claim_round(&certifications, &languages).await)
            });
        }

        let mut summaries = vec![RoundSummary::default(); self.services.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, summary)) => summaries[index] = summary,
                Err(e) => error!(error = %e, "Claim task failed"),
            }
        }

        summaries
    }
}
