//! Console and notification fan-out of [`ReviewEvent`]s

use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
};

use chrono::{DateTime, Local};
use compact_str::{CompactString, format_compact};
use tracing::{debug, warn};

use crate::{
    client::AssignOutcome,
    config::BotConfig,
    domain::{Certification, ReviewLanguage, SubmissionDto},
    event::ReviewEvent,
    notify::{DesktopNotifier, EmailNotifier, Notice, NoticeKind, Notifier},
    result::{BotError, Result},
};

const BANNER: &str = "------You have a Review--------";

/// Owns the notification channels and turns events into console lines and notices.
pub struct Reporter {
    notifiers: Vec<Box<dyn Notifier>>,
    review_url: CompactString,
    quiet: bool,
}

impl Reporter {
    pub fn new(review_url: impl Into<CompactString>) -> Self {
        Self { notifiers: Vec::new(), review_url: review_url.into(), quiet: false }
    }

    /// Build the channels the config enables.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let mut reporter = Self::new(config.review_url.clone());
        if config.desktop_notifications {
            reporter.notifiers.push(Box::new(DesktopNotifier::default()));
        }
        if let Some(email) = &config.email {
            reporter.notifiers.push(Box::new(EmailNotifier::new(email)?));
        }
        Ok(reporter)
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Suppress console output; notices are still delivered.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Consume events on a dedicated thread until every sender is dropped.
    pub fn spawn(mut self) -> Result<(Sender<ReviewEvent>, JoinHandle<()>)> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("reporter".into())
            .spawn(move || self.run(receiver))
            .map_err(|e| BotError::GeneralError(format_compact!("failed to spawn reporter: {e}")))?;

        Ok((sender, handle))
    }

    fn run(&mut self, receiver: Receiver<ReviewEvent>) {
        for event in receiver {
            self.apply(&event);
        }
        debug!("Reporter channel closed");
    }

    pub fn apply(&mut self, event: &ReviewEvent) {
        debug!(event = event.variant_name(), "Reporting event");

        if !self.quiet
            && let Some(line) = render(event)
        {
            println!("{line}");
        }

        if let Some(notice) = self.notice_for(event) {
            self.deliver(&notice);
        }
    }

    fn notice_for(&self, event: &ReviewEvent) -> Option<Notice> {
        match event {
            ReviewEvent::ClaimResult {
                certification,
                language,
                outcome: AssignOutcome::Claimed(submission),
                at,
                ..
            } => Some(Notice {
                kind: NoticeKind::Claimed,
                title: "Currently Assigned:".into(),
                body: claim_message(certification, submission, *language, at),
                url: Some(self.page(submission)),
            }),
            ReviewEvent::CurrentlyAssigned(submission) => Some(Notice {
                kind: NoticeKind::Assigned,
                title: "Currently Assigned:".into(),
                body: assigned_message(submission),
                url: Some(self.page(submission)),
            }),
            _ => None,
        }
    }

    /// The submission's page, or the site root when its id is unknown.
    fn page(&self, submission: &SubmissionDto) -> String {
        let base = self.review_url.trim_end_matches('/');
        if submission.has_id() {
            format!("{base}/#!/submissions/{}", submission.id)
        } else {
            base.to_string()
        }
    }

    fn deliver(&self, notice: &Notice) {
        for notifier in self.notifiers.iter().filter(|n| n.accepts(notice.kind)) {
            if let Err(e) = notifier.notify(notice) {
                warn!(channel = notifier.channel(), error = %e, "Notification failed");
            }
        }
    }
}

fn time(at: &DateTime<Local>) -> CompactString {
    format_compact!("{}", at.format("%H:%M:%S"))
}

/// `requested` is the locale the claim was made under; the response wins when it has one.
pub fn claim_message(
    certification: &Certification,
    submission: &SubmissionDto,
    requested: ReviewLanguage,
    at: &DateTime<Local>,
) -> CompactString {
    let language = match submission.language {
        Some(_) => submission.review_language(),
        None => requested,
    };
    format_compact!(
        "Project: {} is in review, Price is {}, Language: {} in Time: {}",
        submission.project_name().unwrap_or(&certification.name),
        submission.price_or_unknown(),
        language,
        time(at)
    )
}

pub fn assigned_message(submission: &SubmissionDto) -> CompactString {
    format_compact!(
        "{}, ID: {}, Language: {}",
        submission.project_name().unwrap_or("unknown project"),
        submission.id,
        submission.language.as_deref().unwrap_or("unknown")
    )
}

/// The console line for an event, if it has one.
pub fn render(event: &ReviewEvent) -> Option<CompactString> {
    let line = match event {
        ReviewEvent::ClaimResult { token, certification, language, outcome, at } => {
            match outcome {
                AssignOutcome::Claimed(submission) => format_compact!(
                    "\n{BANNER}\n{}\n{BANNER}\none review is founded: {}",
                    claim_message(certification, submission, *language, at),
                    certification.name
                ),
                AssignOutcome::NotFound => format_compact!(
                    "Time: {} ---not found---  name: {}",
                    time(at),
                    certification.name
                ),
                AssignOutcome::MaxAssigned => format_compact!(
                    "Time: {} {token} has the maximum unfinished reviews assigned",
                    time(at)
                ),
                AssignOutcome::NotCertified => format_compact!(
                    "Time: {} {token} is not certified to review this project: {}",
                    time(at),
                    certification.name
                ),
                AssignOutcome::Unauthorized => {
                    format_compact!("Time: {} Unauthorized: {token}", time(at))
                },
                AssignOutcome::RateLimited => format_compact!(
                    "Time: {} {token} is rate limited, skipping the rest of this round",
                    time(at)
                ),
                AssignOutcome::Unexpected { status, body } => format_compact!(
                    "Time: {} error in review command: HTTP {status} for {}: {body}",
                    time(at),
                    certification.name
                ),
            }
        },
        ReviewEvent::RequestFailed { certification, message, at, .. } => format_compact!(
            "Time: {} request for {} failed: {message}",
            time(at),
            certification.name
        ),
        ReviewEvent::CurrentlyAssigned(_) => {
            "1 review is opened, please check it as soon as possible".into()
        },
        ReviewEvent::NothingAssigned => "No reviews are assigned at this time.".into(),
        ReviewEvent::RoundFinished { .. } => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    use super::*;
    use crate::id::{ProjectId, SubmissionId};

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap()
    }

    fn cert() -> Certification {
        Certification { name: "Predicting Bike-Sharing Patterns".into(), id: ProjectId::new(12) }
    }

    fn claim(outcome: AssignOutcome) -> ReviewEvent {
        ReviewEvent::ClaimResult {
            token: "****abcd".into(),
            certification: cert(),
            language: ReviewLanguage::Chinese,
            outcome,
            at: at(),
        }
    }

    fn submission() -> SubmissionDto {
        serde_json::from_value(serde_json::json!({
            "id": 555,
            "price": "45.0",
            "language": "en-us",
            "project": { "name": "Predicting Bike-Sharing Patterns" }
        }))
        .unwrap()
    }

    #[derive(Clone, Default)]
    struct Recorder {
        kinds: Vec<NoticeKind>,
        seen: Arc<Mutex<Vec<Notice>>>,
    }

    impl Notifier for Recorder {
        fn channel(&self) -> &'static str {
            "recorder"
        }

        fn accepts(&self, kind: NoticeKind) -> bool {
            self.kinds.is_empty() || self.kinds.contains(&kind)
        }

        fn notify(&self, notice: &Notice) -> Result<()> {
            self.seen.lock().unwrap().push(notice.clone());
            Ok(())
        }
    }

    #[test]
    fn not_found_line_names_the_project_and_time() {
        let line = render(&claim(AssignOutcome::NotFound)).unwrap();
        assert_eq!(
            line,
            "Time: 09:05:07 ---not found---  name: Predicting Bike-Sharing Patterns"
        );
    }

    #[test]
    fn claimed_line_carries_the_banner_and_price() {
        let line = render(&claim(AssignOutcome::Claimed(submission()))).unwrap();
        assert!(line.contains(BANNER));
        assert!(line.contains("Price is 45.0"));
        assert!(line.contains("Language: English"));
        assert!(line.ends_with("one review is founded: Predicting Bike-Sharing Patterns"));
    }

    #[test]
    fn status_lines_for_refusals() {
        let max = render(&claim(AssignOutcome::MaxAssigned)).unwrap();
        assert!(max.contains("has the maximum unfinished reviews assigned"));

        let forbidden = render(&claim(AssignOutcome::NotCertified)).unwrap();
        assert!(forbidden.contains("is not certified to review this project"));

        let other = render(&claim(AssignOutcome::Unexpected { status: 500, body: "boom".into() }))
            .unwrap();
        assert!(other.contains("HTTP 500"));

        let unauthorized = render(&claim(AssignOutcome::Unauthorized)).unwrap();
        assert_eq!(unauthorized, "Time: 09:05:07 Unauthorized: ****abcd");

        let limited = render(&claim(AssignOutcome::RateLimited)).unwrap();
        assert!(limited.starts_with("Time: 09:05:07 ****abcd is rate limited"));
    }

    #[test]
    fn failed_request_line_names_the_project_and_cause() {
        let event = ReviewEvent::RequestFailed {
            token: "****abcd".into(),
            certification: cert(),
            message: "Request timeout".into(),
            at: at(),
        };
        assert_eq!(
            render(&event).unwrap(),
            "Time: 09:05:07 request for Predicting Bike-Sharing Patterns failed: Request timeout"
        );
    }

    #[test]
    fn claim_without_submission_id_links_to_the_site() {
        let recorder = Recorder::default();
        let mut reporter = Reporter::new("https://review.example.com/")
            .quiet()
            .with_notifier(Box::new(recorder.clone()));

        let mut sparse = SubmissionDto::default();
        sparse.fill_missing(&cert(), ReviewLanguage::Chinese);
        reporter.apply(&claim(AssignOutcome::Claimed(sparse)));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].url.as_deref(), Some("https://review.example.com"));
        assert!(seen[0].body.starts_with("Project: Predicting Bike-Sharing Patterns is in review"));
        assert!(seen[0].body.contains("Language: Chinese"));
    }

    #[test]
    fn round_summary_is_silent() {
        let event = ReviewEvent::RoundFinished { token: "t".into(), attempted: 2, claimed: 0 };
        assert!(render(&event).is_none());
    }

    #[test]
    fn claims_reach_every_channel_and_reminders_skip_claim_only_ones() {
        let everything = Recorder::default();
        let claims_only = Recorder { kinds: vec![NoticeKind::Claimed], ..Default::default() };
        let mut reporter = Reporter::new("https://review.example.com/")
            .quiet()
            .with_notifier(Box::new(everything.clone()))
            .with_notifier(Box::new(claims_only.clone()));

        reporter.apply(&claim(AssignOutcome::Claimed(submission())));
        reporter.apply(&ReviewEvent::CurrentlyAssigned(submission()));
        reporter.apply(&claim(AssignOutcome::NotFound));

        let all = everything.seen.lock().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].url.as_deref(), Some("https://review.example.com/#!/submissions/555"));
        assert_eq!(all[1].body, "Predicting Bike-Sharing Patterns, ID: 555, Language: en-us");
        assert_eq!(claims_only.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn spawned_reporter_stops_when_senders_drop() {
        let recorder = Recorder::default();
        let (sender, handle) = Reporter::new("https://review.example.com")
            .quiet()
            .with_notifier(Box::new(recorder.clone()))
            .spawn()
            .unwrap();

        sender
            .send(ReviewEvent::CurrentlyAssigned(SubmissionDto {
                id: SubmissionId::new(1),
                ..Default::default()
            }))
            .unwrap();
        drop(sender);
        handle.join().unwrap();

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }
}
