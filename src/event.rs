use chrono::{DateTime, Local};
use compact_str::CompactString;

use crate::{
    client::AssignOutcome,
    domain::{Certification, ReviewLanguage, SubmissionDto},
};

#[derive(Debug, Clone)]
pub enum ReviewEvent {
    /// One assign request came back with a status code
    ClaimResult {
        token: CompactString,
        certification: Certification,
        language: ReviewLanguage,
        outcome: AssignOutcome,
        at: DateTime<Local>,
    },
    /// The assign request never produced a status code
    RequestFailed {
        token: CompactString,
        certification: Certification,
        message: CompactString,
        at: DateTime<Local>,
    },
    RoundFinished {
        token: CompactString,
        attempted: usize,
        claimed: usize,
    },
    CurrentlyAssigned(SubmissionDto),
    NothingAssigned,
}

impl ReviewEvent {
    /// Get the variant name as a string slice (without "ReviewEvent::" prefix)
    pub fn variant_name(&self) -> &'static str {
        match self {
            ReviewEvent::ClaimResult { .. } => "ClaimResult",
            ReviewEvent::RequestFailed { .. } => "RequestFailed",
            ReviewEvent::RoundFinished { .. } => "RoundFinished",
            ReviewEvent::CurrentlyAssigned(_) => "CurrentlyAssigned",
            ReviewEvent::NothingAssigned => "NothingAssigned",
        }
    }

    pub fn is_claim(&self) -> bool {
        matches!(self, ReviewEvent::ClaimResult { outcome, .. } if outcome.is_claimed())
    }
}
