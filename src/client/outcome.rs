//! Interpretation of the assign endpoint's status codes

use compact_str::CompactString;
use tracing::warn;

use crate::domain::SubmissionDto;

/// What a single claim attempt achieved.
#[derive(Debug, Clone)]
pub enum AssignOutcome {
    /// 201: the submission is now assigned to the requesting credential
    Claimed(SubmissionDto),
    /// 404: nothing waiting for this project
    NotFound,
    /// 422 (and 400): the credential already holds the maximum of open reviews
    MaxAssigned,
    /// 403: the credential is not certified for this project
    NotCertified,
    /// 401
    Unauthorized,
    /// 429
    RateLimited,
    Unexpected { status: u16, body: CompactString },
}

impl AssignOutcome {
    /// A 201 is a claim whatever its body holds; an unreadable body yields an
    /// empty [`SubmissionDto`] for the caller to fill in.
    pub fn classify(status: u16, body: &str, endpoint: &str) -> Self {
        match status {
            201 => {
                let submission = serde_json::from_str(body).unwrap_or_else(|e| {
                    warn!(endpoint, error = %e, "Claimed a submission but could not read it");
                    SubmissionDto::default()
                });
                AssignOutcome::Claimed(submission)
            },
            404 => AssignOutcome::NotFound,
            400 | 422 => AssignOutcome::MaxAssigned,
            403 => AssignOutcome::NotCertified,
            401 => AssignOutcome::Unauthorized,
            429 => AssignOutcome::RateLimited,
            _ => AssignOutcome::Unexpected { status, body: body.into() },
        }
    }

    /// No later claim in the same round can succeed for this credential.
    pub fn ends_round(&self) -> bool {
        matches!(
            self,
            AssignOutcome::MaxAssigned | AssignOutcome::Unauthorized | AssignOutcome::RateLimited
        )
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self, AssignOutcome::Claimed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: u16, body: &str) -> AssignOutcome {
        AssignOutcome::classify(status, body, "/projects/1/submissions/assign")
    }

    #[test]
    fn created_parses_the_submission() {
        let outcome = classify(
            201,
            r#"{"id": 77, "price": "40.0", "language": "zh-cn", "project": {"name": "Finding Donors"}}"#,
        );
        let AssignOutcome::Claimed(sub) = outcome else { panic!("expected claim") };
        assert_eq!(sub.id.value(), 77);
        assert_eq!(sub.project_name(), Some("Finding Donors"));
    }

    #[test]
    fn created_with_unreadable_body_is_still_a_claim() {
        let AssignOutcome::Claimed(sub) = classify(201, "<html>") else {
            panic!("expected claim")
        };
        assert!(!sub.has_id());

        let AssignOutcome::Claimed(sub) =
            classify(201, r#"{"price": "40.0", "language": "en-us", "project": {"name": "X"}}"#)
        else {
            panic!("expected claim")
        };
        assert_eq!(sub.price.as_deref(), Some("40.0"));
        assert_eq!(sub.project_name(), Some("X"));
    }

    #[test]
    fn status_codes_map_to_outcomes() {
        assert!(matches!(classify(404, ""), AssignOutcome::NotFound));
        assert!(matches!(classify(422, ""), AssignOutcome::MaxAssigned));
        assert!(matches!(classify(400, "limit"), AssignOutcome::MaxAssigned));
        assert!(matches!(classify(403, ""), AssignOutcome::NotCertified));
        assert!(matches!(classify(401, ""), AssignOutcome::Unauthorized));
        assert!(matches!(classify(429, ""), AssignOutcome::RateLimited));
        assert!(matches!(
            classify(502, "bad gateway"),
            AssignOutcome::Unexpected { status: 502, .. }
        ));
    }

    #[test]
    fn only_blocking_outcomes_end_the_round() {
        assert!(classify(429, "").ends_round());
        assert!(classify(422, "").ends_round());
        assert!(!classify(404, "").ends_round());
        assert!(!classify(403, "").ends_round());
    }
}
