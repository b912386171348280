//! The fixed set of review API endpoints

use compact_str::{CompactString, format_compact};
use reqwest::Method;

use crate::id::{ProjectId, SubmissionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Certifications,
    Assigned,
    Submissions,
    Feedbacks,
    FeedbackStats,
    Completed,
    Assign(ProjectId),
    Unassign(SubmissionId),
}

impl Endpoint {
    pub fn path(&self) -> CompactString {
        match self {
            Endpoint::Certifications => "/me/certifications/".into(),
            Endpoint::Assigned => "/me/submissions/assigned/".into(),
            Endpoint::Submissions => "/me/submissions/".into(),
            Endpoint::Feedbacks => "/me/student_feedbacks/".into(),
            Endpoint::FeedbackStats => "/me/student_feedbacks_stats/".into(),
            Endpoint::Completed => "/me/submissions/completed/".into(),
            Endpoint::Assign(id) => format_compact!("/projects/{id}/submissions/assign"),
            Endpoint::Unassign(id) => format_compact!("/submissions/{id}/unassign"),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Assign(_) => Method::POST,
            Endpoint::Unassign(_) => Method::PUT,
            _ => Method::GET,
        }
    }

    /// Join the endpoint path onto `base_url`, tolerating a trailing slash on the base.
    pub fn url(&self, base_url: &str) -> CompactString {
        format_compact!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://review-api.udacity.com/api/v1";

    #[test]
    fn assign_url_embeds_project_id() {
        let url = Endpoint::Assign(ProjectId::new(145)).url(BASE);
        assert_eq!(url, "https://review-api.udacity.com/api/v1/projects/145/submissions/assign");
        assert_eq!(Endpoint::Assign(ProjectId::new(145)).method(), Method::POST);
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let url = Endpoint::Assigned.url("http://localhost:8080/api/v1/");
        assert_eq!(url, "http://localhost:8080/api/v1/me/submissions/assigned/");
    }

    #[test]
    fn unassign_is_a_put() {
        let endpoint = Endpoint::Unassign(SubmissionId::new(7));
        assert_eq!(endpoint.path(), "/submissions/7/unassign");
        assert_eq!(endpoint.method(), Method::PUT);
    }
}
