use std::fmt;

use chrono::{DateTime, Utc};
use compact_str::{CompactString, ToCompactString};
use serde::{Deserialize, Deserializer, Serialize};

use crate::id::{ProjectId, SubmissionId};

/// A project the reviewer is certified for, as persisted in the config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub name: CompactString,
    pub id: ProjectId,
}

/// Locale a submission is reviewed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewLanguage {
    #[default]
    #[serde(rename = "zh-cn")]
    Chinese,
    #[serde(rename = "en-us")]
    English,
}

impl ReviewLanguage {
    pub const ALL: [ReviewLanguage; 2] = [ReviewLanguage::Chinese, ReviewLanguage::English];

    pub fn code(&self) -> &'static str {
        match self {
            ReviewLanguage::Chinese => "zh-cn",
            ReviewLanguage::English => "en-us",
        }
    }

    /// Anything that is not explicitly `en-us` is treated as Chinese.
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("en-us") {
            ReviewLanguage::English
        } else {
            ReviewLanguage::Chinese
        }
    }
}

impl fmt::Display for ReviewLanguage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReviewLanguage::Chinese => write!(f, "Chinese"),
            ReviewLanguage::English => write!(f, "English"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDto {
    pub name: CompactString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificationDto {
    pub project_id: ProjectId,
    pub status: CompactString,
    #[serde(default)]
    pub project: ProjectDto,
}

impl CertificationDto {
    pub fn is_certified(&self) -> bool {
        self.status == "certified"
    }
}

impl From<CertificationDto> for Certification {
    fn from(dto: CertificationDto) -> Self {
        Self { name: dto.project.name, id: dto.project_id }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionDto {
    /// Zero when the response left it out
    #[serde(default)]
    pub id: SubmissionId,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub project: Option<ProjectDto>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: Option<CompactString>,
    #[serde(default)]
    pub language: Option<CompactString>,
    #[serde(default)]
    pub status: Option<CompactString>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SubmissionDto {
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    pub fn review_language(&self) -> ReviewLanguage {
        ReviewLanguage::from_code(self.language.as_deref().unwrap_or_default())
    }

    pub fn price_or_unknown(&self) -> &str {
        self.price.as_deref().unwrap_or("?")
    }

    pub fn has_id(&self) -> bool {
        self.id != SubmissionId::default()
    }

    /// Fill whatever a claim response left out from the request that made it.
    pub fn fill_missing(&mut self, certification: &Certification, language: ReviewLanguage) {
        self.project_id.get_or_insert(certification.id);
        self.project.get_or_insert_with(|| ProjectDto { name: certification.name.clone() });
        self.language.get_or_insert_with(|| language.code().into());
    }
}

/// Prices come back as either `"25.0"` or `25.0` depending on the endpoint.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<CompactString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s.into()),
        Some(serde_json::Value::Number(n)) => Some(n.to_compact_string()),
        _ => None,
    })
}
