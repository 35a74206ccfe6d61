use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::refinement::TimeEstimate;
use crate::workflows::directory::{LawyerId, LawyerSummary};
use crate::workflows::domain::{AreaOfLaw, UserId};

/// Identifier wrapper for stored case analyses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseAnalysisId(pub String);

/// Raw request body. Fields stay optional so that omissions reach validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSubmission {
    #[serde(default)]
    pub problem_description: Option<String>,
    #[serde(default)]
    pub area_of_law: Option<String>,
}

impl CaseSubmission {
    pub fn new(problem_description: impl Into<String>, area: AreaOfLaw) -> Self {
        Self {
            problem_description: Some(problem_description.into()),
            area_of_law: Some(area.label().to_string()),
        }
    }

    pub fn validate(self) -> Result<ValidatedCase, ValidationError> {
        let problem = self
            .problem_description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let area_label = self
            .area_of_law
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty());

        let (Some(problem), Some(area_label)) = (problem, area_label) else {
            return Err(ValidationError::MissingFields);
        };

        let area = AreaOfLaw::parse(&area_label).ok_or(ValidationError::UnknownArea(area_label))?;
        Ok(ValidatedCase { problem, area })
    }
}

/// Submission that passed validation; safe to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCase {
    pub problem: String,
    pub area: AreaOfLaw,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide both problem description and area of law")]
    MissingFields,
    #[error("'{0}' is not a supported area of law")]
    UnknownArea(String),
}

/// Refined scores stored on a case analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisScores {
    pub risk_level: u8,
    pub resolution_probability: u8,
    pub complexity: u8,
    pub time_estimate: TimeEstimate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStep {
    pub step_number: u8,
    pub description: String,
    pub estimated_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantArticle {
    pub article_number: String,
    pub title: String,
    pub description: String,
    pub relevance: u8,
}

/// Persisted case analysis. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysis {
    pub id: CaseAnalysisId,
    pub user: UserId,
    pub problem_description: String,
    pub area_of_law: AreaOfLaw,
    pub analysis: AnalysisScores,
    pub suggested_lawyers: Vec<LawyerId>,
    pub steps: Vec<CaseStep>,
    pub relevant_articles: Vec<RelevantArticle>,
    pub created_at: DateTime<Utc>,
}

impl CaseAnalysis {
    pub fn into_view(self, suggested_lawyers: Vec<LawyerSummary>) -> CaseAnalysisView {
        CaseAnalysisView {
            id: self.id,
            user: self.user,
            problem_description: self.problem_description,
            area_of_law: self.area_of_law,
            analysis: self.analysis,
            suggested_lawyers,
            steps: self.steps,
            relevant_articles: self.relevant_articles,
            created_at: self.created_at,
        }
    }
}

/// API projection with suggested lawyers resolved to display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAnalysisView {
    pub id: CaseAnalysisId,
    pub user: UserId,
    pub problem_description: String,
    pub area_of_law: AreaOfLaw,
    pub analysis: AnalysisScores,
    pub suggested_lawyers: Vec<LawyerSummary>,
    pub steps: Vec<CaseStep>,
    pub relevant_articles: Vec<RelevantArticle>,
    pub created_at: DateTime<Utc>,
}
