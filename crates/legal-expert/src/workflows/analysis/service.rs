use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::assessment::{AssessmentClient, AssessmentError};
use super::domain::{
    CaseAnalysis, CaseAnalysisId, CaseAnalysisView, CaseSubmission, ValidationError,
};
use super::playbook::{standard_articles, standard_steps};
use super::refinement::refine;
use super::repository::AnalysisRepository;
use crate::workflows::directory::{rank_for_area, LawyerDirectory, LawyerSummary};
use crate::workflows::domain::{RepositoryError, UserId};

pub const SUGGESTED_LAWYER_LIMIT: usize = 3;
pub const DEFAULT_ASSESSMENT_TIMEOUT: Duration = Duration::from_secs(30);

static CASE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_case_id() -> CaseAnalysisId {
    let id = CASE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CaseAnalysisId(format!("case-{id:06}"))
}

/// Turns a submission into a persisted, scored case analysis.
///
/// Validation runs before the model is called, and nothing is stored unless
/// the assessment and the directory lookup both succeed.
pub struct CaseAnalysisService<A, L, R> {
    assessor: Arc<A>,
    directory: Arc<L>,
    repository: Arc<R>,
    timeout: Duration,
}

impl<A, L, R> CaseAnalysisService<A, L, R>
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
{
    pub fn new(assessor: Arc<A>, directory: Arc<L>, repository: Arc<R>) -> Self {
        Self {
            assessor,
            directory,
            repository,
            timeout: DEFAULT_ASSESSMENT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn submit(
        &self,
        user: &UserId,
        submission: CaseSubmission,
    ) -> Result<CaseAnalysisView, CaseAnalysisError> {
        let case = submission.validate()?;

        let assessment = tokio::time::timeout(
            self.timeout,
            self.assessor.assess(&case.problem, case.area),
        )
        .await
        .unwrap_or(Err(AssessmentError::Timeout(self.timeout)));
        let raw = assessment.map_err(|err| {
            warn!(user = %user, area = %case.area, error = %err, "case assessment failed");
            CaseAnalysisError::Generation(err)
        })?;

        let scores = refine(raw, case.area, &mut rand::thread_rng());

        let candidates = self
            .directory
            .top_rated_for(case.area, SUGGESTED_LAWYER_LIMIT)
            .map_err(CaseAnalysisError::Directory)?;
        let lawyers = rank_for_area(candidates, case.area, SUGGESTED_LAWYER_LIMIT);

        let record = CaseAnalysis {
            id: next_case_id(),
            user: user.clone(),
            problem_description: case.problem,
            area_of_law: case.area,
            analysis: scores,
            suggested_lawyers: lawyers.iter().map(|lawyer| lawyer.id.clone()).collect(),
            steps: standard_steps(),
            relevant_articles: standard_articles(),
            created_at: Utc::now(),
        };

        let stored = self
            .repository
            .insert(record)
            .map_err(CaseAnalysisError::Repository)?;

        info!(
            case_id = %stored.id.0,
            user = %user,
            area = %stored.area_of_law,
            risk = scores.risk_level,
            probability = scores.resolution_probability,
            complexity = scores.complexity,
            suggested = lawyers.len(),
            "case analysis stored"
        );

        let summaries = lawyers.iter().map(|lawyer| lawyer.summary()).collect();
        Ok(stored.into_view(summaries))
    }

    pub fn get(&self, id: &CaseAnalysisId) -> Result<CaseAnalysisView, CaseAnalysisError> {
        let record = self
            .repository
            .fetch(id)
            .map_err(CaseAnalysisError::Repository)?
            .ok_or(CaseAnalysisError::NotFound)?;
        self.resolve(record)
    }

    /// The user's analyses, newest first.
    pub fn list_for_user(&self, user: &UserId) -> Result<Vec<CaseAnalysisView>, CaseAnalysisError> {
        let mut records = self
            .repository
            .for_owner(user)
            .map_err(CaseAnalysisError::Repository)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        records
            .into_iter()
            .map(|record| self.resolve(record))
            .collect()
    }

    /// Removed directory entries are dropped from the view.
    fn resolve(&self, record: CaseAnalysis) -> Result<CaseAnalysisView, CaseAnalysisError> {
        let mut summaries: Vec<LawyerSummary> = Vec::with_capacity(record.suggested_lawyers.len());
        for id in &record.suggested_lawyers {
            if let Some(profile) = self
                .directory
                .fetch(id)
                .map_err(CaseAnalysisError::Directory)?
            {
                summaries.push(profile.summary());
            }
        }
        Ok(record.into_view(summaries))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaseAnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("assessment generation failed")]
    Generation(#[source] AssessmentError),
    #[error("lawyer directory unavailable")]
    Directory(#[source] RepositoryError),
    #[error("analysis store unavailable")]
    Repository(#[source] RepositoryError),
    #[error("Analysis not found")]
    NotFound,
}

impl CaseAnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CaseAnalysisError::Validation(_) => StatusCode::BAD_REQUEST,
            CaseAnalysisError::Generation(_) => StatusCode::BAD_GATEWAY,
            CaseAnalysisError::NotFound => StatusCode::NOT_FOUND,
            CaseAnalysisError::Directory(_) | CaseAnalysisError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
