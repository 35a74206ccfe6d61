use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::{Extension, Router};
use serde_json::Value;

use crate::auth::TokenVerifier;
use crate::workflows::analysis::{
    analysis_router, AnalysisRepository, AssessmentClient, AssessmentError, CaseAnalysis,
    CaseAnalysisId, CaseAnalysisService, CaseSubmission, RawAssessment,
};
use crate::workflows::directory::{LawyerDirectory, LawyerId, LawyerProfile};
use crate::workflows::domain::{AreaOfLaw, RepositoryError, Role, UserId};
use crate::workflows::model::CompletionError;
use crate::workflows::testing::{lawyer, MemoryAnalyses, MemoryDirectory};

pub(super) const SECRET: &str = "routing-test-secret";

pub(super) fn user() -> UserId {
    UserId("user-amara".to_string())
}

pub(super) fn raw(risk: u8, resolution_probability: u8, complexity: u8) -> RawAssessment {
    RawAssessment {
        risk,
        resolution_probability,
        complexity,
    }
}

pub(super) fn civil_case() -> CaseSubmission {
    CaseSubmission::new(
        "My landlord has kept my deposit for three months without explanation.",
        AreaOfLaw::Civil,
    )
}

pub(super) fn civil_directory() -> Vec<LawyerProfile> {
    let mut inactive = lawyer("l-inactive", AreaOfLaw::Civil, 5.0);
    inactive.active = false;
    vec![
        lawyer("l-civil-low", AreaOfLaw::Civil, 3.2),
        lawyer("l-civil-top", AreaOfLaw::Civil, 4.9),
        lawyer("l-civil-mid", AreaOfLaw::Civil, 4.1),
        lawyer("l-civil-high", AreaOfLaw::Civil, 4.5),
        lawyer("l-tax", AreaOfLaw::Tax, 5.0),
        inactive,
    ]
}

/// Assessment client returning a fixed outcome and counting calls.
pub(super) struct CountingAssessmentClient {
    outcome: Option<RawAssessment>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingAssessmentClient {
    pub(super) fn returning(raw: RawAssessment) -> Self {
        Self {
            outcome: Some(raw),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            outcome: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn stalling(delay: Duration) -> Self {
        Self {
            outcome: Some(raw(50, 50, 50)),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssessmentClient for CountingAssessmentClient {
    async fn assess(
        &self,
        _problem: &str,
        _area: AreaOfLaw,
    ) -> Result<RawAssessment, AssessmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
            .ok_or(AssessmentError::Completion(CompletionError::Status {
                status: 500,
            }))
    }
}

/// Directory whose every call fails.
pub(super) struct UnavailableDirectory;

impl LawyerDirectory for UnavailableDirectory {
    fn insert(&self, _profile: LawyerProfile) -> Result<LawyerProfile, RepositoryError> {
        Err(offline())
    }

    fn update(&self, _profile: LawyerProfile) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn remove(&self, _id: &LawyerId) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn fetch(&self, _id: &LawyerId) -> Result<Option<LawyerProfile>, RepositoryError> {
        Err(offline())
    }

    fn record_rating(&self, _id: &LawyerId, _rating: f32) -> Result<LawyerProfile, RepositoryError> {
        Err(offline())
    }

    fn fetch_by_owner(&self, _owner: &UserId) -> Result<Option<LawyerProfile>, RepositoryError> {
        Err(offline())
    }

    fn active(&self) -> Result<Vec<LawyerProfile>, RepositoryError> {
        Err(offline())
    }

    fn top_rated_for(
        &self,
        _area: AreaOfLaw,
        _limit: usize,
    ) -> Result<Vec<LawyerProfile>, RepositoryError> {
        Err(offline())
    }
}

/// Directory that ignores the area and limit and returns everything it holds.
pub(super) struct CarelessDirectory {
    inner: MemoryDirectory,
    profiles: Vec<LawyerProfile>,
}

impl CarelessDirectory {
    pub(super) fn new(profiles: Vec<LawyerProfile>) -> Self {
        Self {
            inner: MemoryDirectory::with_profiles(profiles.clone()),
            profiles,
        }
    }
}

impl LawyerDirectory for CarelessDirectory {
    fn insert(&self, profile: LawyerProfile) -> Result<LawyerProfile, RepositoryError> {
        self.inner.insert(profile)
    }

    fn update(&self, profile: LawyerProfile) -> Result<(), RepositoryError> {
        self.inner.update(profile)
    }

    fn remove(&self, id: &LawyerId) -> Result<(), RepositoryError> {
        self.inner.remove(id)
    }

    fn fetch(&self, id: &LawyerId) -> Result<Option<LawyerProfile>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn record_rating(&self, id: &LawyerId, rating: f32) -> Result<LawyerProfile, RepositoryError> {
        self.inner.record_rating(id, rating)
    }

    fn fetch_by_owner(&self, owner: &UserId) -> Result<Option<LawyerProfile>, RepositoryError> {
        self.inner.fetch_by_owner(owner)
    }

    fn active(&self) -> Result<Vec<LawyerProfile>, RepositoryError> {
        Ok(self.profiles.clone())
    }

    fn top_rated_for(
        &self,
        _area: AreaOfLaw,
        _limit: usize,
    ) -> Result<Vec<LawyerProfile>, RepositoryError> {
        Ok(self.profiles.clone())
    }
}

pub(super) struct UnavailableAnalyses;

impl AnalysisRepository for UnavailableAnalyses {
    fn insert(&self, _analysis: CaseAnalysis) -> Result<CaseAnalysis, RepositoryError> {
        Err(offline())
    }

    fn fetch(&self, _id: &CaseAnalysisId) -> Result<Option<CaseAnalysis>, RepositoryError> {
        Err(offline())
    }

    fn for_owner(&self, _owner: &UserId) -> Result<Vec<CaseAnalysis>, RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

pub(super) type MemoryService =
    CaseAnalysisService<CountingAssessmentClient, MemoryDirectory, MemoryAnalyses>;

pub(super) fn build_service(
    assessor: CountingAssessmentClient,
) -> (
    MemoryService,
    Arc<CountingAssessmentClient>,
    Arc<MemoryDirectory>,
    Arc<MemoryAnalyses>,
) {
    let assessor = Arc::new(assessor);
    let directory = Arc::new(MemoryDirectory::with_profiles(civil_directory()));
    let analyses = Arc::new(MemoryAnalyses::default());
    let service = CaseAnalysisService::new(assessor.clone(), directory.clone(), analyses.clone());
    (service, assessor, directory, analyses)
}

pub(super) fn verifier() -> TokenVerifier {
    TokenVerifier::from_secret(SECRET)
}

pub(super) fn authenticated_router(service: MemoryService) -> Router {
    analysis_router(Arc::new(service)).layer(Extension(verifier()))
}

pub(super) fn bearer() -> String {
    let token = verifier()
        .issue(&user(), Role::Public, Duration::from_secs(600))
        .expect("token issued");
    format!("Bearer {token}")
}

pub(super) fn json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer());
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
