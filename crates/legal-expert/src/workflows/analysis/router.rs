use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tracing::error;

use super::assessment::AssessmentClient;
use super::domain::{CaseAnalysisId, CaseSubmission};
use super::repository::AnalysisRepository;
use super::service::{CaseAnalysisError, CaseAnalysisService};
use crate::auth::AuthenticatedUser;
use crate::respond::{failure, success, success_with};
use crate::workflows::directory::LawyerDirectory;

/// Router exposing case submission and retrieval.
pub fn analysis_router<A, L, R>(service: Arc<CaseAnalysisService<A, L, R>>) -> Router
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/analysis",
            get(list_handler::<A, L, R>).post(submit_handler::<A, L, R>),
        )
        .route("/api/v1/analysis/:analysis_id", get(get_handler::<A, L, R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<A, L, R>(
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    State(service): State<Arc<CaseAnalysisService<A, L, R>>>,
    payload: Result<Json<CaseSubmission>, JsonRejection>,
) -> Response
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.submit(&user, submission).await {
        Ok(analysis) => success(StatusCode::CREATED, json!({ "analysis": analysis })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<A, L, R>(
    _user: AuthenticatedUser,
    State(service): State<Arc<CaseAnalysisService<A, L, R>>>,
    Path(analysis_id): Path<String>,
) -> Response
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
{
    match service.get(&CaseAnalysisId(analysis_id)) {
        Ok(analysis) => success(StatusCode::OK, json!({ "analysis": analysis })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<A, L, R>(
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    State(service): State<Arc<CaseAnalysisService<A, L, R>>>,
) -> Response
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
{
    match service.list_for_user(&user) {
        Ok(analyses) => {
            let mut extra = Map::new();
            extra.insert("results".to_string(), Value::from(analyses.len()));
            success_with(StatusCode::OK, json!({ "analyses": analyses }), extra)
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: CaseAnalysisError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        match &err {
            CaseAnalysisError::Generation(source) => {
                error!(error = %source, "case analysis generation failed");
            }
            CaseAnalysisError::Directory(source) | CaseAnalysisError::Repository(source) => {
                error!(error = %source, "case analysis store failure");
            }
            _ => {}
        }
    }
    failure(status, err.to_string())
}
