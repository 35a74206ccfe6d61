use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use legal_expert::workflows::analysis::{
    analysis_router, AnalysisRepository, AssessmentClient, CaseAnalysisService,
};
use legal_expert::workflows::directory::{
    directory_router, LawyerDirectory, ProBonoDirectoryService,
};
use legal_expert::workflows::model::ChatCompletionClient;
use legal_expert::workflows::triage::{triage_router, RiskTriage};
use serde_json::json;
use std::sync::Arc;

/// Every workflow router plus the unauthenticated service endpoints.
pub(crate) fn with_workflow_routes<A, L, R, C>(
    analysis: Arc<CaseAnalysisService<A, L, R>>,
    directory: Arc<ProBonoDirectoryService<L>>,
    triage: Arc<RiskTriage<C>>,
) -> axum::Router
where
    A: AssessmentClient + 'static,
    L: LawyerDirectory + 'static,
    R: AnalysisRepository + 'static,
    C: ChatCompletionClient + 'static,
{
    analysis_router(analysis)
        .merge(directory_router(directory))
        .merge(triage_router(triage))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
