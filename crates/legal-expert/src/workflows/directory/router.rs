use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{LawyerId, ProfileDraft, ProfileUpdate};
use super::repository::LawyerDirectory;
use super::service::{DirectoryServiceError, ProBonoDirectoryService};
use crate::auth::AuthenticatedUser;
use crate::respond::{failure, success};

/// Router exposing the pro-bono directory.
pub fn directory_router<L>(service: Arc<ProBonoDirectoryService<L>>) -> Router
where
    L: LawyerDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/probono",
            get(list_handler::<L>).post(create_handler::<L>),
        )
        .route("/api/v1/probono/search", get(search_handler::<L>))
        .route(
            "/api/v1/probono/me",
            put(update_handler::<L>).delete(remove_handler::<L>),
        )
        .route("/api/v1/probono/:lawyer_id", get(get_handler::<L>))
        .route("/api/v1/probono/:lawyer_id/rate", post(rate_handler::<L>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingRequest {
    rating: f32,
}

pub(crate) async fn list_handler<L>(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    match service.list_active() {
        Ok(profiles) => success(StatusCode::OK, json!({ "probonoLawyers": profiles })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<L>(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    match service.search(params.query.as_deref()) {
        Ok(profiles) => success(StatusCode::OK, json!({ "probonoLawyers": profiles })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<L>(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
    Path(lawyer_id): Path<String>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    match service.get(&LawyerId(lawyer_id)) {
        Ok(profile) => success(StatusCode::OK, json!({ "probonoLawyer": profile })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<L>(
    AuthenticatedUser { user: owner, role }: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
    payload: Result<Json<ProfileDraft>, JsonRejection>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.create(&owner, role, draft) {
        Ok(profile) => success(StatusCode::CREATED, json!({ "probonoLawyer": profile })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<L>(
    AuthenticatedUser { user: owner, .. }: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    let Json(changes) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.update(&owner, changes) {
        Ok(profile) => success(StatusCode::OK, json!({ "probonoLawyer": profile })),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_handler<L>(
    AuthenticatedUser { user: owner, .. }: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    match service.remove(&owner) {
        Ok(()) => success(StatusCode::OK, serde_json::Value::Null),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rate_handler<L>(
    _user: AuthenticatedUser,
    State(service): State<Arc<ProBonoDirectoryService<L>>>,
    Path(lawyer_id): Path<String>,
    payload: Result<Json<RatingRequest>, JsonRejection>,
) -> Response
where
    L: LawyerDirectory + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(_) => {
            return failure(StatusCode::BAD_REQUEST, "Rating must be between 1 and 5");
        }
    };

    match service.rate(&LawyerId(lawyer_id), request.rating) {
        Ok(profile) => success(StatusCode::OK, json!({ "probonoLawyer": profile })),
        Err(err) => error_response(err),
    }
}

fn error_response(err: DirectoryServiceError) -> Response {
    match err {
        DirectoryServiceError::Validation(message) => failure(StatusCode::BAD_REQUEST, message),
        DirectoryServiceError::Forbidden => failure(StatusCode::FORBIDDEN, err.to_string()),
        DirectoryServiceError::NotFound => {
            failure(StatusCode::NOT_FOUND, "Pro bono lawyer not found")
        }
        DirectoryServiceError::Conflict => {
            failure(StatusCode::CONFLICT, "You already have a pro bono profile")
        }
        DirectoryServiceError::Repository(source) => {
            error!(error = %source, "directory store failure");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "directory temporarily unavailable",
            )
        }
    }
}
