//! Coarse risk label for a chat message.
//!
//! Unlike case analysis, triage never fails the request: any unusable model
//! outcome falls back to [`RiskLabel::Low`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::model::{ChatCompletionClient, ChatCompletionRequest};
use crate::auth::AuthenticatedUser;
use crate::respond::{failure, success};

const TRIAGE_SYSTEM_PROMPT: &str = "You are a legal risk assessor. Based on the provided \
situation, respond ONLY with one of these exact words: \"Low\", \"Medium\", or \"High\". \
Do not include any additional text.";
const TRIAGE_MAX_TOKENS: u32 = 100;
const TRIAGE_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskLabel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLabel {
    /// Case-insensitive match on the whole reply.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::Medium => "Medium",
            RiskLabel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Asks the chat model for a [`RiskLabel`].
pub struct RiskTriage<C> {
    completions: Arc<C>,
}

impl<C> RiskTriage<C>
where
    C: ChatCompletionClient + 'static,
{
    pub fn new(completions: Arc<C>) -> Self {
        Self { completions }
    }

    pub async fn classify(&self, message: &str) -> RiskLabel {
        let request = ChatCompletionRequest {
            system: TRIAGE_SYSTEM_PROMPT.to_string(),
            user: message.to_string(),
            max_tokens: TRIAGE_MAX_TOKENS,
            temperature: TRIAGE_TEMPERATURE,
        };

        match self.completions.complete(request).await {
            Ok(reply) => RiskLabel::parse(&reply).unwrap_or_else(|| {
                warn!(reply = %reply, "unrecognised risk label, defaulting to Low");
                RiskLabel::Low
            }),
            Err(err) => {
                warn!(error = %err, "risk triage failed, defaulting to Low");
                RiskLabel::Low
            }
        }
    }
}

pub fn triage_router<C>(triage: Arc<RiskTriage<C>>) -> Router
where
    C: ChatCompletionClient + 'static,
{
    Router::new()
        .route("/api/v1/triage/risk-level", post(risk_level_handler::<C>))
        .with_state(triage)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TriageRequest {
    #[serde(default)]
    message: Option<String>,
}

pub(crate) async fn risk_level_handler<C>(
    _user: AuthenticatedUser,
    State(triage): State<Arc<RiskTriage<C>>>,
    payload: Result<Json<TriageRequest>, JsonRejection>,
) -> Response
where
    C: ChatCompletionClient + 'static,
{
    let message = match payload {
        Ok(Json(request)) => request.message.unwrap_or_default(),
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if message.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Please provide a message to assess");
    }

    let label = triage.classify(message.trim()).await;
    success(StatusCode::OK, json!({ "riskLevel": label }))
}
