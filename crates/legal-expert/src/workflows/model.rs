//! Transport for the hosted chat-completion model.
//!
//! Workflows talk to [`ChatCompletionClient`] so prompt construction and reply
//! parsing can be exercised without a network.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AssessmentConfig, ConfigError};

/// One system + user exchange sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("model returned HTTP {status}")]
    Status { status: u16 },
    #[error("model reply contained no content")]
    EmptyReply,
    #[error("model transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Returns the text of the first reply choice.
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: Option<WireReplyMessage>,
}

#[derive(Deserialize)]
struct WireReplyMessage {
    content: Option<String>,
}

/// Mistral chat-completions client (`POST {base_url}/chat/completions`).
pub struct MistralClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl MistralClient {
    pub fn from_config(config: &AssessmentConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|_| ConfigError::InvalidValue {
                name: "MISTRAL_BASE_URL",
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            timeout: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatCompletionClient for MistralClient {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, CompletionError> {
        let body = WireRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "calling chat completions");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.map_transport(err))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, model = %self.model, "chat completions returned non-success");
            return Err(CompletionError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|err| self.map_transport(err))?;

        extract_content(parsed)
    }
}

impl MistralClient {
    fn map_transport(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout)
        } else {
            CompletionError::Transport(err.to_string())
        }
    }
}

fn extract_content(response: WireResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(CompletionError::EmptyReply)
}
