//! Raw ratings from the hosted model.
//!
//! The model is asked for exactly three integers; the reply is parsed
//! deterministically and any deviation is an error, never a guess.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::AssessmentConfig;
use crate::workflows::domain::AreaOfLaw;
use crate::workflows::model::{ChatCompletionClient, ChatCompletionRequest, CompletionError};

pub const ASSESSMENT_SYSTEM_PROMPT: &str = "You are a legal risk assessment expert. \
Analyze the following legal problem and provide three metrics on a scale of 0-100. \
Your response must be EXACTLY three numbers between 0-100, separated by commas, with no \
other text or characters. Example valid response: \"75,60,85\"\n\n\
Metrics to analyze:\n\
1. Risk Level (potential consequences and legal exposure)\n\
2. Resolution Probability (likelihood of favorable resolution)\n\
3. Case Complexity (legal intricacies and procedural requirements)";

pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

/// Whole-word integers 0..=100, with ASCII word boundaries.
const METRIC_PATTERN: &str = r"(?-u:\b)([0-9]|[1-9][0-9]|100)(?-u:\b)";

static METRIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(METRIC_PATTERN).expect("metric pattern is valid"));

/// Model ratings before domain weighting, each within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAssessment {
    pub risk: u8,
    pub resolution_probability: u8,
    pub complexity: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("assessment exceeded {0:?}")]
    Timeout(Duration),
    #[error("model reply was empty")]
    EmptyReply,
    #[error("expected three metrics in model reply, found {found}")]
    Malformed { found: usize },
    #[error("metric value {0} outside 0-100")]
    OutOfRange(u32),
}

#[async_trait]
pub trait AssessmentClient: Send + Sync {
    async fn assess(&self, problem: &str, area: AreaOfLaw) -> Result<RawAssessment, AssessmentError>;
}

/// [`AssessmentClient`] backed by a chat-completion model.
pub struct ModelAssessmentClient<C> {
    completions: Arc<C>,
    max_tokens: u32,
    temperature: f32,
}

impl<C> ModelAssessmentClient<C>
where
    C: ChatCompletionClient,
{
    pub fn new(completions: Arc<C>) -> Self {
        Self {
            completions,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn from_config(completions: Arc<C>, config: &AssessmentConfig) -> Self {
        Self {
            completions,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn request_for(&self, problem: &str, area: AreaOfLaw) -> ChatCompletionRequest {
        ChatCompletionRequest {
            system: ASSESSMENT_SYSTEM_PROMPT.to_string(),
            user: format!("Problem: {problem}\nArea of Law: {}", area.label()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl<C> AssessmentClient for ModelAssessmentClient<C>
where
    C: ChatCompletionClient,
{
    async fn assess(&self, problem: &str, area: AreaOfLaw) -> Result<RawAssessment, AssessmentError> {
        let reply = self.completions.complete(self.request_for(problem, area)).await?;
        match parse_assessment_reply(&reply) {
            Ok(raw) => {
                debug!(
                    area = %area,
                    risk = raw.risk,
                    probability = raw.resolution_probability,
                    complexity = raw.complexity,
                    "model assessment parsed"
                );
                Ok(raw)
            }
            Err(err) => {
                warn!(area = %area, reply = %reply, error = %err, "unusable model assessment reply");
                Err(err)
            }
        }
    }
}

/// Takes the first three whole-word integers in 0..=100, in reply order, as
/// risk, resolution probability and complexity.
pub fn parse_assessment_reply(reply: &str) -> Result<RawAssessment, AssessmentError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(AssessmentError::EmptyReply);
    }

    let values = METRIC_REGEX
        .find_iter(reply)
        .map(|found| {
            found
                .as_str()
                .parse::<u32>()
                .map_err(|_| AssessmentError::Malformed { found: 0 })
        })
        .collect::<Result<Vec<u32>, _>>()?;

    if values.len() < 3 {
        return Err(AssessmentError::Malformed {
            found: values.len(),
        });
    }

    let metric = |value: u32| -> Result<u8, AssessmentError> {
        u8::try_from(value)
            .ok()
            .filter(|value| *value <= 100)
            .ok_or(AssessmentError::OutOfRange(value))
    };

    Ok(RawAssessment {
        risk: metric(values[0])?,
        resolution_probability: metric(values[1])?,
        complexity: metric(values[2])?,
    })
}
