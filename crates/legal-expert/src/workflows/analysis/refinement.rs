//! Domain weighting applied to the raw model ratings.
//!
//! Scores are a pure function of the raw triple and the area of law. The time
//! estimate is drawn from the caller's RNG and is independent of complexity.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::assessment::RawAssessment;
use super::domain::AnalysisScores;
use crate::workflows::domain::AreaOfLaw;

const HIGH_RISK_THRESHOLD: f64 = 80.0;
const HIGH_RISK_BOOST: f64 = 1.1;
const LOW_RISK_THRESHOLD: f64 = 20.0;
const LOW_RISK_DAMPING: f64 = 0.9;

pub fn risk_weight(area: AreaOfLaw) -> f64 {
    match area {
        AreaOfLaw::Criminal => 1.2,
        AreaOfLaw::Corporate => 1.1,
        AreaOfLaw::IntellectualProperty => 1.05,
        AreaOfLaw::Tax => 1.15,
        AreaOfLaw::Civil => 0.95,
        AreaOfLaw::Family => 0.9,
        AreaOfLaw::Other => 1.0,
    }
}

pub fn success_rate(area: AreaOfLaw) -> f64 {
    match area {
        AreaOfLaw::Criminal => 0.65,
        AreaOfLaw::Civil => 0.75,
        AreaOfLaw::Corporate => 0.8,
        AreaOfLaw::Family => 0.85,
        AreaOfLaw::IntellectualProperty => 0.7,
        AreaOfLaw::Tax => 0.6,
        AreaOfLaw::Other => 0.7,
    }
}

pub fn complexity_factor(area: AreaOfLaw) -> f64 {
    match area {
        AreaOfLaw::Criminal => 1.15,
        AreaOfLaw::Corporate => 1.2,
        AreaOfLaw::IntellectualProperty => 1.25,
        AreaOfLaw::Tax => 1.3,
        AreaOfLaw::Civil => 1.0,
        AreaOfLaw::Family => 0.95,
        AreaOfLaw::Other => 1.1,
    }
}

/// The three refined scores, each within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefinedScores {
    pub risk_level: u8,
    pub resolution_probability: u8,
    pub complexity: u8,
}

pub fn refine_scores(raw: RawAssessment, area: AreaOfLaw) -> RefinedScores {
    RefinedScores {
        risk_level: refine_risk(raw.risk, area),
        resolution_probability: refine_resolution_probability(
            raw.resolution_probability,
            raw.complexity,
            area,
        ),
        complexity: refine_complexity(raw.complexity, area),
    }
}

pub fn refine_risk(raw_risk: u8, area: AreaOfLaw) -> u8 {
    let mut risk = f64::from(raw_risk) * risk_weight(area);
    if risk > HIGH_RISK_THRESHOLD {
        risk *= HIGH_RISK_BOOST;
    }
    if risk < LOW_RISK_THRESHOLD {
        risk *= LOW_RISK_DAMPING;
    }
    round_and_clamp(risk)
}

pub fn refine_resolution_probability(raw_probability: u8, raw_complexity: u8, area: AreaOfLaw) -> u8 {
    let complexity_impact = (100.0 - f64::from(raw_complexity)).max(0.0) / 100.0;
    round_and_clamp(f64::from(raw_probability) * complexity_impact * success_rate(area))
}

pub fn refine_complexity(raw_complexity: u8, area: AreaOfLaw) -> u8 {
    round_and_clamp(f64::from(raw_complexity) * complexity_factor(area))
}

/// Rounds half away from zero, then clamps into 0..=100.
fn round_and_clamp(value: f64) -> u8 {
    let rounded = value.round();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, 100.0) as u8
}

/// Coarse duration buckets shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeEstimate {
    #[serde(rename = "1-2 weeks")]
    OneToTwoWeeks,
    #[serde(rename = "2-4 weeks")]
    TwoToFourWeeks,
    #[serde(rename = "1-3 months")]
    OneToThreeMonths,
    #[serde(rename = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6-12 months")]
    SixToTwelveMonths,
}

impl TimeEstimate {
    pub const ALL: [TimeEstimate; 5] = [
        TimeEstimate::OneToTwoWeeks,
        TimeEstimate::TwoToFourWeeks,
        TimeEstimate::OneToThreeMonths,
        TimeEstimate::ThreeToSixMonths,
        TimeEstimate::SixToTwelveMonths,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            TimeEstimate::OneToTwoWeeks => "1-2 weeks",
            TimeEstimate::TwoToFourWeeks => "2-4 weeks",
            TimeEstimate::OneToThreeMonths => "1-3 months",
            TimeEstimate::ThreeToSixMonths => "3-6 months",
            TimeEstimate::SixToTwelveMonths => "6-12 months",
        }
    }

    /// Uniform pick over the five buckets.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl std::fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Refines the raw triple and attaches a sampled time estimate.
pub fn refine<R: Rng + ?Sized>(raw: RawAssessment, area: AreaOfLaw, rng: &mut R) -> AnalysisScores {
    let scores = refine_scores(raw, area);
    AnalysisScores {
        risk_level: scores.risk_level,
        resolution_probability: scores.resolution_probability,
        complexity: scores.complexity,
        time_estimate: TimeEstimate::sample(rng),
    }
}
