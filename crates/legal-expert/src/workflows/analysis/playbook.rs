//! Fixed next-steps and article references attached to every analysis.
//!
//! The content does not depend on the submitted problem.

use super::domain::{CaseStep, RelevantArticle};

const STEPS: [(&str, &str); 5] = [
    ("Initial consultation with lawyer", "1-2 days"),
    ("Document collection and review", "3-5 days"),
    ("Legal strategy development", "1 week"),
    ("Filing necessary paperwork", "2-3 days"),
    ("Initial hearing or mediation", "2-4 weeks"),
];

const ARTICLES: [(&str, &str, &str, u8); 3] = [
    (
        "Art. 15",
        "Rights and Obligations",
        "Fundamental rights in legal proceedings",
        95,
    ),
    (
        "Art. 22",
        "Due Process",
        "Procedural requirements and timelines",
        85,
    ),
    (
        "Art. 45",
        "Remedies",
        "Available legal remedies and compensation",
        75,
    ),
];

pub fn standard_steps() -> Vec<CaseStep> {
    STEPS
        .iter()
        .zip(1u8..)
        .map(|((description, estimated_time), step_number)| CaseStep {
            step_number,
            description: (*description).to_string(),
            estimated_time: (*estimated_time).to_string(),
        })
        .collect()
}

pub fn standard_articles() -> Vec<RelevantArticle> {
    ARTICLES
        .iter()
        .map(|(number, title, description, relevance)| RelevantArticle {
            article_number: (*number).to_string(),
            title: (*title).to_string(),
            description: (*description).to_string(),
            relevance: *relevance,
        })
        .collect()
}
