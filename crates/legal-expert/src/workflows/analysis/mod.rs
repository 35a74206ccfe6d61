//! Case analysis: model assessment, domain score refinement and record
//! assembly with suggested pro-bono lawyers.

pub mod assessment;
pub mod domain;
pub(crate) mod playbook;
pub mod refinement;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use assessment::{
    parse_assessment_reply, AssessmentClient, AssessmentError, ModelAssessmentClient,
    RawAssessment, ASSESSMENT_SYSTEM_PROMPT,
};
pub use domain::{
    AnalysisScores, CaseAnalysis, CaseAnalysisId, CaseAnalysisView, CaseStep, CaseSubmission,
    RelevantArticle, ValidatedCase, ValidationError,
};
pub use refinement::{refine, refine_scores, RefinedScores, TimeEstimate};
pub use repository::AnalysisRepository;
pub use router::analysis_router;
pub use service::{CaseAnalysisError, CaseAnalysisService, SUGGESTED_LAWYER_LIMIT};
