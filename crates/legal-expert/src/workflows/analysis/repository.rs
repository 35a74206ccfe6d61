use super::domain::{CaseAnalysis, CaseAnalysisId};
use crate::workflows::domain::{RepositoryError, UserId};

/// Append-only store of completed case analyses.
pub trait AnalysisRepository: Send + Sync {
    fn insert(&self, analysis: CaseAnalysis) -> Result<CaseAnalysis, RepositoryError>;
    fn fetch(&self, id: &CaseAnalysisId) -> Result<Option<CaseAnalysis>, RepositoryError>;
    /// Analyses owned by `owner`, newest first.
    fn for_owner(&self, owner: &UserId) -> Result<Vec<CaseAnalysis>, RepositoryError>;
}
