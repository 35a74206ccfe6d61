use super::domain::{LawyerId, LawyerProfile};
use crate::workflows::domain::{AreaOfLaw, RepositoryError, UserId};

/// Storage abstraction over the pro-bono directory.
pub trait LawyerDirectory: Send + Sync {
    fn insert(&self, profile: LawyerProfile) -> Result<LawyerProfile, RepositoryError>;
    fn update(&self, profile: LawyerProfile) -> Result<(), RepositoryError>;
    fn remove(&self, id: &LawyerId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LawyerId) -> Result<Option<LawyerProfile>, RepositoryError>;
    /// Folds one rating into the stored running average as a single
    /// read-modify-write under the store's own lock.
    fn record_rating(&self, id: &LawyerId, rating: f32) -> Result<LawyerProfile, RepositoryError>;
    fn fetch_by_owner(&self, owner: &UserId) -> Result<Option<LawyerProfile>, RepositoryError>;
    /// Active entries, highest rated first.
    fn active(&self) -> Result<Vec<LawyerProfile>, RepositoryError>;
    /// Active entries practicing `area`, highest rated first, at most `limit`.
    fn top_rated_for(
        &self,
        area: AreaOfLaw,
        limit: usize,
    ) -> Result<Vec<LawyerProfile>, RepositoryError>;
}
