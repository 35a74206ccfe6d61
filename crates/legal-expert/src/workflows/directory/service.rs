use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    sort_by_rating, LawyerId, LawyerProfile, ProfileDraft, ProfileUpdate,
};
use super::repository::LawyerDirectory;
use crate::workflows::domain::{RepositoryError, Role, UserId};

static LAWYER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub fn next_lawyer_id() -> LawyerId {
    let id = LAWYER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LawyerId(format!("lawyer-{id:06}"))
}

pub const MIN_RATING: f32 = 1.0;
pub const MAX_RATING: f32 = 5.0;

/// Service wrapping the directory store with profile validation and ratings.
pub struct ProBonoDirectoryService<L> {
    directory: Arc<L>,
}

impl<L> ProBonoDirectoryService<L>
where
    L: LawyerDirectory + 'static,
{
    pub fn new(directory: Arc<L>) -> Self {
        Self { directory }
    }

    pub fn list_active(&self) -> Result<Vec<LawyerProfile>, DirectoryServiceError> {
        let mut profiles = self.directory.active()?;
        sort_by_rating(&mut profiles);
        Ok(profiles)
    }

    pub fn get(&self, id: &LawyerId) -> Result<LawyerProfile, DirectoryServiceError> {
        self.directory
            .fetch(id)?
            .ok_or(DirectoryServiceError::NotFound)
    }

    /// Blank queries list every active profile.
    pub fn search(&self, query: Option<&str>) -> Result<Vec<LawyerProfile>, DirectoryServiceError> {
        let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
        let profiles = self.list_active()?;
        if needle.is_empty() {
            return Ok(profiles);
        }

        Ok(profiles
            .into_iter()
            .filter(|profile| profile.matches_query(&needle))
            .collect())
    }

    /// Only accounts holding the lawyer role may list themselves.
    pub fn create(
        &self,
        owner: &UserId,
        role: Role,
        draft: ProfileDraft,
    ) -> Result<LawyerProfile, DirectoryServiceError> {
        if role != Role::Lawyer {
            return Err(DirectoryServiceError::Forbidden);
        }
        validate_draft(&draft)?;
        if self.directory.fetch_by_owner(owner)?.is_some() {
            return Err(DirectoryServiceError::Conflict);
        }

        let now = Utc::now();
        let profile = LawyerProfile {
            id: next_lawyer_id(),
            owner: owner.clone(),
            display_name: draft.display_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            active: true,
            experience_years: draft.experience_years,
            areas_of_practice: draft.areas_of_practice,
            rating: 0.0,
            total_ratings: 0,
            starting_charge: draft.starting_charge,
            description: draft.description.trim().to_string(),
            availability: draft.availability,
            languages: draft.languages,
            success_rate: 0,
            cases_handled: 0,
            contact: draft.contact,
            certifications: draft.certifications,
            created_at: now,
            updated_at: now,
        };

        let stored = self.directory.insert(profile).map_err(|err| match err {
            RepositoryError::Conflict => DirectoryServiceError::Conflict,
            other => DirectoryServiceError::Repository(other),
        })?;
        info!(lawyer_id = %stored.id.0, owner = %owner, "pro-bono profile created");
        Ok(stored)
    }

    pub fn update(
        &self,
        owner: &UserId,
        changes: ProfileUpdate,
    ) -> Result<LawyerProfile, DirectoryServiceError> {
        let mut profile = self
            .directory
            .fetch_by_owner(owner)?
            .ok_or(DirectoryServiceError::NotFound)?;

        apply_update(&mut profile, changes)?;
        profile.updated_at = Utc::now();
        self.directory.update(profile.clone())?;
        Ok(profile)
    }

    pub fn remove(&self, owner: &UserId) -> Result<(), DirectoryServiceError> {
        let profile = self
            .directory
            .fetch_by_owner(owner)?
            .ok_or(DirectoryServiceError::NotFound)?;
        self.directory.remove(&profile.id)?;
        info!(lawyer_id = %profile.id.0, owner = %owner, "pro-bono profile removed");
        Ok(())
    }

    /// Folds a 1–5 rating into the running average.
    pub fn rate(&self, id: &LawyerId, rating: f32) -> Result<LawyerProfile, DirectoryServiceError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(DirectoryServiceError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        self.directory
            .record_rating(id, rating)
            .map_err(|err| match err {
                RepositoryError::NotFound => DirectoryServiceError::NotFound,
                other => DirectoryServiceError::Repository(other),
            })
    }
}

fn validate_draft(draft: &ProfileDraft) -> Result<(), DirectoryServiceError> {
    require_text(&draft.display_name, "display name")?;
    require_text(&draft.email, "email")?;
    require_text(&draft.description, "description")?;
    if draft.areas_of_practice.is_empty() {
        return Err(invalid("at least one area of practice is required"));
    }
    if draft.languages.iter().all(|language| language.trim().is_empty()) {
        return Err(invalid("at least one language is required"));
    }
    Ok(())
}

fn apply_update(
    profile: &mut LawyerProfile,
    changes: ProfileUpdate,
) -> Result<(), DirectoryServiceError> {
    if let Some(name) = changes.display_name {
        require_text(&name, "display name")?;
        profile.display_name = name.trim().to_string();
    }
    if let Some(email) = changes.email {
        require_text(&email, "email")?;
        profile.email = email.trim().to_string();
    }
    if let Some(description) = changes.description {
        require_text(&description, "description")?;
        profile.description = description.trim().to_string();
    }
    if let Some(areas) = changes.areas_of_practice {
        if areas.is_empty() {
            return Err(invalid("at least one area of practice is required"));
        }
        profile.areas_of_practice = areas;
    }
    if let Some(languages) = changes.languages {
        if languages.iter().all(|language| language.trim().is_empty()) {
            return Err(invalid("at least one language is required"));
        }
        profile.languages = languages;
    }
    if let Some(success_rate) = changes.success_rate {
        if success_rate > 100 {
            return Err(invalid("success rate must be between 0 and 100"));
        }
        profile.success_rate = success_rate;
    }
    if let Some(active) = changes.active {
        profile.active = active;
    }
    if let Some(years) = changes.experience_years {
        profile.experience_years = years;
    }
    if let Some(charge) = changes.starting_charge {
        profile.starting_charge = charge;
    }
    if let Some(availability) = changes.availability {
        profile.availability = availability;
    }
    if let Some(cases) = changes.cases_handled {
        profile.cases_handled = cases;
    }
    if let Some(contact) = changes.contact {
        profile.contact = contact;
    }
    if let Some(certifications) = changes.certifications {
        profile.certifications = certifications;
    }
    Ok(())
}

fn require_text(value: &str, field: &str) -> Result<(), DirectoryServiceError> {
    if value.trim().is_empty() {
        Err(invalid(&format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn invalid(message: &str) -> DirectoryServiceError {
    DirectoryServiceError::Validation(message.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Pro bono lawyer not found")]
    NotFound,
    #[error("You already have a pro bono profile")]
    Conflict,
    #[error("Only lawyers can create pro bono profiles")]
    Forbidden,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
