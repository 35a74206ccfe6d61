//! In-memory fakes shared by the workflow unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::analysis::{AnalysisRepository, CaseAnalysis, CaseAnalysisId};
use super::directory::domain::sort_by_rating;
use super::directory::{
    rank_for_area, Availability, ContactInfo, LawyerDirectory, LawyerId, LawyerProfile,
    ProfileDraft,
};
use super::domain::{AreaOfLaw, RepositoryError, UserId};
use super::model::{ChatCompletionClient, ChatCompletionRequest, CompletionError};

pub(crate) fn lawyer(id: &str, area: AreaOfLaw, rating: f32) -> LawyerProfile {
    let now = Utc::now();
    LawyerProfile {
        id: LawyerId(id.to_string()),
        owner: UserId(format!("owner-{id}")),
        display_name: format!("Counsel {id}"),
        email: format!("{id}@probono.example"),
        active: true,
        experience_years: 6,
        areas_of_practice: vec![area],
        rating,
        total_ratings: 1,
        starting_charge: 0,
        description: "General practice".to_string(),
        availability: Availability::Both,
        languages: vec!["English".to_string()],
        success_rate: 70,
        cases_handled: 25,
        contact: ContactInfo::default(),
        certifications: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn draft() -> ProfileDraft {
    ProfileDraft {
        display_name: "Mira Okafor".to_string(),
        email: "mira@probono.example".to_string(),
        experience_years: 9,
        areas_of_practice: vec![AreaOfLaw::Family, AreaOfLaw::Civil],
        starting_charge: 0,
        description: "Custody and tenancy disputes".to_string(),
        availability: Availability::Weekends,
        languages: vec!["English".to_string(), "Igbo".to_string()],
        contact: ContactInfo::default(),
        certifications: Vec::new(),
    }
}

#[derive(Default)]
pub(crate) struct MemoryDirectory {
    profiles: Mutex<HashMap<LawyerId, LawyerProfile>>,
}

impl MemoryDirectory {
    pub(crate) fn with_profiles(profiles: Vec<LawyerProfile>) -> Self {
        Self {
            profiles: Mutex::new(
                profiles
                    .into_iter()
                    .map(|profile| (profile.id.clone(), profile))
                    .collect(),
            ),
        }
    }
}

impl LawyerDirectory for MemoryDirectory {
    fn insert(&self, profile: LawyerProfile) -> Result<LawyerProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: LawyerProfile) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        match guard.get_mut(&profile.id) {
            Some(existing) => {
                *existing = profile;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn remove(&self, id: &LawyerId) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch(&self, id: &LawyerId) -> Result<Option<LawyerProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn record_rating(&self, id: &LawyerId, rating: f32) -> Result<LawyerProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        let profile = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        profile.record_rating(rating);
        Ok(profile.clone())
    }

    fn fetch_by_owner(&self, owner: &UserId) -> Result<Option<LawyerProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        Ok(guard.values().find(|profile| &profile.owner == owner).cloned())
    }

    fn active(&self) -> Result<Vec<LawyerProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        let mut active: Vec<LawyerProfile> =
            guard.values().filter(|profile| profile.active).cloned().collect();
        sort_by_rating(&mut active);
        Ok(active)
    }

    fn top_rated_for(
        &self,
        area: AreaOfLaw,
        limit: usize,
    ) -> Result<Vec<LawyerProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        Ok(rank_for_area(guard.values().cloned(), area, limit))
    }
}

#[derive(Default)]
pub(crate) struct MemoryAnalyses {
    records: Mutex<Vec<CaseAnalysis>>,
}

impl MemoryAnalyses {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("analysis mutex poisoned").len()
    }
}

impl AnalysisRepository for MemoryAnalyses {
    fn insert(&self, analysis: CaseAnalysis) -> Result<CaseAnalysis, RepositoryError> {
        let mut guard = self.records.lock().expect("analysis mutex poisoned");
        if guard.iter().any(|existing| existing.id == analysis.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(analysis.clone());
        Ok(analysis)
    }

    fn fetch(&self, id: &CaseAnalysisId) -> Result<Option<CaseAnalysis>, RepositoryError> {
        let guard = self.records.lock().expect("analysis mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn for_owner(&self, owner: &UserId) -> Result<Vec<CaseAnalysis>, RepositoryError> {
        let guard = self.records.lock().expect("analysis mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .filter(|record| &record.user == owner)
            .cloned()
            .collect())
    }
}

/// Chat model stand-in that returns a fixed reply, or fails, and counts calls.
pub(crate) struct ScriptedCompletion {
    reply: Option<String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatCompletionRequest>>,
}

impl ScriptedCompletion {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_request(&self) -> Option<ChatCompletionRequest> {
        self.last_request
            .lock()
            .expect("request mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl ChatCompletionClient for ScriptedCompletion {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("request mutex poisoned") = Some(request);
        self.reply
            .clone()
            .ok_or(CompletionError::Status { status: 503 })
    }
}
