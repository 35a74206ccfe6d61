use async_trait::async_trait;
use chrono::Utc;
use legal_expert::workflows::analysis::{AnalysisRepository, CaseAnalysis, CaseAnalysisId};
use legal_expert::workflows::directory::{
    rank_for_area, Availability, ContactInfo, LawyerDirectory, LawyerId, LawyerProfile,
    next_lawyer_id,
};
use legal_expert::workflows::model::{
    ChatCompletionClient, ChatCompletionRequest, CompletionError,
};
use legal_expert::workflows::{AreaOfLaw, RepositoryError, UserId};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLawyerDirectory {
    profiles: Arc<Mutex<HashMap<LawyerId, LawyerProfile>>>,
}

impl InMemoryLawyerDirectory {
    pub(crate) fn seeded(profiles: Vec<LawyerProfile>) -> Result<Self, RepositoryError> {
        let directory = Self::default();
        for profile in profiles {
            directory.insert(profile)?;
        }
        Ok(directory)
    }

    pub(crate) fn len(&self) -> usize {
        self.guard().len()
    }

    // Writers never panic mid-update, so a poisoned map is still consistent.
    fn guard(&self) -> MutexGuard<'_, HashMap<LawyerId, LawyerProfile>> {
        self.profiles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LawyerDirectory for InMemoryLawyerDirectory {
    fn insert(&self, profile: LawyerProfile) -> Result<LawyerProfile, RepositoryError> {
        let mut guard = self.guard();
        if guard.contains_key(&profile.id)
            || guard.values().any(|existing| existing.owner == profile.owner)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: LawyerProfile) -> Result<(), RepositoryError> {
        let mut guard = self.guard();
        if guard.contains_key(&profile.id) {
            guard.insert(profile.id.clone(), profile);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn remove(&self, id: &LawyerId) -> Result<(), RepositoryError> {
        let mut guard = self.guard();
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn record_rating(&self, id: &LawyerId, rating: f32) -> Result<LawyerProfile, RepositoryError> {
        let mut guard = self.guard();
        let profile = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        profile.record_rating(rating);
        Ok(profile.clone())
    }

    fn fetch(&self, id: &LawyerId) -> Result<Option<LawyerProfile>, RepositoryError> {
        let guard = self.guard();
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_owner(&self, owner: &UserId) -> Result<Option<LawyerProfile>, RepositoryError> {
        let guard = self.guard();
        Ok(guard
            .values()
            .find(|profile| &profile.owner == owner)
            .cloned())
    }

    fn active(&self) -> Result<Vec<LawyerProfile>, RepositoryError> {
        let guard = self.guard();
        let mut active: Vec<LawyerProfile> = guard
            .values()
            .filter(|profile| profile.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(active)
    }

    fn top_rated_for(
        &self,
        area: AreaOfLaw,
        limit: usize,
    ) -> Result<Vec<LawyerProfile>, RepositoryError> {
        let guard = self.guard();
        Ok(rank_for_area(guard.values().cloned(), area, limit))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAnalysisRepository {
    records: Arc<Mutex<Vec<CaseAnalysis>>>,
}

impl InMemoryAnalysisRepository {
    fn guard(&self) -> MutexGuard<'_, Vec<CaseAnalysis>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AnalysisRepository for InMemoryAnalysisRepository {
    fn insert(&self, analysis: CaseAnalysis) -> Result<CaseAnalysis, RepositoryError> {
        let mut guard = self.guard();
        if guard.iter().any(|existing| existing.id == analysis.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(analysis.clone());
        Ok(analysis)
    }

    fn fetch(&self, id: &CaseAnalysisId) -> Result<Option<CaseAnalysis>, RepositoryError> {
        let guard = self.guard();
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn for_owner(&self, owner: &UserId) -> Result<Vec<CaseAnalysis>, RepositoryError> {
        let guard = self.guard();
        Ok(guard
            .iter()
            .rev()
            .filter(|record| &record.user == owner)
            .cloned()
            .collect())
    }
}

/// Offline stand-in for the hosted model: every prompt gets the same reply.
pub(crate) struct CannedCompletion {
    reply: String,
}

impl CannedCompletion {
    pub(crate) fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ChatCompletionClient for CannedCompletion {
    async fn complete(&self, _request: ChatCompletionRequest) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }
}

/// Small directory used by the demo when no CSV export is supplied.
pub(crate) fn demo_directory() -> Vec<LawyerProfile> {
    [
        (
            "demo-owner-1",
            "Rosa Delgado",
            vec![AreaOfLaw::Civil, AreaOfLaw::Family],
            4.8,
            14,
            "Tenancy deposits, custody and small claims",
            vec!["English", "Spanish"],
        ),
        (
            "demo-owner-2",
            "Tomasz Nowak",
            vec![AreaOfLaw::Civil],
            4.2,
            6,
            "Consumer disputes and neighbour conflicts",
            vec!["English", "Polish"],
        ),
        (
            "demo-owner-3",
            "Grace Mensah",
            vec![AreaOfLaw::Criminal],
            4.6,
            11,
            "Defence counsel for first-time offenders",
            vec!["English"],
        ),
        (
            "demo-owner-4",
            "Hugo Laurent",
            vec![AreaOfLaw::Corporate, AreaOfLaw::Tax],
            3.9,
            8,
            "Small business formation and tax appeals",
            vec!["English", "French"],
        ),
    ]
    .into_iter()
    .map(
        |(owner, name, areas, rating, experience, description, languages)| {
            let now = Utc::now();
            let email = format!(
                "{}@probono.example",
                name.to_lowercase().replace(' ', ".")
            );
            LawyerProfile {
                id: next_lawyer_id(),
                owner: UserId(owner.to_string()),
                display_name: name.to_string(),
                email: email.clone(),
                active: true,
                experience_years: experience,
                areas_of_practice: areas,
                rating,
                total_ratings: 12,
                starting_charge: 0,
                description: description.to_string(),
                availability: Availability::Both,
                languages: languages.into_iter().map(str::to_string).collect(),
                success_rate: 0,
                cases_handled: 0,
                contact: ContactInfo {
                    email: Some(email),
                    ..ContactInfo::default()
                },
                certifications: Vec::new(),
                created_at: now,
                updated_at: now,
            }
        },
    )
    .collect()
}
