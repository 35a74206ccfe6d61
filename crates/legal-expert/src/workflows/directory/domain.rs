use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::domain::{AreaOfLaw, UserId};

/// Identifier wrapper for pro-bono directory entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LawyerId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Weekdays,
    Weekends,
    Both,
}

impl Availability {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekdays" => Some(Self::Weekdays),
            "weekends" => Some(Self::Weekends),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

/// A lawyer offering pro-bono work, linked to the account that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerProfile {
    pub id: LawyerId,
    pub owner: UserId,
    pub display_name: String,
    pub email: String,
    pub active: bool,
    pub experience_years: u16,
    pub areas_of_practice: Vec<AreaOfLaw>,
    /// Running average of received ratings, 0 when unrated.
    pub rating: f32,
    pub total_ratings: u32,
    pub starting_charge: u32,
    pub description: String,
    pub availability: Availability,
    pub languages: Vec<String>,
    pub success_rate: u8,
    pub cases_handled: u32,
    pub contact: ContactInfo,
    pub certifications: Vec<Certification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LawyerProfile {
    pub fn practices(&self, area: AreaOfLaw) -> bool {
        self.areas_of_practice.contains(&area)
    }

    /// Case-insensitive match over practice areas, languages and description.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_query(&self, needle: &str) -> bool {
        self.areas_of_practice
            .iter()
            .any(|area| area.label().to_lowercase().contains(needle))
            || self
                .languages
                .iter()
                .any(|language| language.to_lowercase().contains(needle))
            || self.description.to_lowercase().contains(needle)
    }

    pub fn record_rating(&mut self, rating: f32) {
        let total = self.total_ratings as f32;
        self.rating = (self.rating * total + rating) / (total + 1.0);
        self.total_ratings += 1;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> LawyerSummary {
        LawyerSummary {
            id: self.id.clone(),
            name: self.display_name.clone(),
            email: self.email.clone(),
            rating: self.rating,
            experience: self.experience_years,
            areas_of_practice: self.areas_of_practice.clone(),
        }
    }
}

/// Display projection attached to case analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawyerSummary {
    pub id: LawyerId,
    pub name: String,
    pub email: String,
    pub rating: f32,
    pub experience: u16,
    pub areas_of_practice: Vec<AreaOfLaw>,
}

/// Payload used to create a directory profile for the calling account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub display_name: String,
    pub email: String,
    pub experience_years: u16,
    pub areas_of_practice: Vec<AreaOfLaw>,
    pub starting_charge: u32,
    pub description: String,
    pub availability: Availability,
    pub languages: Vec<String>,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub certifications: Vec<Certification>,
}

/// Partial update of an existing profile. Rating fields and ownership are not editable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
    pub experience_years: Option<u16>,
    pub areas_of_practice: Option<Vec<AreaOfLaw>>,
    pub starting_charge: Option<u32>,
    pub description: Option<String>,
    pub availability: Option<Availability>,
    pub languages: Option<Vec<String>>,
    pub success_rate: Option<u8>,
    pub cases_handled: Option<u32>,
    pub contact: Option<ContactInfo>,
    pub certifications: Option<Vec<Certification>>,
}

/// Keeps active entries practicing `area`, highest rated first, at most `limit`.
pub fn rank_for_area<I>(profiles: I, area: AreaOfLaw, limit: usize) -> Vec<LawyerProfile>
where
    I: IntoIterator<Item = LawyerProfile>,
{
    let mut matching: Vec<LawyerProfile> = profiles
        .into_iter()
        .filter(|profile| profile.active && profile.practices(area))
        .collect();
    sort_by_rating(&mut matching);
    matching.truncate(limit);
    matching
}

pub(crate) fn sort_by_rating(profiles: &mut [LawyerProfile]) {
    profiles.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}
