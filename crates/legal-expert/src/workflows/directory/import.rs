use std::io::Read;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Deserializer};

use super::domain::{Availability, ContactInfo, LawyerProfile};
use super::service::{next_lawyer_id, MAX_RATING};
use crate::workflows::domain::{AreaOfLaw, UserId};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryImportError {
    #[error("failed to read directory export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid directory CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    Row { row: usize, message: String },
}

/// Loads directory profiles from a CSV export.
///
/// Expected header:
/// `owner_id,name,email,experience,areas,starting_charge,description,availability,languages,rating,total_ratings,active`
/// where `areas` and `languages` are `;`-separated.
pub struct DirectoryImporter;

impl DirectoryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LawyerProfile>, DirectoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<LawyerProfile>, DirectoryImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut profiles = Vec::new();

        for (index, record) in csv_reader.deserialize::<DirectoryRow>().enumerate() {
            let row = record?;
            // header is line 1
            profiles.push(row.into_profile(index + 2)?);
        }

        Ok(profiles)
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    owner_id: String,
    name: String,
    email: String,
    experience: u16,
    areas: String,
    starting_charge: u32,
    description: String,
    availability: String,
    #[serde(default)]
    languages: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rating: Option<f32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    total_ratings: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<bool>,
}

impl DirectoryRow {
    fn into_profile(self, row: usize) -> Result<LawyerProfile, DirectoryImportError> {
        let fail = |message: String| DirectoryImportError::Row { row, message };

        if self.owner_id.is_empty() || self.name.is_empty() {
            return Err(fail("owner_id and name are required".to_string()));
        }

        let areas_of_practice = split_list(&self.areas)
            .map(|label| {
                AreaOfLaw::parse(label).ok_or_else(|| fail(format!("unknown area of law '{label}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if areas_of_practice.is_empty() {
            return Err(fail("at least one area of practice is required".to_string()));
        }

        let availability = Availability::parse(&self.availability)
            .ok_or_else(|| fail(format!("unknown availability '{}'", self.availability)))?;

        let rating = self.rating.unwrap_or(0.0);
        if !(0.0..=MAX_RATING).contains(&rating) {
            return Err(fail(format!("rating {rating} outside 0-5")));
        }

        let now = Utc::now();
        Ok(LawyerProfile {
            id: next_lawyer_id(),
            owner: UserId(self.owner_id),
            display_name: self.name,
            email: self.email.clone(),
            active: self.active.unwrap_or(true),
            experience_years: self.experience,
            areas_of_practice,
            rating,
            total_ratings: self.total_ratings.unwrap_or(0),
            starting_charge: self.starting_charge,
            description: self.description,
            availability,
            languages: split_list(&self.languages).map(str::to_string).collect(),
            success_rate: 0,
            cases_handled: 0,
            contact: ContactInfo {
                email: Some(self.email).filter(|email| !email.is_empty()),
                ..ContactInfo::default()
            },
            certifications: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|item| !item.is_empty())
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
