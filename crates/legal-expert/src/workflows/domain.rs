use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the account that owns a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role carried in the session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Public,
    Lawyer,
}

/// Practice areas used both for case weighting and for directory filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaOfLaw {
    Criminal,
    Civil,
    Corporate,
    Family,
    #[serde(rename = "Intellectual Property")]
    IntellectualProperty,
    Tax,
    Other,
}

impl AreaOfLaw {
    pub const ALL: [AreaOfLaw; 7] = [
        AreaOfLaw::Criminal,
        AreaOfLaw::Civil,
        AreaOfLaw::Corporate,
        AreaOfLaw::Family,
        AreaOfLaw::IntellectualProperty,
        AreaOfLaw::Tax,
        AreaOfLaw::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AreaOfLaw::Criminal => "Criminal",
            AreaOfLaw::Civil => "Civil",
            AreaOfLaw::Corporate => "Corporate",
            AreaOfLaw::Family => "Family",
            AreaOfLaw::IntellectualProperty => "Intellectual Property",
            AreaOfLaw::Tax => "Tax",
            AreaOfLaw::Other => "Other",
        }
    }

    /// Matches the exact wire label; anything else is not a practice area.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|area| area.label() == raw)
    }
}

impl fmt::Display for AreaOfLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error enumeration for store failures shared by every workflow repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
