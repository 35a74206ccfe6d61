pub mod analysis;
pub mod directory;
pub mod domain;
pub mod model;
pub mod triage;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::{AreaOfLaw, RepositoryError, Role, UserId};
