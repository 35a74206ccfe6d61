//! Pro-bono lawyer directory: profiles, ratings and the ranked lookup used
//! to suggest lawyers on case analyses.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    rank_for_area, Availability, Certification, ContactInfo, LawyerId, LawyerProfile,
    LawyerSummary, ProfileDraft, ProfileUpdate,
};
pub use import::{DirectoryImportError, DirectoryImporter};
pub use repository::LawyerDirectory;
pub use router::directory_router;
pub use service::{next_lawyer_id, DirectoryServiceError, ProBonoDirectoryService};
