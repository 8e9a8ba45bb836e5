//! Job board for the sports-careers platform: listings, recommendation
//! scoring, the page state container, record stores and geocoding.

pub mod catalog;
pub mod domain;
pub mod geocode;
pub mod matching;
pub mod memory;
pub mod page;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{default_profile, reference_jobs, CatalogImportError, CatalogImporter};
pub use domain::{
    ApplicationRecord, AthleteProfile, BoardAction, DuplicatePolicy, GeoPoint, JobId, JobPosting,
    SavedJobRecord, UnknownDuplicatePolicy, UserId,
};
pub use geocode::{GeocodeError, Geocoder, HttpGeocoder};
pub use matching::{filter, match_score, recommend, Facet, FacetOptions, JobQuery, ScoredJob};
pub use memory::InMemoryBoardStore;
pub use page::{ApplyDraft, BoardTab, JobBoardPage, Notice, NoticeKind, PageEvent, ProfileEdit};
pub use repository::{
    ApplicationStore, BoardStore, JobListingStore, ProfileStore, RepositoryError, SavedJobStore,
};
pub use router::{board_router, USER_HEADER};
pub use service::{BoardServiceError, BoardSnapshot, JobBoardService};
pub use session::BoardSession;
