use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::board::domain::{
    ApplicationRecord, AthleteProfile, DuplicatePolicy, GeoPoint, JobPosting, SavedJobRecord,
    UserId,
};
use crate::board::geocode::{GeocodeError, Geocoder};
use crate::board::memory::InMemoryBoardStore;
use crate::board::repository::{
    ApplicationStore, JobListingStore, ProfileStore, RepositoryError, SavedJobStore,
};
use crate::board::service::JobBoardService;
use crate::config::BoardConfig;

pub(super) fn athlete() -> UserId {
    UserId::new("athlete-42")
}

pub(super) fn cricket_profile() -> AthleteProfile {
    AthleteProfile {
        user_id: athlete(),
        skills: vec!["Cricket".to_string(), "Coaching".to_string()],
        experience_level: "Intermediate".to_string(),
        preferred_location: Some("Bangalore, India".to_string()),
        sport: "Cricket".to_string(),
    }
}

pub(super) fn board_config(policy: DuplicatePolicy) -> BoardConfig {
    BoardConfig {
        seed_reference_jobs: true,
        duplicate_policy: policy,
        jobs_csv: None,
    }
}

/// Geocoder answering from a single known location.
pub(super) struct StaticGeocoder;

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn locate(&self, location: &str) -> Result<GeoPoint, GeocodeError> {
        if location == "Delhi, India" {
            Ok(GeoPoint {
                name: location.to_string(),
                lat: 28.6139,
                lng: 77.209,
            })
        } else {
            Err(GeocodeError::Status("ZERO_RESULTS".to_string()))
        }
    }
}

pub(super) fn build_service(
    policy: DuplicatePolicy,
) -> (
    JobBoardService<InMemoryBoardStore, StaticGeocoder>,
    InMemoryBoardStore,
) {
    let store = InMemoryBoardStore::default();
    let service = JobBoardService::new(
        Arc::new(store.clone()),
        Arc::new(StaticGeocoder),
        &board_config(policy),
    );
    (service, store)
}

/// Store whose every read and write fails.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl JobListingStore for UnavailableStore {
    fn all_jobs(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        offline()
    }
}

impl ProfileStore for UnavailableStore {
    fn profile_for(&self, _user_id: &UserId) -> Result<Option<AthleteProfile>, RepositoryError> {
        offline()
    }
}

impl ApplicationStore for UnavailableStore {
    fn append_application(
        &self,
        _record: ApplicationRecord,
        _policy: DuplicatePolicy,
    ) -> Result<ApplicationRecord, RepositoryError> {
        offline()
    }

    fn applications_for(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        offline()
    }
}

impl SavedJobStore for UnavailableStore {
    fn append_saved(
        &self,
        _record: SavedJobRecord,
        _policy: DuplicatePolicy,
    ) -> Result<SavedJobRecord, RepositoryError> {
        offline()
    }

    fn saved_for(&self, _user_id: &UserId) -> Result<Vec<SavedJobRecord>, RepositoryError> {
        offline()
    }
}

/// Listings load, but user records are unreachable.
pub(super) struct RecordsOfflineStore {
    pub(super) listings: InMemoryBoardStore,
}

impl JobListingStore for RecordsOfflineStore {
    fn all_jobs(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        self.listings.all_jobs()
    }
}

impl ProfileStore for RecordsOfflineStore {
    fn profile_for(&self, user_id: &UserId) -> Result<Option<AthleteProfile>, RepositoryError> {
        self.listings.profile_for(user_id)
    }
}

impl ApplicationStore for RecordsOfflineStore {
    fn append_application(
        &self,
        _record: ApplicationRecord,
        _policy: DuplicatePolicy,
    ) -> Result<ApplicationRecord, RepositoryError> {
        offline()
    }

    fn applications_for(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        offline()
    }
}

impl SavedJobStore for RecordsOfflineStore {
    fn append_saved(
        &self,
        _record: SavedJobRecord,
        _policy: DuplicatePolicy,
    ) -> Result<SavedJobRecord, RepositoryError> {
        offline()
    }

    fn saved_for(&self, _user_id: &UserId) -> Result<Vec<SavedJobRecord>, RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
