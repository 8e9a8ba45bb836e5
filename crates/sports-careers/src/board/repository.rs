use super::domain::{
    ApplicationRecord, AthleteProfile, DuplicatePolicy, JobPosting, SavedJobRecord, UserId,
};

/// Read access to the published listings.
pub trait JobListingStore: Send + Sync {
    fn all_jobs(&self) -> Result<Vec<JobPosting>, RepositoryError>;
}

/// Per-user athlete profiles.
pub trait ProfileStore: Send + Sync {
    fn profile_for(&self, user_id: &UserId) -> Result<Option<AthleteProfile>, RepositoryError>;
}

/// Append-only application records.
///
/// Under [`DuplicatePolicy::Reject`] the append fails with
/// [`RepositoryError::Conflict`] when the user already has a record for the
/// job; the check and the write are one atomic step.
pub trait ApplicationStore: Send + Sync {
    fn append_application(
        &self,
        record: ApplicationRecord,
        policy: DuplicatePolicy,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn applications_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Append-only saved-job records, with the same duplicate contract as
/// [`ApplicationStore`].
pub trait SavedJobStore: Send + Sync {
    fn append_saved(
        &self,
        record: SavedJobRecord,
        policy: DuplicatePolicy,
    ) -> Result<SavedJobRecord, RepositoryError>;
    fn saved_for(&self, user_id: &UserId) -> Result<Vec<SavedJobRecord>, RepositoryError>;
}

/// Convenience bound for a backend implementing every port.
pub trait BoardStore: JobListingStore + ProfileStore + ApplicationStore + SavedJobStore {}

impl<T> BoardStore for T where
    T: JobListingStore + ProfileStore + ApplicationStore + SavedJobStore
{
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
