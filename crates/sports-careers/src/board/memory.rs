use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    ApplicationRecord, AthleteProfile, DuplicatePolicy, JobPosting, SavedJobRecord, UserId,
};
use super::repository::{
    ApplicationStore, JobListingStore, ProfileStore, RepositoryError, SavedJobStore,
};

#[derive(Default)]
struct Collections {
    jobs: Vec<JobPosting>,
    profiles: HashMap<UserId, AthleteProfile>,
    applications: Vec<ApplicationRecord>,
    saved: Vec<SavedJobRecord>,
}

/// Process-local document store backing every board port.
///
/// Clones share the same collections.
#[derive(Default, Clone)]
pub struct InMemoryBoardStore {
    inner: Arc<Mutex<Collections>>,
}

impl InMemoryBoardStore {
    pub fn with_jobs(jobs: Vec<JobPosting>) -> Self {
        let store = Self::default();
        store.lock().jobs = jobs;
        store
    }

    pub fn insert_job(&self, job: JobPosting) {
        self.lock().jobs.push(job);
    }

    pub fn put_profile(&self, profile: AthleteProfile) {
        self.lock()
            .profiles
            .insert(profile.user_id.clone(), profile);
    }

    pub fn application_count(&self) -> usize {
        self.lock().applications.len()
    }

    pub fn saved_count(&self) -> usize {
        self.lock().saved.len()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // a poisoned guard still holds consistent append-only data
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JobListingStore for InMemoryBoardStore {
    fn all_jobs(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        Ok(self.lock().jobs.clone())
    }
}

impl ProfileStore for InMemoryBoardStore {
    fn profile_for(&self, user_id: &UserId) -> Result<Option<AthleteProfile>, RepositoryError> {
        Ok(self.lock().profiles.get(user_id).cloned())
    }
}

impl ApplicationStore for InMemoryBoardStore {
    fn append_application(
        &self,
        record: ApplicationRecord,
        policy: DuplicatePolicy,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut collections = self.lock();
        if policy == DuplicatePolicy::Reject
            && collections
                .applications
                .iter()
                .any(|existing| {
                    existing.user_id == record.user_id && existing.job_id == record.job_id
                })
        {
            return Err(RepositoryError::Conflict);
        }
        collections.applications.push(record.clone());
        Ok(record)
    }

    fn applications_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .lock()
            .applications
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl SavedJobStore for InMemoryBoardStore {
    fn append_saved(
        &self,
        record: SavedJobRecord,
        policy: DuplicatePolicy,
    ) -> Result<SavedJobRecord, RepositoryError> {
        let mut collections = self.lock();
        if policy == DuplicatePolicy::Reject
            && collections
                .saved
                .iter()
                .any(|existing| {
                    existing.user_id == record.user_id && existing.job_id == record.job_id
                })
        {
            return Err(RepositoryError::Conflict);
        }
        collections.saved.push(record.clone());
        Ok(record)
    }

    fn saved_for(&self, user_id: &UserId) -> Result<Vec<SavedJobRecord>, RepositoryError> {
        Ok(self
            .lock()
            .saved
            .iter()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::domain::JobId;
    use chrono::{TimeZone, Utc};
    use std::sync::Barrier;

    fn saved(user: &str, job: &str) -> SavedJobRecord {
        SavedJobRecord {
            job_id: JobId::new(job),
            user_id: UserId::new(user),
            saved_at: Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn append_policy_stores_every_record() {
        let store = InMemoryBoardStore::default();
        for _ in 0..2 {
            store
                .append_saved(saved("athlete-1", "1"), DuplicatePolicy::Append)
                .expect("append succeeds");
        }
        assert_eq!(store.saved_count(), 2);
    }

    #[test]
    fn reject_policy_conflicts_per_user_and_job() {
        let store = InMemoryBoardStore::default();
        store
            .append_saved(saved("athlete-1", "1"), DuplicatePolicy::Reject)
            .expect("first save");
        assert!(matches!(
            store.append_saved(saved("athlete-1", "1"), DuplicatePolicy::Reject),
            Err(RepositoryError::Conflict)
        ));
        store
            .append_saved(saved("athlete-2", "1"), DuplicatePolicy::Reject)
            .expect("other user may save the same job");
        store
            .append_saved(saved("athlete-1", "2"), DuplicatePolicy::Reject)
            .expect("same user may save another job");
        assert_eq!(store.saved_count(), 3);
    }

    #[test]
    fn concurrent_rejecting_applications_store_one_record() {
        let store = InMemoryBoardStore::default();
        let threads = 8;
        let barrier = Barrier::new(threads);
        let record = ApplicationRecord {
            job_id: JobId::new("3"),
            user_id: UserId::new("athlete-1"),
            athlete_profile: crate::board::catalog::default_profile()
                .for_user(UserId::new("athlete-1")),
            applied_at: Utc.with_ymd_and_hms(2025, 4, 2, 9, 0, 0).unwrap(),
        };

        let accepted = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        store
                            .append_application(record.clone(), DuplicatePolicy::Reject)
                            .is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread joins"))
                .filter(|stored| *stored)
                .count()
        });

        assert_eq!(accepted, 1);
        assert_eq!(store.application_count(), 1);
    }
}
