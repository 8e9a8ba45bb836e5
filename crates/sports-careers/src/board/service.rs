use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::{default_profile, reference_jobs};
use super::domain::{
    ApplicationRecord, AthleteProfile, BoardAction, DuplicatePolicy, GeoPoint, JobId, JobPosting,
    SavedJobRecord, UserId,
};
use super::geocode::{GeocodeError, Geocoder};
use super::page::ApplyDraft;
use super::repository::{BoardStore, RepositoryError};
use crate::config::BoardConfig;

/// Everything a page needs after a load. Read failures become warnings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardSnapshot {
    pub jobs: Vec<JobPosting>,
    pub profile: Option<AthleteProfile>,
    pub applications: Vec<ApplicationRecord>,
    pub saved: Vec<SavedJobRecord>,
    pub warnings: Vec<String>,
}

/// Service composing the record stores, listing catalog and geocoder.
pub struct JobBoardService<S, G> {
    store: Arc<S>,
    geocoder: Arc<G>,
    seed_reference_jobs: bool,
    duplicate_policy: DuplicatePolicy,
}

impl<S, G> JobBoardService<S, G>
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    pub fn new(store: Arc<S>, geocoder: Arc<G>, config: &BoardConfig) -> Self {
        Self {
            store,
            geocoder,
            seed_reference_jobs: config.seed_reference_jobs,
            duplicate_policy: config.duplicate_policy,
        }
    }

    /// Reference listings (when seeded) followed by the stored ones.
    pub fn listings(&self) -> Result<Vec<JobPosting>, BoardServiceError> {
        let stored = self.store.all_jobs()?;
        let mut jobs = if self.seed_reference_jobs {
            reference_jobs()
        } else {
            Vec::new()
        };
        jobs.extend(stored);
        Ok(jobs)
    }

    pub fn job(&self, job_id: &JobId) -> Result<JobPosting, BoardServiceError> {
        self.listings()?
            .into_iter()
            .find(|job| &job.id == job_id)
            .ok_or_else(|| BoardServiceError::UnknownJob(job_id.clone()))
    }

    /// Stored profile for the user, or the default profile keyed to them.
    pub fn profile(&self, identity: Option<&UserId>) -> Result<AthleteProfile, BoardServiceError> {
        match identity {
            Some(user_id) => Ok(self
                .store
                .profile_for(user_id)?
                .unwrap_or_else(|| default_profile().for_user(user_id.clone()))),
            None => Ok(default_profile()),
        }
    }

    /// Fetches listings and, for a signed-in user, their profile and records.
    ///
    /// Never fails: each read failure is logged and the snapshot carries
    /// whatever did load.
    pub fn load(&self, identity: Option<&UserId>) -> BoardSnapshot {
        let mut snapshot = BoardSnapshot::default();

        match self.listings() {
            Ok(jobs) => snapshot.jobs = jobs,
            Err(err) => {
                warn!(error = %err, "failed to fetch jobs");
                if self.seed_reference_jobs {
                    snapshot.jobs = reference_jobs();
                }
                snapshot.warnings.push(format!("jobs: {err}"));
            }
        }

        let Some(user_id) = identity else {
            return snapshot;
        };

        match self.store.profile_for(user_id) {
            Ok(profile) => snapshot.profile = profile,
            Err(err) => {
                warn!(%user_id, error = %err, "failed to fetch athlete profile");
                snapshot.warnings.push(format!("profile: {err}"));
            }
        }
        match self.store.applications_for(user_id) {
            Ok(records) => snapshot.applications = records,
            Err(err) => {
                warn!(%user_id, error = %err, "failed to fetch applications");
                snapshot.warnings.push(format!("applications: {err}"));
            }
        }
        match self.store.saved_for(user_id) {
            Ok(records) => snapshot.saved = records,
            Err(err) => {
                warn!(%user_id, error = %err, "failed to fetch saved jobs");
                snapshot.warnings.push(format!("saved jobs: {err}"));
            }
        }

        snapshot
    }

    /// Opens an editable copy of the user's profile for an application.
    pub fn begin_application(
        &self,
        identity: Option<&UserId>,
        job_id: &JobId,
    ) -> Result<ApplyDraft, BoardServiceError> {
        let user_id = require_identity(identity, BoardAction::Apply)?;
        let job = self.job(job_id)?;
        let profile = self.profile(Some(user_id))?;
        Ok(ApplyDraft {
            job_id: job.id,
            profile,
        })
    }

    /// Appends an application carrying the (possibly edited) profile snapshot.
    pub fn confirm_application(
        &self,
        identity: Option<&UserId>,
        job_id: &JobId,
        profile: AthleteProfile,
    ) -> Result<ApplicationRecord, BoardServiceError> {
        let user_id = require_identity(identity, BoardAction::Apply)?;
        let job = self.job(job_id)?;

        let record = ApplicationRecord {
            job_id: job.id.clone(),
            user_id: user_id.clone(),
            athlete_profile: profile.for_user(user_id.clone()),
            applied_at: Utc::now(),
        };
        let stored = self
            .store
            .append_application(record, self.duplicate_policy)
            .map_err(|err| match err {
                RepositoryError::Conflict => BoardServiceError::AlreadyApplied(job.id),
                other => other.into(),
            })?;
        info!(%user_id, job_id = %stored.job_id, "application submitted");
        Ok(stored)
    }

    pub fn save_job(
        &self,
        identity: Option<&UserId>,
        job_id: &JobId,
    ) -> Result<SavedJobRecord, BoardServiceError> {
        let user_id = require_identity(identity, BoardAction::Save)?;
        let job = self.job(job_id)?;

        let record = SavedJobRecord {
            job_id: job.id.clone(),
            user_id: user_id.clone(),
            saved_at: Utc::now(),
        };
        let stored = self
            .store
            .append_saved(record, self.duplicate_policy)
            .map_err(|err| match err {
                RepositoryError::Conflict => BoardServiceError::AlreadySaved(job.id),
                other => other.into(),
            })?;
        info!(%user_id, job_id = %stored.job_id, "job saved");
        Ok(stored)
    }

    pub fn applications(
        &self,
        identity: Option<&UserId>,
    ) -> Result<Vec<ApplicationRecord>, BoardServiceError> {
        let user_id = require_identity(identity, BoardAction::Apply)?;
        Ok(self.store.applications_for(user_id)?)
    }

    pub fn saved_jobs(
        &self,
        identity: Option<&UserId>,
    ) -> Result<Vec<SavedJobRecord>, BoardServiceError> {
        let user_id = require_identity(identity, BoardAction::Save)?;
        Ok(self.store.saved_for(user_id)?)
    }

    pub async fn locate(&self, location: &str) -> Result<GeoPoint, BoardServiceError> {
        let point = self.geocoder.locate(location).await?;
        Ok(point)
    }
}

fn require_identity(
    identity: Option<&UserId>,
    action: BoardAction,
) -> Result<&UserId, BoardServiceError> {
    identity.ok_or(BoardServiceError::Unauthenticated(action))
}

/// Error raised by the job board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardServiceError {
    #[error("{}", .0.login_prompt())]
    Unauthenticated(BoardAction),
    #[error("job {0} not found")]
    UnknownJob(JobId),
    #[error("already applied to job {0}")]
    AlreadyApplied(JobId),
    #[error("job {0} is already saved")]
    AlreadySaved(JobId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

impl BoardServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoardServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            BoardServiceError::UnknownJob(_) => StatusCode::NOT_FOUND,
            BoardServiceError::AlreadyApplied(_)
            | BoardServiceError::AlreadySaved(_)
            | BoardServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            BoardServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            BoardServiceError::Geocode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message for the person who triggered the action.
    pub fn user_message(&self) -> String {
        match self {
            BoardServiceError::Repository(_) => {
                "Failed to complete the request. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
