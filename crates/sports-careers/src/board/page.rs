//! Explicit state container for one job board page.
//!
//! State only changes through [`JobBoardPage::apply`], a pure
//! `old state x event -> new state` transition. Applied and saved job sets are
//! projections of the record lists and are never stored separately.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::default_profile;
use super::domain::{
    ApplicationRecord, AthleteProfile, BoardAction, GeoPoint, JobId, JobPosting, SavedJobRecord,
    UserId,
};
use super::matching::{self, Facet, FacetOptions, JobQuery, ScoredJob};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardTab {
    #[default]
    Browse,
    Recommended,
    Applied,
    Saved,
}

/// Editable copy of the profile opened for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyDraft {
    pub job_id: JobId,
    pub profile: AthleteProfile,
}

/// Single-field edit made to an [`ApplyDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEdit {
    Skills(Vec<String>),
    ExperienceLevel(String),
    PreferredLocation(Option<String>),
    Sport(String),
}

impl ProfileEdit {
    /// Skills typed as a comma separated line.
    pub fn skills_from_text(raw: &str) -> Self {
        Self::Skills(
            raw.split(',')
                .map(str::trim)
                .filter(|skill| !skill.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    fn apply_to(self, profile: &mut AthleteProfile) {
        match self {
            ProfileEdit::Skills(skills) => profile.skills = skills,
            ProfileEdit::ExperienceLevel(level) => profile.experience_level = level,
            ProfileEdit::PreferredLocation(location) => profile.preferred_location = location,
            ProfileEdit::Sport(sport) => profile.sport = sport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Error,
}

/// Last user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Named transitions accepted by the page.
#[derive(Debug, Clone)]
pub enum PageEvent {
    SignedIn(UserId),
    SignedOut,
    /// Starts a new load generation; results stamped with older ones are dropped.
    LoadStarted,
    JobsLoaded {
        generation: u64,
        jobs: Vec<JobPosting>,
    },
    UserDataLoaded {
        generation: u64,
        profile: Option<AthleteProfile>,
        applications: Vec<ApplicationRecord>,
        saved: Vec<SavedJobRecord>,
    },
    SearchChanged(String),
    FacetToggled {
        facet: Facet,
        value: String,
    },
    TabSelected(BoardTab),
    JobSelected(JobId),
    ApplyOpened(JobId),
    ProfileEdited(ProfileEdit),
    ApplyCancelled,
    ApplicationSubmitted(ApplicationRecord),
    JobSaved(SavedJobRecord),
    MapOpened(GeoPoint),
    MapClosed,
    ActionFailed(String),
}

#[derive(Debug, Clone)]
pub struct JobBoardPage {
    identity: Option<UserId>,
    jobs: Vec<JobPosting>,
    profile: AthleteProfile,
    applications: Vec<ApplicationRecord>,
    saved: Vec<SavedJobRecord>,
    query: JobQuery,
    tab: BoardTab,
    selected: Option<JobId>,
    draft: Option<ApplyDraft>,
    map: Option<GeoPoint>,
    notice: Option<Notice>,
    generation: u64,
}

impl Default for JobBoardPage {
    fn default() -> Self {
        Self {
            identity: None,
            jobs: Vec::new(),
            profile: default_profile(),
            applications: Vec::new(),
            saved: Vec::new(),
            query: JobQuery::default(),
            tab: BoardTab::default(),
            selected: None,
            draft: None,
            map: None,
            notice: None,
            generation: 0,
        }
    }
}

impl JobBoardPage {
    pub fn new(identity: Option<UserId>) -> Self {
        let profile = match &identity {
            Some(user_id) => default_profile().for_user(user_id.clone()),
            None => default_profile(),
        };
        Self {
            identity,
            profile,
            ..Self::default()
        }
    }

    pub fn apply(mut self, event: PageEvent) -> Self {
        match event {
            // identity changes invalidate loads started for the previous user
            PageEvent::SignedIn(user_id) => {
                self.generation += 1;
                self.profile = default_profile().for_user(user_id.clone());
                self.identity = Some(user_id);
                self.applications.clear();
                self.saved.clear();
                self.draft = None;
            }
            PageEvent::SignedOut => {
                self.generation += 1;
                self.identity = None;
                self.profile = default_profile();
                self.applications.clear();
                self.saved.clear();
                self.draft = None;
            }
            PageEvent::LoadStarted => {
                self.generation += 1;
            }
            PageEvent::JobsLoaded { generation, jobs } => {
                if generation == self.generation {
                    self.jobs = jobs;
                }
            }
            PageEvent::UserDataLoaded {
                generation,
                profile,
                applications,
                saved,
            } => {
                if generation == self.generation && self.identity.is_some() {
                    if let Some(profile) = profile {
                        self.profile = profile;
                    }
                    self.applications = applications;
                    self.saved = saved;
                }
            }
            PageEvent::SearchChanged(search) => {
                self.query.search = search;
            }
            PageEvent::FacetToggled { facet, value } => {
                self.query.toggle(facet, &value);
            }
            PageEvent::TabSelected(tab) => {
                self.tab = tab;
            }
            PageEvent::JobSelected(job_id) => {
                if self.job(&job_id).is_some() {
                    self.selected = Some(job_id);
                }
            }
            PageEvent::ApplyOpened(job_id) => {
                if self.identity.is_none() {
                    self.notice = Some(Notice::error(BoardAction::Apply.login_prompt()));
                } else if self.job(&job_id).is_none() {
                    self.notice = Some(Notice::error(format!("Job {job_id} is no longer listed.")));
                } else {
                    self.draft = Some(ApplyDraft {
                        job_id,
                        profile: self.profile.clone(),
                    });
                }
            }
            PageEvent::ProfileEdited(edit) => {
                if let Some(draft) = self.draft.as_mut() {
                    edit.apply_to(&mut draft.profile);
                }
            }
            PageEvent::ApplyCancelled => {
                self.draft = None;
            }
            PageEvent::ApplicationSubmitted(record) => {
                if self.identity.as_ref() == Some(&record.user_id) {
                    if self
                        .draft
                        .as_ref()
                        .is_some_and(|draft| draft.job_id == record.job_id)
                    {
                        self.draft = None;
                    }
                    self.profile = record.athlete_profile.clone();
                    self.applications.push(record);
                    self.notice = Some(Notice::info(
                        "Application submitted with your athlete profile!",
                    ));
                }
            }
            PageEvent::JobSaved(record) => {
                if self.identity.as_ref() == Some(&record.user_id) {
                    self.saved.push(record);
                    self.notice = Some(Notice::info("Job saved successfully!"));
                }
            }
            PageEvent::MapOpened(point) => {
                self.map = Some(point);
            }
            PageEvent::MapClosed => {
                self.map = None;
            }
            PageEvent::ActionFailed(message) => {
                self.notice = Some(Notice::error(message));
            }
        }
        self
    }

    pub fn identity(&self) -> Option<&UserId> {
        self.identity.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn job(&self, job_id: &JobId) -> Option<&JobPosting> {
        self.jobs.iter().find(|job| &job.id == job_id)
    }

    pub fn profile(&self) -> &AthleteProfile {
        &self.profile
    }

    pub fn query(&self) -> &JobQuery {
        &self.query
    }

    pub fn tab(&self) -> BoardTab {
        self.tab
    }

    pub fn selected_job(&self) -> Option<&JobPosting> {
        self.selected.as_ref().and_then(|id| self.job(id))
    }

    pub fn draft(&self) -> Option<&ApplyDraft> {
        self.draft.as_ref()
    }

    pub fn map(&self) -> Option<&GeoPoint> {
        self.map.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn applications(&self) -> &[ApplicationRecord] {
        &self.applications
    }

    pub fn saved_records(&self) -> &[SavedJobRecord] {
        &self.saved
    }

    pub fn browse(&self) -> Vec<&JobPosting> {
        matching::filter(&self.jobs, &self.query)
    }

    pub fn recommended(&self) -> Vec<ScoredJob<'_>> {
        matching::recommend(&self.jobs, &self.profile, &self.query)
    }

    pub fn facet_options(&self) -> FacetOptions {
        FacetOptions::from_jobs(&self.jobs)
    }

    pub fn applied_job_ids(&self) -> BTreeSet<&JobId> {
        self.applications.iter().map(|record| &record.job_id).collect()
    }

    pub fn saved_job_ids(&self) -> BTreeSet<&JobId> {
        self.saved.iter().map(|record| &record.job_id).collect()
    }

    pub fn is_applied(&self, job_id: &JobId) -> bool {
        self.applications.iter().any(|record| &record.job_id == job_id)
    }

    pub fn is_saved(&self, job_id: &JobId) -> bool {
        self.saved.iter().any(|record| &record.job_id == job_id)
    }

    /// Listings the user applied to, in listing order.
    pub fn applied_jobs(&self) -> Vec<&JobPosting> {
        let ids = self.applied_job_ids();
        self.jobs.iter().filter(|job| ids.contains(&job.id)).collect()
    }

    /// Listings the user saved, in listing order.
    pub fn saved_jobs(&self) -> Vec<&JobPosting> {
        let ids = self.saved_job_ids();
        self.jobs.iter().filter(|job| ids.contains(&job.id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::catalog::reference_jobs;
    use chrono::{TimeZone, Utc};

    fn user() -> UserId {
        UserId::new("athlete-7")
    }

    fn loaded_page() -> JobBoardPage {
        let page = JobBoardPage::new(Some(user())).apply(PageEvent::LoadStarted);
        let generation = page.generation();
        page.apply(PageEvent::JobsLoaded {
            generation,
            jobs: reference_jobs(),
        })
    }

    fn saved_record(job: &str) -> SavedJobRecord {
        SavedJobRecord {
            job_id: JobId::new(job),
            user_id: user(),
            saved_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn search_and_facets_drive_browse_view() {
        let page = loaded_page()
            .apply(PageEvent::SearchChanged("india".to_string()))
            .apply(PageEvent::FacetToggled {
                facet: Facet::JobType,
                value: "Coaching".to_string(),
            });
        let ids: Vec<&str> = page.browse().iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);

        let page = page.apply(PageEvent::FacetToggled {
            facet: Facet::JobType,
            value: "Coaching".to_string(),
        });
        assert_eq!(page.browse().len(), 3);
    }

    #[test]
    fn stale_loads_are_ignored() {
        let page = JobBoardPage::new(Some(user())).apply(PageEvent::LoadStarted);
        let stale = page.generation();
        let page = page.apply(PageEvent::LoadStarted).apply(PageEvent::JobsLoaded {
            generation: stale,
            jobs: reference_jobs(),
        });
        assert!(page.jobs().is_empty());

        let current = page.generation();
        let page = page.apply(PageEvent::JobsLoaded {
            generation: current,
            jobs: reference_jobs(),
        });
        assert_eq!(page.jobs().len(), 3);
    }

    #[test]
    fn saving_marks_job_on_next_view() {
        let page = loaded_page().apply(PageEvent::JobSaved(saved_record("2")));
        assert!(page.is_saved(&JobId::new("2")));
        let saved: Vec<&str> = page.saved_jobs().iter().map(|job| job.id.as_str()).collect();
        assert_eq!(saved, vec!["2"]);
        assert_eq!(
            page.notice().map(|notice| notice.message.as_str()),
            Some("Job saved successfully!")
        );
    }

    #[test]
    fn duplicate_records_collapse_in_projection() {
        let page = loaded_page()
            .apply(PageEvent::JobSaved(saved_record("3")))
            .apply(PageEvent::JobSaved(saved_record("3")));
        assert_eq!(page.saved_records().len(), 2);
        assert_eq!(page.saved_job_ids().len(), 1);
        assert_eq!(page.saved_jobs().len(), 1);
    }

    #[test]
    fn apply_without_identity_prompts_login() {
        let page = JobBoardPage::new(None).apply(PageEvent::ApplyOpened(JobId::new("1")));
        assert!(page.draft().is_none());
        let notice = page.notice().expect("notice shown");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Please log in to apply for jobs.");
    }

    #[test]
    fn apply_flow_edits_copy_then_adopts_submitted_profile() {
        let page = loaded_page()
            .apply(PageEvent::ApplyOpened(JobId::new("1")))
            .apply(PageEvent::ProfileEdited(ProfileEdit::skills_from_text(
                "Cricket, Fitness Training",
            )));

        let draft = page.draft().expect("draft open").clone();
        assert_eq!(draft.profile.skills, vec!["Cricket", "Fitness Training"]);
        // the live profile is untouched until submission
        assert_eq!(page.profile().skills.len(), 3);

        let record = ApplicationRecord {
            job_id: draft.job_id.clone(),
            user_id: user(),
            athlete_profile: draft.profile.clone(),
            applied_at: Utc.with_ymd_and_hms(2025, 3, 2, 10, 30, 0).unwrap(),
        };
        let page = page.apply(PageEvent::ApplicationSubmitted(record));

        assert!(page.draft().is_none());
        assert!(page.is_applied(&JobId::new("1")));
        assert_eq!(page.profile().skills, vec!["Cricket", "Fitness Training"]);
        assert_eq!(page.applied_jobs().len(), 1);
    }

    #[test]
    fn cancelled_draft_discards_edits() {
        let page = loaded_page()
            .apply(PageEvent::ApplyOpened(JobId::new("2")))
            .apply(PageEvent::ProfileEdited(ProfileEdit::Sport("Hockey".to_string())))
            .apply(PageEvent::ApplyCancelled);
        assert!(page.draft().is_none());
        assert_eq!(page.profile().sport, "Cricket");
    }

    #[test]
    fn sign_out_drops_user_records() {
        let page = loaded_page()
            .apply(PageEvent::JobSaved(saved_record("1")))
            .apply(PageEvent::SignedOut);
        assert!(page.identity().is_none());
        assert!(page.saved_job_ids().is_empty());
        assert_eq!(page.jobs().len(), 3);
    }

    #[test]
    fn user_data_loaded_before_switching_users_is_dropped() {
        let page = JobBoardPage::new(Some(user())).apply(PageEvent::LoadStarted);
        let started_for_previous_user = page.generation();
        let previous_user_profile = default_profile().for_user(user());
        let record = ApplicationRecord {
            job_id: JobId::new("1"),
            user_id: user(),
            athlete_profile: previous_user_profile.clone(),
            applied_at: Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap(),
        };

        let page = page
            .apply(PageEvent::SignedIn(UserId::new("athlete-8")))
            .apply(PageEvent::UserDataLoaded {
                generation: started_for_previous_user,
                profile: Some(previous_user_profile),
                applications: vec![record],
                saved: vec![saved_record("2")],
            });

        assert_eq!(page.identity(), Some(&UserId::new("athlete-8")));
        assert_eq!(page.profile().user_id, UserId::new("athlete-8"));
        assert!(!page.is_applied(&JobId::new("1")));
        assert!(!page.is_saved(&JobId::new("2")));
    }

    #[test]
    fn sign_out_invalidates_pending_loads() {
        let page = JobBoardPage::new(Some(user())).apply(PageEvent::LoadStarted);
        let pending = page.generation();
        let page = page.apply(PageEvent::SignedOut);
        assert!(page.generation() > pending);
    }

    #[test]
    fn selecting_a_listed_job_marks_it_selected() {
        let page = loaded_page().apply(PageEvent::JobSelected(JobId::new("2")));
        assert_eq!(
            page.selected_job().map(|job| job.title.as_str()),
            Some("Athlete Sponsorship Coordinator")
        );

        let page = page.apply(PageEvent::JobSelected(JobId::new("missing")));
        assert_eq!(page.selected_job().map(|job| job.id.as_str()), Some("2"));
    }

    #[test]
    fn records_for_other_users_are_ignored() {
        let mut record = saved_record("1");
        record.user_id = UserId::new("someone-else");
        let page = loaded_page().apply(PageEvent::JobSaved(record));
        assert!(!page.is_saved(&JobId::new("1")));
    }

    #[test]
    fn recommended_view_uses_current_profile() {
        let page = loaded_page();
        let ranked = page.recommended();
        assert_eq!(ranked[0].job.id, JobId::new("1"));
        // three skills of the default profile: two match the coach tags
        assert_eq!(ranked[0].score, 30 + 30 + 20 + 20);
    }

    #[test]
    fn map_opens_and_closes() {
        let point = GeoPoint {
            name: "Delhi, India".to_string(),
            lat: 28.61,
            lng: 77.21,
        };
        let page = loaded_page().apply(PageEvent::MapOpened(point.clone()));
        assert_eq!(page.map(), Some(&point));
        let page = page.apply(PageEvent::MapClosed);
        assert!(page.map().is_none());
    }
}
