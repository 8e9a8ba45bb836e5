//! Relevance scoring and search/facet filtering over an in-memory listing set.
//!
//! Everything here is pure: the functions borrow their inputs, never fail and
//! never touch a store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{AthleteProfile, JobPosting};

const SKILL_TAG_POINTS: u32 = 30;
const SPORT_TAG_POINTS: u32 = 20;
const LOCATION_POINTS: u32 = 20;
const EXPERIENCE_POINTS: u32 = 20;

/// Free-text search plus the two facet filters.
///
/// Empty facet sets are permissive: they constrain nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub job_types: BTreeSet<String>,
    #[serde(default)]
    pub locations: BTreeSet<String>,
}

/// Facet a filter toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    JobType,
    Location,
}

impl JobQuery {
    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::default()
        }
    }

    /// Adds the value when absent, removes it when present.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let set = match facet {
            Facet::JobType => &mut self.job_types,
            Facet::Location => &mut self.locations,
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        matches_search(job, &self.search)
            && (self.job_types.is_empty() || self.job_types.contains(&job.job_type))
            && (self.locations.is_empty() || self.locations.contains(&job.location))
    }
}

fn matches_search(job: &JobPosting, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    contains_folded(&job.title, &needle)
        || contains_folded(&job.organization, &needle)
        || contains_folded(&job.location, &needle)
        || job.tags.iter().any(|tag| contains_folded(tag, &needle))
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Heuristic relevance of a job for an athlete. Scores are relative only.
pub fn match_score(job: &JobPosting, profile: &AthleteProfile) -> u32 {
    let tags: Vec<String> = job.tags.iter().map(|tag| tag.to_lowercase()).collect();
    let mut score = 0;

    for skill in &profile.skills {
        if tags.contains(&skill.to_lowercase()) {
            score += SKILL_TAG_POINTS;
        }
    }

    if tags.contains(&profile.sport.to_lowercase()) {
        score += SPORT_TAG_POINTS;
    }

    if let Some(preferred) = profile
        .preferred_location
        .as_deref()
        .filter(|location| !location.is_empty())
    {
        if contains_folded(&job.location, &preferred.to_lowercase()) {
            score += LOCATION_POINTS;
        }
    }

    let experience = profile.experience_level.to_lowercase();
    if job
        .requirements
        .iter()
        .any(|requirement| contains_folded(requirement, &experience))
    {
        score += EXPERIENCE_POINTS;
    }

    score
}

/// Jobs passing the query, in input order.
pub fn filter<'a>(jobs: &'a [JobPosting], query: &JobQuery) -> Vec<&'a JobPosting> {
    jobs.iter().filter(|job| query.matches(job)).collect()
}

/// A job paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredJob<'a> {
    pub job: &'a JobPosting,
    pub score: u32,
}

/// Filtered jobs ranked by descending score. Equal scores keep input order.
pub fn recommend<'a>(
    jobs: &'a [JobPosting],
    profile: &AthleteProfile,
    query: &JobQuery,
) -> Vec<ScoredJob<'a>> {
    let mut ranked: Vec<ScoredJob<'a>> = filter(jobs, query)
        .into_iter()
        .map(|job| ScoredJob {
            job,
            score: match_score(job, profile),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Selectable facet values, distinct and in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub job_types: Vec<String>,
    pub locations: Vec<String>,
}

impl FacetOptions {
    pub fn from_jobs(jobs: &[JobPosting]) -> Self {
        let mut options = Self::default();
        for job in jobs {
            if !options.job_types.contains(&job.job_type) {
                options.job_types.push(job.job_type.clone());
            }
            if !options.locations.contains(&job.location) {
                options.locations.push(job.location.clone());
            }
        }
        options
    }
}
