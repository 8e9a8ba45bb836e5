use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A published job listing. Immutable once fetched; identity is the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub organization: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub salary: String,
    pub posted_date: String,
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Skills and preferences an athlete shares with employers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_location: Option<String>,
    pub sport: String,
}

impl AthleteProfile {
    /// Copy of this profile re-keyed to another user, used when a signed-in
    /// user has no stored profile yet.
    pub fn for_user(&self, user_id: UserId) -> Self {
        Self {
            user_id,
            ..self.clone()
        }
    }
}

/// Append-only record of a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub job_id: JobId,
    pub user_id: UserId,
    pub athlete_profile: AthleteProfile,
    pub applied_at: DateTime<Utc>,
}

/// Append-only record of a bookmarked job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedJobRecord {
    pub job_id: JobId,
    pub user_id: UserId,
    pub saved_at: DateTime<Utc>,
}

/// Resolved coordinates for a free-text location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// User actions that require a signed-in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardAction {
    Apply,
    Save,
}

impl BoardAction {
    /// Prompt shown when the action is attempted without signing in.
    pub const fn login_prompt(self) -> &'static str {
        match self {
            BoardAction::Apply => "Please log in to apply for jobs.",
            BoardAction::Save => "Please log in to save jobs.",
        }
    }
}

/// Whether repeated apply/save actions on the same job are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Every action appends a record, matching an append-only store.
    #[default]
    Append,
    /// At most one record per (user, job) pair.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown duplicate policy '{0}'")]
pub struct UnknownDuplicatePolicy(pub String);

impl FromStr for DuplicatePolicy {
    type Err = UnknownDuplicatePolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "reject" | "once" => Ok(Self::Reject),
            _ => Err(UnknownDuplicatePolicy(value.to_string())),
        }
    }
}
