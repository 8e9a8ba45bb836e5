use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{AthleteProfile, JobId, JobPosting, UserId};

/// Built-in listings shown ahead of whatever the listing store returns.
pub fn reference_jobs() -> Vec<JobPosting> {
    vec![
        JobPosting {
            id: JobId::new("1"),
            title: "Cricket Coach".to_string(),
            organization: "National Cricket Academy".to_string(),
            location: "Bangalore, India".to_string(),
            job_type: "Coaching".to_string(),
            salary: "₹10,00,000 - ₹15,00,000 /year".to_string(),
            posted_date: "1 week ago".to_string(),
            description: "Coach young cricketers to excel in national leagues.".to_string(),
            responsibilities: strings(&[
                "Design training drills",
                "Mentor athletes",
                "Analyze performance",
            ]),
            requirements: strings(&[
                "3+ years coaching experience",
                "BCCI certification",
                "Cricket background",
            ]),
            tags: strings(&["Cricket", "Coaching", "Youth Development"]),
        },
        JobPosting {
            id: JobId::new("2"),
            title: "Athlete Sponsorship Coordinator".to_string(),
            organization: "SportsBrand Inc.".to_string(),
            location: "Mumbai, India".to_string(),
            job_type: "Sponsorship".to_string(),
            salary: "₹8,00,000 - ₹12,00,000 /year".to_string(),
            posted_date: "3 days ago".to_string(),
            description: "Connect athletes with sponsorship opportunities.".to_string(),
            responsibilities: strings(&[
                "Negotiate deals",
                "Manage partnerships",
                "Promote athletes",
            ]),
            requirements: strings(&[
                "Marketing experience",
                "Sports industry knowledge",
                "Networking skills",
            ]),
            tags: strings(&["Sponsorship", "Marketing", "Athlete Representation"]),
        },
        JobPosting {
            id: JobId::new("3"),
            title: "Brand Ambassador - Track & Field".to_string(),
            organization: "RunFast Athletics".to_string(),
            location: "Delhi, India".to_string(),
            job_type: "Brand Ambassador".to_string(),
            salary: "₹5,00,000 - ₹8,00,000 /year".to_string(),
            posted_date: "5 days ago".to_string(),
            description: "Represent the brand at events and promote products.".to_string(),
            responsibilities: strings(&[
                "Attend events",
                "Engage with fans",
                "Social media promotion",
            ]),
            requirements: strings(&[
                "Track & Field experience",
                "Public speaking skills",
                "Social media presence",
            ]),
            tags: strings(&["Athletics", "Brand Ambassador", "Public Relations"]),
        },
    ]
}

/// Profile used until a stored one is loaded.
pub fn default_profile() -> AthleteProfile {
    AthleteProfile {
        user_id: UserId::new("guest"),
        skills: strings(&["Cricket", "Coaching", "Team Leadership"]),
        experience_level: "Intermediate".to_string(),
        preferred_location: Some("Bangalore, India".to_string()),
        sport: "Cricket".to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read job catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid job catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("job catalog row {row} has an empty id")]
    MissingId { row: usize },
}

/// Loads job postings from a CSV export.
///
/// List columns (`responsibilities`, `requirements`, `tags`) hold `;`-separated
/// values.
pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<JobPosting>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<JobPosting>, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut jobs = Vec::new();

        for (index, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = row?;
            if row.id.is_empty() {
                // header is line 1
                return Err(CatalogImportError::MissingId { row: index + 2 });
            }
            jobs.push(row.into_posting());
        }

        Ok(jobs)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    title: String,
    organization: String,
    location: String,
    #[serde(rename = "type")]
    job_type: String,
    #[serde(default)]
    salary: String,
    #[serde(default)]
    posted_date: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "split_list")]
    responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "split_list")]
    requirements: Vec<String>,
    #[serde(default, deserialize_with = "split_list")]
    tags: Vec<String>,
}

impl CatalogRow {
    fn into_posting(self) -> JobPosting {
        JobPosting {
            id: JobId(self.id),
            title: self.title,
            organization: self.organization,
            location: self.location,
            job_type: self.job_type,
            salary: self.salary,
            posted_date: self.posted_date,
            description: self.description,
            responsibilities: self.responsibilities,
            requirements: self.requirements,
            tags: self.tags,
        }
    }
}

fn split_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect())
}
