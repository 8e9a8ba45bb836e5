use async_trait::async_trait;
use clap::Args;
use sports_careers::board::{
    recommend, reference_jobs, AthleteProfile, BoardSession, BoardTab, CatalogImporter,
    DuplicatePolicy, Facet, GeoPoint, GeocodeError, Geocoder, InMemoryBoardStore, JobBoardPage,
    JobBoardService, JobId, JobPosting, JobQuery, PageEvent, ProfileEdit, UserId,
};
use sports_careers::config::BoardConfig;
use sports_careers::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// Athlete skill (repeatable)
    #[arg(long = "skill")]
    pub(crate) skills: Vec<String>,
    /// Athlete sport
    #[arg(long, default_value = "Cricket")]
    pub(crate) sport: String,
    /// Experience level matched against job requirements
    #[arg(long, default_value = "Intermediate")]
    pub(crate) experience: String,
    /// Preferred job location
    #[arg(long)]
    pub(crate) preferred_location: Option<String>,
    /// Free-text search over title, organization, location and tags
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// Restrict to a job type (repeatable)
    #[arg(long = "job-type")]
    pub(crate) job_types: Vec<String>,
    /// Restrict to an exact location (repeatable)
    #[arg(long = "location")]
    pub(crate) locations: Vec<String>,
    /// Additional listings from a CSV catalog
    #[arg(long)]
    pub(crate) jobs_csv: Option<PathBuf>,
    /// Leave the built-in reference listings out
    #[arg(long)]
    pub(crate) no_reference_jobs: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// User id to act as
    #[arg(long, default_value = "demo-athlete")]
    pub(crate) user: String,
    /// Refuse repeated applications to the same job
    #[arg(long)]
    pub(crate) reject_duplicates: bool,
    /// Additional listings from a CSV catalog
    #[arg(long)]
    pub(crate) jobs_csv: Option<PathBuf>,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        skills,
        sport,
        experience,
        preferred_location,
        search,
        job_types,
        locations,
        jobs_csv,
        no_reference_jobs,
    } = args;

    let mut jobs = if no_reference_jobs {
        Vec::new()
    } else {
        reference_jobs()
    };
    if let Some(path) = jobs_csv {
        jobs.extend(CatalogImporter::from_path(path)?);
    }

    let profile = AthleteProfile {
        user_id: UserId::new("cli"),
        skills,
        experience_level: experience,
        preferred_location,
        sport,
    };
    let query = JobQuery {
        search,
        job_types: job_types.into_iter().collect(),
        locations: locations.into_iter().collect(),
    };

    let ranked = recommend(&jobs, &profile, &query);
    if ranked.is_empty() {
        println!("No listings match the current search and filters.");
        return Ok(());
    }

    println!("Recommended jobs ({} of {})", ranked.len(), jobs.len());
    for scored in ranked {
        print_job_line(scored.job, Some(scored.score));
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        user,
        reject_duplicates,
        jobs_csv,
    } = args;

    let store = match jobs_csv {
        Some(path) => InMemoryBoardStore::with_jobs(CatalogImporter::from_path(path)?),
        None => InMemoryBoardStore::default(),
    };
    let config = BoardConfig {
        duplicate_policy: if reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Append
        },
        ..BoardConfig::default()
    };
    let service = Arc::new(JobBoardService::new(
        Arc::new(store.clone()),
        Arc::new(ReferenceGeocoder),
        &config,
    ));

    println!("Sports careers job board demo");

    let guest = BoardSession::new(service.clone(), None);
    wait(guest.refresh().await).await;
    guest.save_job(JobId::new("2")).await;
    print_notice(&guest.snapshot().await, "Anonymous save");
    guest.close().await;

    let session = BoardSession::new(service, Some(UserId::new(user)));
    wait(session.refresh().await).await;

    session
        .dispatch(PageEvent::SearchChanged("india".to_string()))
        .await;
    let page = session.snapshot().await;
    println!("\nBrowse: search \"india\"");
    for job in page.browse() {
        print_job_line(job, None);
    }

    session
        .dispatch(PageEvent::FacetToggled {
            facet: Facet::JobType,
            value: "Coaching".to_string(),
        })
        .await;
    session
        .dispatch(PageEvent::TabSelected(BoardTab::Recommended))
        .await;
    let page = session.snapshot().await;
    println!("\nRecommended with job type filter \"Coaching\"");
    for scored in page.recommended() {
        print_job_line(scored.job, Some(scored.score));
    }

    session.save_job(JobId::new("2")).await;
    print_notice(&session.snapshot().await, "Save job 2");

    session.open_application(JobId::new("1")).await;
    session
        .dispatch(PageEvent::ProfileEdited(ProfileEdit::skills_from_text(
            "Cricket, Coaching, Fitness Training",
        )))
        .await;
    session.confirm_application().await;
    print_notice(&session.snapshot().await, "Apply to job 1");

    session.open_application(JobId::new("1")).await;
    session.confirm_application().await;
    print_notice(&session.snapshot().await, "Apply to job 1 again");

    session
        .dispatch(PageEvent::JobSelected(JobId::new("1")))
        .await;
    let page = session.snapshot().await;
    if let Some(job) = page.selected_job() {
        wait(session.show_map(job.location.clone())).await;
    }
    if let Some(point) = session.snapshot().await.map() {
        println!("\nMap: {} at ({:.4}, {:.4})", point.name, point.lat, point.lng);
    }
    wait(session.show_map("Atlantis")).await;
    print_notice(&session.snapshot().await, "Map for Atlantis");

    let page = session.snapshot().await;
    println!("\nApplied jobs");
    for job in page.applied_jobs() {
        print_job_line(job, None);
    }
    println!("Saved jobs");
    for job in page.saved_jobs() {
        print_job_line(job, None);
    }
    println!(
        "Stored records: {} application(s), {} saved job(s)",
        store.application_count(),
        store.saved_count()
    );

    session.close().await;
    Ok(())
}

async fn wait(task: tokio::task::JoinHandle<()>) {
    if let Err(err) = task.await {
        tracing::warn!(error = %err, "demo task failed");
    }
}

fn print_notice(page: &JobBoardPage, step: &str) {
    match page.notice() {
        Some(notice) => println!("\n{step}: {}", notice.message),
        None => println!("\n{step}: no message"),
    }
}

fn print_job_line(job: &JobPosting, score: Option<u32>) {
    let score = score.map(|value| format!(" [score {value}]")).unwrap_or_default();
    println!(
        "- {} | {} | {} | {} | {}{}",
        job.id, job.title, job.organization, job.location, job.salary, score
    );
}

/// Offline geocoder for the reference locations.
struct ReferenceGeocoder;

#[async_trait]
impl Geocoder for ReferenceGeocoder {
    async fn locate(&self, location: &str) -> Result<GeoPoint, GeocodeError> {
        let (lat, lng) = match location {
            "Bangalore, India" => (12.9716, 77.5946),
            "Mumbai, India" => (19.076, 72.8777),
            "Delhi, India" => (28.6139, 77.209),
            _ => return Err(GeocodeError::Status("ZERO_RESULTS".to_string())),
        };
        Ok(GeoPoint {
            name: location.to_string(),
            lat,
            lng,
        })
    }
}
