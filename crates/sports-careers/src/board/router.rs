use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{AthleteProfile, JobId, JobPosting, UserId};
use super::geocode::Geocoder;
use super::matching::{self, FacetOptions, JobQuery};
use super::repository::BoardStore;
use super::service::{BoardServiceError, JobBoardService};

/// Header carrying the caller's user id. Nothing verifies it.
pub const USER_HEADER: &str = "x-user-id";

/// Router builder exposing the job board over HTTP.
pub fn board_router<S, G>(service: Arc<JobBoardService<S, G>>) -> Router
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    Router::new()
        .route("/api/v1/jobs", get(list_handler::<S, G>))
        .route("/api/v1/jobs/facets", get(facets_handler::<S, G>))
        .route("/api/v1/jobs/search", post(search_handler::<S, G>))
        .route(
            "/api/v1/jobs/recommendations",
            post(recommendations_handler::<S, G>),
        )
        .route("/api/v1/jobs/:job_id", get(job_handler::<S, G>))
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(apply_handler::<S, G>),
        )
        .route("/api/v1/jobs/:job_id/save", post(save_handler::<S, G>))
        .route("/api/v1/me/profile", get(profile_handler::<S, G>))
        .route("/api/v1/me/applications", get(applications_handler::<S, G>))
        .route("/api/v1/me/saved", get(saved_handler::<S, G>))
        .route("/api/v1/geocode", get(geocode_handler::<S, G>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(flatten)]
    pub query: JobQuery,
    /// Scores against this profile instead of the caller's stored one.
    #[serde(default)]
    pub profile: Option<AthleteProfile>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    pub job: JobPosting,
    pub score: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    /// Edited profile to submit; the stored profile is used when absent.
    #[serde(default)]
    pub profile: Option<AthleteProfile>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
}

pub(crate) fn identity_from(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(UserId::new)
}

fn error_response(error: BoardServiceError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error = %error, "job board request failed");
    }
    let payload = json!({ "error": error.user_message() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    match service.listings() {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn facets_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    match service.listings() {
        Ok(jobs) => (StatusCode::OK, Json(FacetOptions::from_jobs(&jobs))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn job_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    match service.job(&JobId(job_id)) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    Json(query): Json<JobQuery>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    match service.listings() {
        Ok(jobs) => {
            let matches: Vec<&JobPosting> = matching::filter(&jobs, &query);
            (StatusCode::OK, Json(matches)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn recommendations_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    headers: HeaderMap,
    Json(request): Json<RecommendationRequest>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    let identity = identity_from(&headers);
    let profile = match request.profile {
        Some(profile) => profile,
        None => match service.profile(identity.as_ref()) {
            Ok(profile) => profile,
            Err(err) => return error_response(err),
        },
    };

    match service.listings() {
        Ok(jobs) => {
            let ranked: Vec<RecommendationView> =
                matching::recommend(&jobs, &profile, &request.query)
                    .into_iter()
                    .map(|scored| RecommendationView {
                        job: scored.job.clone(),
                        score: scored.score,
                    })
                    .collect();
            (StatusCode::OK, Json(ranked)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn apply_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<ApplyRequest>>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    let identity = identity_from(&headers);
    let job_id = JobId(job_id);
    let edited = body.and_then(|Json(request)| request.profile);

    let profile = match edited {
        Some(profile) => profile,
        None => match service.begin_application(identity.as_ref(), &job_id) {
            Ok(draft) => draft.profile,
            Err(err) => return error_response(err),
        },
    };

    match service.confirm_application(identity.as_ref(), &job_id, profile) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn save_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    let identity = identity_from(&headers);
    match service.save_job(identity.as_ref(), &JobId(job_id)) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn profile_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    let identity = identity_from(&headers);
    match service.profile(identity.as_ref()) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn applications_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    let identity = identity_from(&headers);
    match service.applications(identity.as_ref()) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn saved_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    let identity = identity_from(&headers);
    match service.saved_jobs(identity.as_ref()) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn geocode_handler<S, G>(
    State(service): State<Arc<JobBoardService<S, G>>>,
    Query(params): Query<GeocodeParams>,
) -> Response
where
    S: BoardStore + 'static,
    G: Geocoder + 'static,
{
    match service.locate(&params.address).await {
        Ok(point) => (StatusCode::OK, Json(point)).into_response(),
        Err(BoardServiceError::Geocode(err)) => {
            tracing::warn!(address = %params.address, error = %err, "geocoding failed");
            let payload = json!({ "error": err.user_message(&params.address) });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}
