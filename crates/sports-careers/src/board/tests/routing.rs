use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::board::domain::DuplicatePolicy;
use crate::board::router::{board_router, USER_HEADER};
use crate::board::service::JobBoardService;

fn router(policy: DuplicatePolicy) -> (axum::Router, crate::board::InMemoryBoardStore) {
    let (service, store) = build_service(policy);
    (board_router(Arc::new(service)), store)
}

fn post_json(uri: &str, user: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    builder.body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn lists_reference_jobs() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router.oneshot(get("/api/v1/jobs", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    let jobs = body.as_array().expect("array payload");
    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0]["type"], "Coaching");
    assert_eq!(jobs[0]["posted_date"], "1 week ago");
}

#[tokio::test]
async fn unknown_job_returns_not_found() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router.oneshot(get("/api/v1/jobs/99", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "job 99 not found");
}

#[tokio::test]
async fn search_filters_by_term_and_facets() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/jobs/search",
            None,
            json!({ "search": "cricket" }),
        ))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["title"], "Cricket Coach");

    let response = router
        .oneshot(post_json(
            "/api/v1/jobs/search",
            None,
            json!({ "job_types": ["Sponsorship", "Brand Ambassador"], "locations": ["Delhi, India"] }),
        ))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], "3");
}

#[tokio::test]
async fn recommendations_rank_by_supplied_profile() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router
        .oneshot(post_json(
            "/api/v1/jobs/recommendations",
            None,
            json!({ "profile": cricket_profile() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body[0]["job"]["id"], "1");
    assert_eq!(body[0]["score"], 100);
    assert_eq!(body[1]["score"], 0);
    assert_eq!(body[1]["job"]["id"], "2");
}

#[tokio::test]
async fn facets_list_distinct_values() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router
        .oneshot(get("/api/v1/jobs/facets", None))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(
        body["job_types"],
        json!(["Coaching", "Sponsorship", "Brand Ambassador"])
    );
}

#[tokio::test]
async fn apply_without_identity_is_unauthorized() {
    let (router, store) = router(DuplicatePolicy::Append);
    let response = router
        .oneshot(post_json("/api/v1/jobs/1/applications", None, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Please log in to apply for jobs.");
    assert_eq!(store.application_count(), 0);
}

#[tokio::test]
async fn apply_uses_stored_profile_when_body_is_empty() {
    let (router, store) = router(DuplicatePolicy::Append);
    store.put_profile(cricket_profile());

    let request = Request::post("/api/v1/jobs/2/applications")
        .header(USER_HEADER, "athlete-42")
        .body(Body::empty())
        .expect("request builds");
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json_body(response).await;
    assert_eq!(body["job_id"], "2");
    assert_eq!(body["athlete_profile"]["sport"], "Cricket");
}

#[tokio::test]
async fn duplicate_apply_conflicts_under_reject_policy() {
    let (router, store) = router(DuplicatePolicy::Reject);
    let first = router
        .clone()
        .oneshot(post_json(
            "/api/v1/jobs/1/applications",
            Some("athlete-42"),
            json!({ "profile": cricket_profile() }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(post_json(
            "/api/v1/jobs/1/applications",
            Some("athlete-42"),
            json!({ "profile": cricket_profile() }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(store.application_count(), 1);
}

#[tokio::test]
async fn saved_jobs_are_listed_for_the_caller() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router
        .clone()
        .oneshot(post_json("/api/v1/jobs/3/save", Some("athlete-42"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .clone()
        .oneshot(get("/api/v1/me/saved", Some("athlete-42")))
        .await
        .unwrap();
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["job_id"], "3");

    let response = router
        .oneshot(get("/api/v1/me/saved", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn geocode_failures_return_bad_gateway() {
    let (router, _) = router(DuplicatePolicy::Append);
    let response = router
        .clone()
        .oneshot(get("/api/v1/geocode?address=Delhi%2C%20India", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["name"], "Delhi, India");

    let response = router
        .oneshot(get("/api/v1/geocode?address=Atlantis", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "Unable to load map for Atlantis.");
}

#[tokio::test]
async fn offline_store_maps_to_service_unavailable() {
    let service = JobBoardService::new(
        Arc::new(UnavailableStore),
        Arc::new(StaticGeocoder),
        &board_config(DuplicatePolicy::Append),
    );
    let response = board_router(Arc::new(service))
        .oneshot(get("/api/v1/jobs", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
