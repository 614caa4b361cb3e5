//! Router-level tests: the full edge (auth middleware, DTOs, status
//! mapping) over the real engine with in-memory backends.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use clipvault_core::{EngineLimits, UserId, UserRole};
use clipvault_db::Database;
use clipvault_recency::InMemoryRecencyQueue;
use clipvault_server::auth::StaticTokenVerifier;
use clipvault_server::config::{AuthConfig, SeedUser};
use clipvault_server::{routes, AppState};
use clipvault_service::SnippetService;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const TOKEN: &str = "dev-token";

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.ensure_user(UserId(1), "dev@example.com", UserRole::Ordinary)
        .await
        .unwrap();

    let limits = EngineLimits::default();
    let queue = Arc::new(InMemoryRecencyQueue::new(limits.recency_cap));
    let service = Arc::new(SnippetService::new(db, queue, limits.clone(), 64));

    let mut auth_config = AuthConfig::default();
    auth_config.tokens.insert(
        TOKEN.to_string(),
        SeedUser {
            id: 1,
            email: "dev@example.com".to_string(),
            elevated: false,
        },
    );
    let verifier = Arc::new(StaticTokenVerifier::from_config(&auth_config));

    routes::router(AppState { service, verifier }, &limits)
}

fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_snippet(app: &Router, content: &str, source_url: Option<&str>) -> Value {
    let mut payload = json!({ "content": content });
    if let Some(url) = source_url {
        payload["sourceUrl"] = json!(url);
    }
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/api/v1/snippets"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

/// Poll `GET /snippets/{id}` until processing finishes (it 404s while the
/// snippet has no chunks).
async fn fetch_when_ready(app: &Router, id: i64) -> Value {
    for _ in 0..500 {
        let response = app
            .clone()
            .oneshot(
                authed(Request::builder().uri(format!("/api/v1/snippets/{id}")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        if response.status() == StatusCode::OK {
            return body_json(response).await;
        }
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("snippet {id} never became fetchable");
}

#[tokio::test]
async fn health_probe_needs_no_credentials() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/snippets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_returns_id_and_empty_content() {
    let app = app().await;
    let body = create_snippet(&app, "hello world", Some("https://ex.com")).await;

    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["content"], "");
    assert_eq!(body["sourceUrl"], "https://ex.com");
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn fetch_round_trips_content() {
    let app = app().await;
    let created = create_snippet(&app, "round trip payload", None).await;
    let id = created["id"].as_i64().unwrap();

    let fetched = fetch_when_ready(&app, id).await;
    assert_eq!(fetched["content"], "round trip payload");
    assert_eq!(fetched["sourceUrl"], Value::Null);
}

#[tokio::test]
async fn listing_returns_most_recent_first() {
    let app = app().await;
    let a = create_snippet(&app, "alpha", None).await["id"].as_i64().unwrap();
    fetch_when_ready(&app, a).await;
    let b = create_snippet(&app, "beta", None).await["id"].as_i64().unwrap();
    fetch_when_ready(&app, b).await;

    // fetch_when_ready touched both; B was fetched last so it leads.
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().uri("/api/v1/snippets"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![b, a]);
}

#[tokio::test]
async fn duplicates_conflict() {
    let app = app().await;
    let created = create_snippet(&app, "only once", None).await;
    fetch_when_ready(&app, created["id"].as_i64().unwrap()).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/api/v1/snippets"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "content": "only once" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Duplicate");
}

#[tokio::test]
async fn empty_content_is_a_bad_request() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().method("POST").uri("/api/v1/snippets"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "content": "" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_matches_and_rejects_empty_query() {
    let app = app().await;
    let created = create_snippet(&app, "a haystack with one needle inside", None).await;
    fetch_when_ready(&app, created["id"].as_i64().unwrap()).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().uri("/api/v1/snippets/search?query=needle"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().uri("/api/v1/snippets/search?query="))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_and_touch_lifecycle() {
    let app = app().await;
    let created = create_snippet(&app, "short lived", None).await;
    let id = created["id"].as_i64().unwrap();
    fetch_when_ready(&app, id).await;

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder()
                .method("POST")
                .uri(format!("/api/v1/snippets/{id}/access")))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/snippets/{id}")))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone from the listing and from direct fetches.
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().uri(format!("/api/v1/snippets/{id}")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(
            authed(Request::builder()
                .method("POST")
                .uri(format!("/api/v1/snippets/{id}/access")))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(
            authed(Request::builder().uri("/api/v1/snippets/999999"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["error"], "Not Found");
}
