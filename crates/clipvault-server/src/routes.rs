use crate::auth;
use crate::dto::{CreateSnippetRequest, SearchParams, SnippetResponse};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{DefaultBodyLimit, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use clipvault_core::{EngineLimits, SnippetId, UserId};
use std::time::Instant;

/// Build the `/api/v1` router. Every snippet endpoint sits behind the auth
/// middleware; the body limit leaves headroom over the engine's own content
/// cap for the JSON envelope. `/healthz` is unauthenticated for probes.
pub fn router(state: AppState, limits: &EngineLimits) -> Router {
    let api = Router::new()
        .route("/snippets", post(create_snippet).get(list_snippets))
        .route("/snippets/search", get(search_snippets))
        .route("/snippets/{id}", get(get_snippet).delete(delete_snippet))
        .route("/snippets/{id}/access", post(touch_snippet))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_owner,
        ))
        .layer(DefaultBodyLimit::max(limits.max_snippet_bytes + 64 * 1024));

    Router::new()
        .nest("/api/v1", api)
        .route("/healthz", get(health))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::debug!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

async fn create_snippet(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Json(request): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<SnippetResponse>), ApiError> {
    let view = state
        .service
        .accept(owner, &request.content, request.source_url.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(view.into())))
}

async fn list_snippets(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
) -> Result<Json<Vec<SnippetResponse>>, ApiError> {
    let views = state.service.fetch_recent(owner).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

async fn get_snippet(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(id): Path<i64>,
) -> Result<Json<SnippetResponse>, ApiError> {
    let view = state.service.fetch_one(owner, SnippetId(id)).await?;
    Ok(Json(view.into()))
}

async fn search_snippets(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SnippetResponse>>, ApiError> {
    let views = state.service.search(owner, &params.query).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

async fn delete_snippet(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(owner, SnippetId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn touch_snippet(
    State(state): State<AppState>,
    Extension(owner): Extension<UserId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.touch(owner, SnippetId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
