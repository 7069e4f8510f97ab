//! HTTP Endpoints
//!
//! REST API for story generation and retrieval.

use std::time::{Duration, Instant};

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use readalong_config::ServerConfig;
use readalong_core::{NewStory, Story, StoryLookup, StoryRequest};

use crate::metrics;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/api/generate-story",
            post(generate_story).get(method_not_allowed),
        )
        .route("/api/stories/:id", get(get_story))
        .route("/health", get(health_check));

    if state.config.observability.metrics_enabled {
        router = router.route("/metrics", get(metrics::metrics_handler));
    }

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.timeout_seconds,
        )));

    let router = match cors_layer(&state.config.server) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    if !config.cors_enabled {
        return None;
    }
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.is_empty() {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(origins))
}

/// Generate story response; `id` is absent when the story could not be stored
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateStoryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub story: String,
}

/// Generate a story and keep it for the configured time-to-live
async fn generate_story(
    State(state): State<AppState>,
    Json(request): Json<StoryRequest>,
) -> Result<Json<GenerateStoryResponse>, ServerError> {
    validate_request(&request)?;

    let started = Instant::now();
    let generated = state.generator.generate(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Story generation failed");
        metrics::record_generation_failure();
        ServerError::from(e)
    })?;
    metrics::record_generation_latency(started.elapsed().as_secs_f64());

    let ttl = chrono::Duration::minutes(state.config.story.ttl_minutes);
    let id = match state
        .stories
        .create(NewStory {
            title: generated.title.clone(),
            body: generated.story.clone(),
            ttl,
        })
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(error = %e, "Story not stored, returning it without an id");
            None
        }
    };

    metrics::record_story_generated();
    tracing::info!(story_id = ?id, title = %generated.title, "Story generated");

    Ok(Json(GenerateStoryResponse {
        id,
        title: generated.title,
        story: generated.story,
    }))
}

fn validate_request(request: &StoryRequest) -> Result<(), ServerError> {
    if request.prompt.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Prompt must not be empty".into()));
    }
    if request.genre.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Genre must not be empty".into()));
    }
    Ok(())
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method Not Allowed" })),
    )
}

/// Fetch a live story
async fn get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Story>, ServerError> {
    metrics::record_story_fetched();
    match state.stories.get(&id).await? {
        StoryLookup::Found(story) => Ok(Json(story)),
        StoryLookup::NotFound => Err(ServerError::NotFound(id)),
        StoryLookup::Expired => Err(ServerError::Gone(id)),
    }
}

/// Health check
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
