//! Read-Along Server
//!
//! HTTP endpoints for generating stories with a language model and fetching
//! them back while they are still live.

pub mod extract;
pub mod generator;
pub mod http;
pub mod metrics;
pub mod state;

pub use extract::extract_story_payload;
pub use generator::{build_prompt, OpenRouterStoryGenerator};
pub use http::{create_router, GenerateStoryResponse};
pub use metrics::init_metrics;
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use readalong_core::StoryError;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Story not found: {0}")]
    NotFound(String),

    #[error("Story expired: {0}")]
    Gone(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Story generation failed: {0}")]
    Generation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoryError> for ServerError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::Generation(msg) | StoryError::Parse(msg) => ServerError::Generation(msg),
            StoryError::Storage(msg) => ServerError::Internal(msg),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Gone(_) => StatusCode::GONE,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServerError::NotFound(_) => "Not found".to_string(),
            ServerError::Gone(_) => "Expired".to_string(),
            ServerError::InvalidRequest(msg) => msg.clone(),
            ServerError::Generation(_) | ServerError::Internal(_) => {
                "Internal server error".to_string()
            }
        };
        let status = StatusCode::from(self);
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
