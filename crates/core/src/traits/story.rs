//! Story collaborator interfaces

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::StoryError;

/// Requested story length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl StoryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryLength::Short => "short",
            StoryLength::Medium => "medium",
            StoryLength::Long => "long",
        }
    }
}

/// Story generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    #[serde(default)]
    pub length: StoryLength,
    pub prompt: String,
    pub genre: String,
}

/// Output of the language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStory {
    pub title: String,
    pub story: String,
}

/// Story about to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub body: String,
    pub ttl: Duration,
}

/// A persisted story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    pub body: String,
    pub expires_at: DateTime<Utc>,
}

impl Story {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Outcome of a story lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryLookup {
    Found(Story),
    NotFound,
    Expired,
}

/// Story persistence with time-to-live
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Persist a story and return its id
    async fn create(&self, story: NewStory) -> Result<String, StoryError>;

    /// Look a story up, distinguishing unknown from expired
    async fn get(&self, id: &str) -> Result<StoryLookup, StoryError>;

    /// Drop expired rows, returning how many were removed
    async fn purge_expired(&self) -> Result<usize, StoryError>;
}

/// Language-model backed story generator
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, request: &StoryRequest) -> Result<GeneratedStory, StoryError>;
}
