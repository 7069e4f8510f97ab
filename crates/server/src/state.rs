//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use readalong_config::Settings;
use readalong_core::{StoryGenerator, StoryRepository};
use readalong_persistence::InMemoryStoryStore;

use crate::generator::OpenRouterStoryGenerator;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Generated stories with expiry
    pub stories: Arc<dyn StoryRepository>,
    /// Language-model story source
    pub generator: Arc<dyn StoryGenerator>,
}

impl AppState {
    /// In-memory store and the configured completions endpoint
    pub fn new(config: Settings) -> Self {
        let generator = OpenRouterStoryGenerator::new(config.story.clone());
        Self::with_components(config, Arc::new(InMemoryStoryStore::new()), Arc::new(generator))
    }

    pub fn with_components(
        config: Settings,
        stories: Arc<dyn StoryRepository>,
        generator: Arc<dyn StoryGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            stories,
            generator,
        }
    }
}
