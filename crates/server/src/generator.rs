//! Chat-completions story generator
//!
//! Talks to any OpenAI-compatible chat completions endpoint (OpenRouter by
//! default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use readalong_config::StoryConfig;
use readalong_core::{GeneratedStory, StoryError, StoryGenerator, StoryRequest};

use crate::extract::extract_story_payload;

/// Prompt asking the model for `{title, story}` JSON
pub fn build_prompt(request: &StoryRequest) -> String {
    format!(
        "Create a {} length {} story with the following prompt: \"{}\"\n\
         Please return the output in JSON format with the following structure:\n\
         {{\n  \"title\": \"Generated Title\",\n  \"story\": \"Generated story content...\"\n}}",
        request.length.as_str(),
        request.genre,
        request.prompt
    )
}

/// Story generator backed by a chat completions API
#[derive(Clone)]
pub struct OpenRouterStoryGenerator {
    config: StoryConfig,
    client: Client,
}

impl OpenRouterStoryGenerator {
    pub fn new(config: StoryConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl StoryGenerator for OpenRouterStoryGenerator {
    async fn generate(&self, request: &StoryRequest) -> Result<GeneratedStory, StoryError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StoryError::Generation("story API key not configured".into()))?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": build_prompt(request) }],
        });

        tracing::debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            length = request.length.as_str(),
            genre = %request.genre,
            "Requesting story"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoryError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoryError::Generation(format!(
                "completions request failed ({}): {}",
                status, text
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| StoryError::Parse(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| StoryError::Generation("No content returned from API".into()))?;

        Ok(extract_story_payload(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readalong_core::StoryLength;

    #[test]
    fn test_prompt() {
        let request = StoryRequest {
            length: StoryLength::Short,
            prompt: "a fox learns to fly".into(),
            genre: "fantasy".into(),
        };
        let prompt = build_prompt(&request);
        assert!(prompt.starts_with(
            "Create a short length fantasy story with the following prompt: \"a fox learns to fly\""
        ));
        assert!(prompt.contains("\"title\": \"Generated Title\""));
        assert!(prompt.ends_with('}'));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let generator = OpenRouterStoryGenerator::new(StoryConfig::default());
        let request = StoryRequest {
            length: StoryLength::Medium,
            prompt: "anything".into(),
            genre: "mystery".into(),
        };
        assert!(matches!(
            generator.generate(&request).await,
            Err(StoryError::Generation(_))
        ));
    }
}
