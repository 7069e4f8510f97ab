//! Story store with expiry

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use readalong_core::{NewStory, Story, StoryError, StoryLookup, StoryRepository};

/// Process-local story store
///
/// Expired stories stay addressable (reported as `Expired`) until
/// [`StoryRepository::purge_expired`] removes them.
#[derive(Default)]
pub struct InMemoryStoryStore {
    stories: RwLock<HashMap<String, Story>>,
}

impl InMemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.read().is_empty()
    }

    fn lookup_at(&self, id: &str, now: DateTime<Utc>) -> StoryLookup {
        match self.stories.read().get(id) {
            None => StoryLookup::NotFound,
            Some(story) if story.is_expired_at(now) => StoryLookup::Expired,
            Some(story) => StoryLookup::Found(story.clone()),
        }
    }

    fn purge_at(&self, now: DateTime<Utc>) -> usize {
        let mut stories = self.stories.write();
        let before = stories.len();
        stories.retain(|_, story| !story.is_expired_at(now));
        before - stories.len()
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryStore {
    async fn create(&self, story: NewStory) -> Result<String, StoryError> {
        let id = uuid::Uuid::new_v4().to_string();
        let expires_at = Utc::now() + story.ttl;

        self.stories.write().insert(
            id.clone(),
            Story {
                id: id.clone(),
                title: story.title,
                body: story.body,
                expires_at,
            },
        );

        tracing::debug!(story_id = %id, %expires_at, "Story stored");
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<StoryLookup, StoryError> {
        Ok(self.lookup_at(id, Utc::now()))
    }

    async fn purge_expired(&self) -> Result<usize, StoryError> {
        let removed = self.purge_at(Utc::now());
        if removed > 0 {
            tracing::info!(removed, "Purged expired stories");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_story(title: &str, ttl: Duration) -> NewStory {
        NewStory {
            title: title.to_string(),
            body: "Once upon a time.".to_string(),
            ttl,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryStoryStore::new();
        let id = store.create(new_story("Dragons", Duration::minutes(180))).await.unwrap();

        match store.get(&id).await.unwrap() {
            StoryLookup::Found(story) => {
                assert_eq!(story.id, id);
                assert_eq!(story.title, "Dragons");
                assert!(story.expires_at > Utc::now() + Duration::minutes(179));
            }
            other => panic!("expected story, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_and_expired() {
        let store = InMemoryStoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), StoryLookup::NotFound);

        let id = store.create(new_story("Old", Duration::minutes(-1))).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), StoryLookup::Expired);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = InMemoryStoryStore::new();
        let a = store.create(new_story("A", Duration::minutes(5))).await.unwrap();
        let b = store.create(new_story("B", Duration::minutes(5))).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryStoryStore::new();
        let live = store.create(new_story("Live", Duration::minutes(5))).await.unwrap();
        store.create(new_story("Gone", Duration::minutes(-5))).await.unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(matches!(store.get(&live).await.unwrap(), StoryLookup::Found(_)));

        let later = Utc::now() + Duration::minutes(10);
        assert_eq!(store.lookup_at(&live, later), StoryLookup::Expired);
        assert_eq!(store.purge_at(later), 1);
        assert!(store.is_empty());
    }
}
