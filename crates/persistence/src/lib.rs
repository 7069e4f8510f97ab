//! Persistence layer for the read-along player
//!
//! Provides storage for:
//! - Generated stories with a time-to-live
//! - Reading positions of the self-paced reader, one JSON file per content id
//! - Frame-throttled position writes while scrolling

pub mod positions;
pub mod stories;
pub mod throttle;

pub use positions::JsonFilePositionStore;
pub use stories::InMemoryStoryStore;
pub use throttle::ThrottledPositionWriter;

pub use readalong_core::PersistenceError;
