//! Read-Along Core
//!
//! Shared types, traits and errors for the read-along story player:
//! - Token spans over normalized story text
//! - Playback state and boundary events
//! - Speech engine capability interface
//! - Story and reading-position collaborators

pub mod error;
pub mod playback;
pub mod token;
pub mod traits;

pub use error::{Error, PersistenceError, PlaybackError, Result, StoryError};
pub use playback::{BoundaryEvent, PlaybackMode, PlaybackState};
pub use token::Token;
pub use traits::{
    GeneratedStory, NewStory, PositionStore, ReadingPosition, SpeakOptions, SpeechEngine,
    SpeechEvent, SpeechEventSink, Story, StoryGenerator, StoryLength, StoryLookup,
    StoryRepository, StoryRequest, Utterance, UtteranceId, Voice,
};
