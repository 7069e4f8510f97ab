//! Capability interfaces
//!
//! The playback controller never touches a global speech engine or storage
//! backend directly; everything is injected through these traits.

mod position;
mod speech;
mod story;

pub use position::{PositionStore, ReadingPosition};
pub use speech::{
    SpeakOptions, SpeechEngine, SpeechEvent, SpeechEventSink, Utterance, UtteranceId, Voice,
};
pub use story::{
    GeneratedStory, NewStory, Story, StoryGenerator, StoryLength, StoryLookup, StoryRepository,
    StoryRequest,
};
