//! Read-along playback pipeline
//!
//! Drives word-level highlighting from a speech engine's boundary stream,
//! with a timer-driven estimate when the engine reports no boundaries.

pub mod playback;

pub use playback::{
    fallback_interval, highlight, select_voice, BoundaryReconciler, DriveSource,
    DriveSupervisor, FallbackEstimator, HighlightedToken, PlaybackEvent, ReadAlongSession,
    ScrollBehavior, ScrollBlock, ScrollRequest, StubSpeechEngine, Transition,
};
