//! Read-along playback
//!
//! Features:
//! - Lead-corrected boundary reconciliation with nearest-word snapping
//! - Two-source drive supervision (engine boundaries vs. estimator)
//! - Rate-derived fallback cadence when boundaries never arrive
//! - Best-effort voice selection
//! - Session controller enforcing one utterance at a time

mod estimator;
mod highlight;
mod reconciler;
mod session;
mod stub;
mod supervisor;
mod voices;

pub use estimator::{fallback_interval, FallbackEstimator};
pub use highlight::{highlight, HighlightedToken, ScrollBehavior, ScrollBlock, ScrollRequest};
pub use reconciler::BoundaryReconciler;
pub use session::{PlaybackEvent, ReadAlongSession};
pub use stub::StubSpeechEngine;
pub use supervisor::{DriveSource, DriveSupervisor, Transition};
pub use voices::select_voice;
