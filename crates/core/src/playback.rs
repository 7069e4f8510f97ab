//! Playback state shared between the session controller and renderers

use serde::{Deserialize, Serialize};

/// Playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Nothing is playing
    #[default]
    Idle,
    /// Utterance active, highlighting driven by boundary events
    Speaking,
    /// Utterance paused
    Paused,
    /// Utterance active, highlighting driven by the fallback estimator
    Fallback,
}

impl PlaybackMode {
    /// An utterance is currently audible (real or estimated)
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackMode::Speaking | PlaybackMode::Fallback)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackMode::Idle => "idle",
            PlaybackMode::Speaking => "speaking",
            PlaybackMode::Paused => "paused",
            PlaybackMode::Fallback => "fallback",
        }
    }
}

/// Snapshot of playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Index into the token table of the highlighted word, `None` when nothing is active
    pub active_token_index: Option<usize>,
    pub mode: PlaybackMode,
}

impl PlaybackState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Active index in the `-1 = none` convention used by web renderers
    pub fn active_index_or_negative(&self) -> i64 {
        self.active_token_index.map(|i| i as i64).unwrap_or(-1)
    }
}

/// Character offset notification from the speech engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryEvent {
    /// Offset (in characters) into the spoken text; engines may report
    /// negative or out-of-range values
    pub char_index: i64,
}

impl BoundaryEvent {
    pub fn new(char_index: i64) -> Self {
        Self { char_index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_state() {
        let state = PlaybackState::idle();
        assert_eq!(state.mode, PlaybackMode::Idle);
        assert_eq!(state.active_index_or_negative(), -1);
    }

    #[test]
    fn test_mode_activity() {
        assert!(PlaybackMode::Speaking.is_active());
        assert!(PlaybackMode::Fallback.is_active());
        assert!(!PlaybackMode::Paused.is_active());
        assert_eq!(PlaybackMode::Fallback.as_str(), "fallback");
    }
}
