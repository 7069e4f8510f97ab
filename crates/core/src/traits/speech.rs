//! Speech synthesis engine interface
//!
//! Models a process-wide speech resource (a browser `speechSynthesis`, an OS
//! TTS service) as an injected capability. Implementations deliver boundary
//! and end notifications for each utterance into the sink handed to `speak`.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};

use crate::BoundaryEvent;

/// Monotonic identifier of an utterance within one session
pub type UtteranceId = u64;

/// An installed synthesis voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP-47 language tag, e.g. `en-US`
    pub lang: String,
    /// Engine's default voice
    #[serde(default)]
    pub is_default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_default: false,
        }
    }
}

/// Caller-facing speak options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakOptions {
    /// Requested voice name (best-effort)
    pub voice_name: Option<String>,
    /// Speech rate multiplier, 1.0 = normal
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

impl SpeakOptions {
    pub fn with_voice(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }
}

/// A fully resolved utterance handed to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    /// Resolved voice; `None` means the engine default
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Notifications emitted by the engine for one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Engine reached a word/sentence boundary
    Boundary(BoundaryEvent),
    /// Utterance finished (naturally or by cancellation)
    End,
}

/// Per-utterance event sink
pub type SpeechEventSink = mpsc::UnboundedSender<SpeechEvent>;

/// Speech synthesis capability
pub trait SpeechEngine: Send + Sync {
    /// Queue an utterance; fire-and-forget
    fn speak(&self, utterance: Utterance, events: SpeechEventSink);

    fn pause(&self);

    fn resume(&self);

    /// Cancel the current and any pending utterance
    fn cancel(&self);

    /// Speaking or has a pending utterance
    fn is_busy(&self) -> bool;

    /// Currently installed voices (may be empty until the engine loads them)
    fn voices(&self) -> Vec<Voice>;

    /// Notification fired whenever the voice list changes
    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()>;
}
