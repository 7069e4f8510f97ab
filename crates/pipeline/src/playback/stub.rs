//! Scriptable in-process speech engine
//!
//! Produces no audio. Records every call and lets the caller inject boundary
//! and end notifications, which makes it usable both as a silent engine on
//! hosts without synthesis and as a test double.

use parking_lot::Mutex;
use tokio::sync::broadcast;

use readalong_core::{BoundaryEvent, SpeechEngine, SpeechEvent, SpeechEventSink, Utterance, Voice};

#[derive(Default)]
struct StubState {
    voices: Vec<Voice>,
    spoken: Vec<(Utterance, SpeechEventSink)>,
    busy: bool,
    paused: bool,
    cancels: usize,
}

/// Engine that never speaks and reports only what it is told to
pub struct StubSpeechEngine {
    state: Mutex<StubState>,
    voices_tx: broadcast::Sender<()>,
}

impl StubSpeechEngine {
    pub fn new(voices: Vec<Voice>) -> Self {
        let (voices_tx, _) = broadcast::channel(8);
        Self {
            state: Mutex::new(StubState {
                voices,
                ..Default::default()
            }),
            voices_tx,
        }
    }

    /// Replace the installed voices and fire the change notification
    pub fn set_voices(&self, voices: Vec<Voice>) {
        self.state.lock().voices = voices;
        let _ = self.voices_tx.send(());
    }

    /// Send a boundary for the most recent utterance
    pub fn emit_boundary(&self, char_index: i64) -> bool {
        let state = self.state.lock();
        match state.spoken.last() {
            Some((_, sink)) => sink
                .send(SpeechEvent::Boundary(BoundaryEvent::new(char_index)))
                .is_ok(),
            None => false,
        }
    }

    /// Send a boundary for the n-th utterance ever spoken
    pub fn emit_boundary_to(&self, nth: usize, char_index: i64) -> bool {
        let state = self.state.lock();
        match state.spoken.get(nth) {
            Some((_, sink)) => sink
                .send(SpeechEvent::Boundary(BoundaryEvent::new(char_index)))
                .is_ok(),
            None => false,
        }
    }

    /// Finish the most recent utterance
    pub fn finish(&self) -> bool {
        let mut state = self.state.lock();
        state.busy = false;
        state.paused = false;
        match state.spoken.last() {
            Some((_, sink)) => sink.send(SpeechEvent::End).is_ok(),
            None => false,
        }
    }

    /// Utterances handed to the engine, oldest first
    pub fn spoken(&self) -> Vec<Utterance> {
        self.state.lock().spoken.iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().cancels
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Live voices-changed subscriptions
    pub fn voice_subscribers(&self) -> usize {
        self.voices_tx.receiver_count()
    }
}

impl Default for StubSpeechEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SpeechEngine for StubSpeechEngine {
    fn speak(&self, utterance: Utterance, events: SpeechEventSink) {
        tracing::debug!(
            utterance = utterance.id,
            chars = utterance.text.len(),
            "Stub engine speaking"
        );
        let mut state = self.state.lock();
        state.busy = true;
        state.paused = false;
        state.spoken.push((utterance, events));
    }

    fn pause(&self) {
        self.state.lock().paused = true;
    }

    fn resume(&self) {
        self.state.lock().paused = false;
    }

    fn cancel(&self) {
        let mut state = self.state.lock();
        state.busy = false;
        state.paused = false;
        state.cancels += 1;
    }

    fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    fn voices(&self) -> Vec<Voice> {
        self.state.lock().voices.clone()
    }

    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()> {
        self.voices_tx.subscribe()
    }
}
