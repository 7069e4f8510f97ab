//! Read-along session controller
//!
//! Owns one story text, its token table and the playback state machine:
//!
//! ```text
//! Idle --speak--> Speaking --pause--> Paused --resume--> Speaking
//!                    |  ^
//!       grace expiry |  | first boundary
//!                    v  |
//!                  Fallback
//! any --stop / end of utterance--> Idle
//! ```
//!
//! All timers (grace period, estimator ticks) and the voices-changed
//! subscription are tasks owned by the session and aborted on stop, on a new
//! utterance, and on teardown.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use readalong_config::PlaybackConfig;
use readalong_core::{
    BoundaryEvent, PlaybackError, PlaybackMode, PlaybackState, SpeakOptions, SpeechEngine,
    SpeechEvent, Token, Utterance, UtteranceId, Voice,
};
use readalong_text_processing::{normalize, tokenize_all, NormalizedText};

use super::{
    fallback_interval, highlight, select_voice, BoundaryReconciler, DriveSupervisor,
    FallbackEstimator, ScrollRequest, Transition,
};

/// Session events for renderers and controls
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Mode changed
    ModeChanged { old: PlaybackMode, new: PlaybackMode },
    /// Highlighted word changed
    ActiveTokenChanged { index: Option<usize> },
    /// Bring the active word into view
    ScrollIntoView(ScrollRequest),
    /// Utterance handed to the engine
    UtteranceStarted { id: UtteranceId },
    /// Utterance finished or was cancelled
    UtteranceEnded { id: UtteranceId },
    /// Story text replaced
    TextChanged { tokens: usize },
    /// Installed voices changed
    VoicesChanged { voices: Vec<Voice> },
}

#[derive(Debug, Clone, Copy)]
struct CurrentUtterance {
    id: UtteranceId,
    rate: f32,
}

#[derive(Default)]
struct UtteranceTasks {
    events: Option<JoinHandle<()>>,
    grace: Option<JoinHandle<()>>,
    tick: Option<JoinHandle<()>>,
    /// Bumped whenever the estimator task is replaced or aborted
    tick_generation: u64,
}

impl UtteranceTasks {
    fn abort_grace(&mut self) {
        if let Some(handle) = self.grace.take() {
            handle.abort();
        }
    }

    fn abort_tick(&mut self) {
        self.tick_generation += 1;
        if let Some(handle) = self.tick.take() {
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        self.abort_grace();
        self.abort_tick();
        if let Some(handle) = self.events.take() {
            handle.abort();
        }
    }

    fn timers_running(&self) -> bool {
        [&self.grace, &self.tick]
            .into_iter()
            .flatten()
            .any(|handle| !handle.is_finished())
    }
}

struct Shared {
    text: NormalizedText,
    tokens: Arc<[Token]>,
    state: PlaybackState,
    char_index: i64,
    supervisor: DriveSupervisor,
    current: Option<CurrentUtterance>,
    next_id: UtteranceId,
    paused_from: Option<PlaybackMode>,
    voices: Vec<Voice>,
    tasks: UtteranceTasks,
    voices_listener: Option<JoinHandle<()>>,
}

impl Shared {
    fn is_current(&self, id: UtteranceId) -> bool {
        self.current.map(|c| c.id) == Some(id)
    }
}

struct SessionInner {
    config: PlaybackConfig,
    engine: Option<Arc<dyn SpeechEngine>>,
    reconciler: BoundaryReconciler,
    shared: Mutex<Shared>,
    event_tx: broadcast::Sender<PlaybackEvent>,
}

/// Read-along playback for one story
///
/// Must be created inside a Tokio runtime. Dropping the session stops
/// playback and releases every timer and subscription.
pub struct ReadAlongSession {
    inner: Arc<SessionInner>,
}

impl ReadAlongSession {
    /// Create a session; `engine = None` means the host cannot synthesize speech
    pub fn new(
        raw_text: &str,
        engine: Option<Arc<dyn SpeechEngine>>,
        config: PlaybackConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let text = normalize(raw_text);
        let tokens: Arc<[Token]> = tokenize_all(&text).into();
        let voices = engine.as_ref().map(|e| e.voices()).unwrap_or_default();

        if engine.is_none() {
            tracing::warn!("Speech synthesis unavailable, read-along limited to text display");
        }

        let inner = Arc::new(SessionInner {
            reconciler: BoundaryReconciler::new(config.lead_chars),
            config,
            engine,
            shared: Mutex::new(Shared {
                text,
                tokens,
                state: PlaybackState::idle(),
                char_index: -1,
                supervisor: DriveSupervisor::new(),
                current: None,
                next_id: 0,
                paused_from: None,
                voices,
                tasks: UtteranceTasks::default(),
                voices_listener: None,
            }),
            event_tx,
        });

        if let Some(engine) = &inner.engine {
            let rx = engine.subscribe_voices_changed();
            let listener = tokio::spawn(watch_voices(Arc::downgrade(&inner), rx));
            inner.shared.lock().voices_listener = Some(listener);
        }

        Self { inner }
    }

    /// Whether the host can speak at all
    pub fn is_supported(&self) -> bool {
        self.inner.engine.is_some()
    }

    /// Start speaking the story, cancelling any utterance already active
    pub fn speak(&self, options: SpeakOptions) -> Result<UtteranceId, PlaybackError> {
        self.inner.speak(options)
    }

    pub fn pause(&self) {
        self.inner.pause();
    }

    pub fn resume(&self) {
        self.inner.resume();
    }

    /// Stop playback and clear the highlight
    pub fn stop(&self) {
        let mut shared = self.inner.shared.lock();
        self.inner.halt(&mut shared);
        self.inner.settle_idle(&mut shared);
    }

    /// Replace the story text; playback resets to idle
    pub fn set_text(&self, raw_text: &str) {
        let mut shared = self.inner.shared.lock();
        self.inner.halt(&mut shared);
        self.inner.settle_idle(&mut shared);

        let text = normalize(raw_text);
        let table = tokenize_all(&text);
        let tokens = table.len();
        shared.text = text;
        shared.tokens = table.into();
        let _ = self.inner.event_tx.send(PlaybackEvent::TextChanged { tokens });
    }

    /// Tear the session down; also runs on drop
    pub fn close(&self) {
        self.inner.close();
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.shared.lock().state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state().mode
    }

    pub fn active_token_index(&self) -> Option<usize> {
        self.state().active_token_index
    }

    /// Last raw offset reported by the engine, -1 when none
    pub fn char_index(&self) -> i64 {
        self.inner.shared.lock().char_index
    }

    /// Normalized text as handed to the engine
    pub fn text(&self) -> NormalizedText {
        self.inner.shared.lock().text.clone()
    }

    pub fn tokens(&self) -> Arc<[Token]> {
        self.inner.shared.lock().tokens.clone()
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.inner.shared.lock().voices.clone()
    }

    /// Emphasis flag per token for the current highlight
    pub fn active_flags(&self) -> Vec<bool> {
        let shared = self.inner.shared.lock();
        highlight(&shared.tokens, shared.state.active_token_index)
            .map(|h| h.is_active)
            .collect()
    }

    /// Grace or estimator timers still scheduled
    pub fn has_pending_timers(&self) -> bool {
        self.inner.shared.lock().tasks.timers_running()
    }
}

impl Drop for ReadAlongSession {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl SessionInner {
    fn grace_period(&self) -> Duration {
        Duration::from_millis(self.config.grace_period_ms)
    }

    fn speak(self: &Arc<Self>, options: SpeakOptions) -> Result<UtteranceId, PlaybackError> {
        let engine = self.engine.clone().ok_or(PlaybackError::Unsupported)?;
        let mut shared = self.shared.lock();
        if shared.text.is_empty() {
            return Err(PlaybackError::EmptyText);
        }

        self.halt(&mut shared);

        shared.next_id += 1;
        let id = shared.next_id;
        let rate = options.rate.unwrap_or(self.config.default_rate);
        let pitch = options.pitch.unwrap_or(self.config.default_pitch);
        let voice = select_voice(
            &engine.voices(),
            options.voice_name.as_deref(),
            self.config.preferred_voice.as_deref(),
        );

        shared.current = Some(CurrentUtterance { id, rate });
        self.set_active(&mut shared, None);
        self.set_mode(&mut shared, PlaybackMode::Speaking);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let weak = Arc::downgrade(self);
        shared.tasks.events = Some(tokio::spawn(pump_engine_events(weak.clone(), id, events_rx)));
        shared.tasks.grace = Some(tokio::spawn(grace_timer(weak, id, self.grace_period())));

        tracing::debug!(
            utterance = id,
            rate,
            voice = ?voice.as_ref().map(|v| v.name.as_str()),
            "Starting utterance"
        );
        let _ = self.event_tx.send(PlaybackEvent::UtteranceStarted { id });

        engine.speak(
            Utterance {
                id,
                text: shared.text.to_string(),
                voice,
                rate,
                pitch,
            },
            events_tx,
        );
        Ok(id)
    }

    fn pause(&self) {
        let mut shared = self.shared.lock();
        let mode = shared.state.mode;
        if !mode.is_active() {
            return;
        }
        if let Some(engine) = &self.engine {
            engine.pause();
        }
        shared.tasks.abort_grace();
        shared.tasks.abort_tick();
        shared.paused_from = Some(mode);
        self.set_mode(&mut shared, PlaybackMode::Paused);
    }

    fn resume(self: &Arc<Self>) {
        let mut shared = self.shared.lock();
        if shared.state.mode != PlaybackMode::Paused {
            return;
        }
        let Some(current) = shared.current else {
            return;
        };
        if let Some(engine) = &self.engine {
            engine.resume();
        }

        match shared.paused_from.take() {
            Some(PlaybackMode::Fallback) => self.start_estimator(&mut shared, current),
            _ => {
                self.set_mode(&mut shared, PlaybackMode::Speaking);
                if !shared.supervisor.boundary_seen() {
                    let grace = tokio::spawn(grace_timer(
                        Arc::downgrade(self),
                        current.id,
                        self.grace_period(),
                    ));
                    shared.tasks.grace = Some(grace);
                }
            }
        }
    }

    fn close(&self) {
        let mut shared = self.shared.lock();
        self.halt(&mut shared);
        self.settle_idle(&mut shared);
        if let Some(listener) = shared.voices_listener.take() {
            listener.abort();
            tracing::debug!("Read-along session closed");
        }
    }

    /// Cancel the active utterance and every timer it owns
    fn halt(&self, shared: &mut Shared) {
        shared.tasks.abort_all();
        if let Some(engine) = &self.engine {
            if engine.is_busy() {
                engine.cancel();
            }
        }
        if let Some(previous) = shared.current.take() {
            tracing::debug!(utterance = previous.id, "Utterance cancelled");
            let _ = self.event_tx.send(PlaybackEvent::UtteranceEnded { id: previous.id });
        }
        shared.supervisor.reset();
        shared.char_index = -1;
        shared.paused_from = None;
    }

    fn settle_idle(&self, shared: &mut Shared) {
        self.set_active(shared, None);
        self.set_mode(shared, PlaybackMode::Idle);
    }

    fn on_boundary(&self, id: UtteranceId, event: BoundaryEvent) {
        let mut shared = self.shared.lock();
        if !shared.is_current(id) {
            tracing::trace!(utterance = id, "Ignoring boundary from superseded utterance");
            return;
        }

        shared.tasks.abort_grace();
        if shared.supervisor.on_boundary() == Transition::StopEstimator {
            shared.tasks.abort_tick();
            tracing::debug!(utterance = id, "Engine boundaries resumed, estimator stopped");
            let mode = shared.state.mode;
            match mode {
                PlaybackMode::Fallback => self.set_mode(&mut shared, PlaybackMode::Speaking),
                PlaybackMode::Paused => shared.paused_from = Some(PlaybackMode::Speaking),
                _ => {}
            }
        }

        shared.char_index = event.char_index;
        let active = self.reconciler.resolve(event.char_index, &shared.tokens);
        self.set_active(&mut shared, active);
    }

    fn on_end(&self, id: UtteranceId) {
        let mut shared = self.shared.lock();
        if !shared.is_current(id) {
            return;
        }

        shared.tasks.abort_grace();
        shared.tasks.abort_tick();
        // Called from the event pump itself, which exits right after
        shared.tasks.events.take();

        shared.current = None;
        shared.supervisor.reset();
        shared.char_index = -1;
        shared.paused_from = None;
        self.settle_idle(&mut shared);

        tracing::debug!(utterance = id, "Utterance finished");
        let _ = self.event_tx.send(PlaybackEvent::UtteranceEnded { id });
    }

    fn on_grace_elapsed(self: &Arc<Self>, id: UtteranceId) {
        let mut shared = self.shared.lock();
        if !shared.is_current(id) {
            return;
        }
        shared.tasks.grace.take();

        if shared.state.mode != PlaybackMode::Speaking {
            return;
        }
        if shared.supervisor.on_grace_elapsed() == Transition::StartEstimator {
            tracing::info!(
                utterance = id,
                grace_ms = self.config.grace_period_ms,
                "No boundary events from engine, estimating position"
            );
            if let Some(current) = shared.current {
                self.start_estimator(&mut shared, current);
            }
        }
    }

    fn start_estimator(self: &Arc<Self>, shared: &mut Shared, current: CurrentUtterance) {
        let estimator = FallbackEstimator::new(&shared.tokens, shared.state.active_token_index);
        let period = fallback_interval(current.rate, &self.config);

        self.set_mode(shared, PlaybackMode::Fallback);
        shared.tasks.abort_tick();
        shared.tasks.tick = Some(tokio::spawn(estimate_ticks(
            Arc::downgrade(self),
            current.id,
            shared.tasks.tick_generation,
            estimator,
            period,
        )));
    }

    /// Apply an estimated position; false once the estimate is no longer wanted
    fn on_estimated_tick(&self, id: UtteranceId, generation: u64, index: usize) -> bool {
        let mut shared = self.shared.lock();
        if !shared.is_current(id)
            || shared.tasks.tick_generation != generation
            || !shared.supervisor.accepts_estimate()
            || shared.state.mode != PlaybackMode::Fallback
        {
            return false;
        }
        self.set_active(&mut shared, Some(index));
        true
    }

    fn refresh_voices(&self) {
        let Some(engine) = &self.engine else {
            return;
        };
        let voices = engine.voices();
        tracing::debug!(count = voices.len(), "Voice list refreshed");
        self.shared.lock().voices = voices.clone();
        let _ = self.event_tx.send(PlaybackEvent::VoicesChanged { voices });
    }

    fn set_active(&self, shared: &mut Shared, index: Option<usize>) {
        if shared.state.active_token_index == index {
            return;
        }
        shared.state.active_token_index = index;
        let _ = self.event_tx.send(PlaybackEvent::ActiveTokenChanged { index });
        if let Some(index) = index {
            let _ = self
                .event_tx
                .send(PlaybackEvent::ScrollIntoView(ScrollRequest::centered(index)));
        }
    }

    fn set_mode(&self, shared: &mut Shared, new: PlaybackMode) {
        let old = shared.state.mode;
        if old == new {
            return;
        }
        shared.state.mode = new;
        tracing::debug!(old = old.as_str(), new = new.as_str(), "Playback mode changed");
        let _ = self.event_tx.send(PlaybackEvent::ModeChanged { old, new });
    }
}

async fn pump_engine_events(
    inner: Weak<SessionInner>,
    id: UtteranceId,
    mut events: mpsc::UnboundedReceiver<SpeechEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        match event {
            SpeechEvent::Boundary(boundary) => inner.on_boundary(id, boundary),
            SpeechEvent::End => {
                inner.on_end(id);
                break;
            }
        }
    }
}

async fn grace_timer(inner: Weak<SessionInner>, id: UtteranceId, grace: Duration) {
    tokio::time::sleep(grace).await;
    if let Some(inner) = inner.upgrade() {
        inner.on_grace_elapsed(id);
    }
}

async fn estimate_ticks(
    inner: Weak<SessionInner>,
    id: UtteranceId,
    generation: u64,
    mut estimator: FallbackEstimator,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let Some(index) = estimator.advance() else {
            tracing::debug!(utterance = id, "Estimator reached the last word");
            break;
        };
        if !inner.on_estimated_tick(id, generation, index) {
            break;
        }
    }
}

async fn watch_voices(inner: Weak<SessionInner>, mut changes: broadcast::Receiver<()>) {
    loop {
        match changes.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                inner.refresh_voices();
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StubSpeechEngine;

    fn session(text: &str) -> (ReadAlongSession, Arc<StubSpeechEngine>) {
        let engine = Arc::new(StubSpeechEngine::default());
        let session = ReadAlongSession::new(text, Some(engine.clone()), PlaybackConfig::default());
        (session, engine)
    }

    #[tokio::test]
    async fn test_session_creation() {
        let (session, _engine) = session("  The **quick** fox ");
        assert!(session.is_supported());
        assert_eq!(session.text().as_str(), "The quick fox");
        assert_eq!(session.tokens().len(), 5);
        assert_eq!(session.state(), PlaybackState::idle());
        assert_eq!(session.char_index(), -1);
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let (session, engine) = session("   ");
        assert_eq!(session.speak(SpeakOptions::default()), Err(PlaybackError::EmptyText));
        assert!(engine.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_speak_uses_normalized_text_and_defaults() {
        let (session, engine) = session("\u{201C}Hi\u{201D}\tthere");
        let id = session.speak(SpeakOptions::default().with_rate(1.5)).unwrap();
        assert_eq!(session.mode(), PlaybackMode::Speaking);

        let spoken = engine.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].id, id);
        assert_eq!(spoken[0].text, "\"Hi\" there");
        assert_eq!(spoken[0].rate, 1.5);
        assert_eq!(spoken[0].pitch, 1.0);
    }

    #[tokio::test]
    async fn test_pause_outside_playback_is_noop() {
        let (session, engine) = session("The quick fox");
        session.pause();
        session.resume();
        assert_eq!(session.mode(), PlaybackMode::Idle);
        assert!(!engine.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_estimator_ticks_are_ignored() {
        let (session, _engine) = session("The quick fox");
        let id = session.speak(SpeakOptions::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(801)).await;
        assert_eq!(session.mode(), PlaybackMode::Fallback);
        assert_eq!(session.active_token_index(), Some(0));

        let stale = session.inner.shared.lock().tasks.tick_generation;
        session.pause();
        session.resume();
        assert_eq!(session.mode(), PlaybackMode::Fallback);

        // A tick from the estimator running before the pause lands late
        assert!(!session.inner.on_estimated_tick(id, stale, 4));
        assert_eq!(session.active_token_index(), Some(0));

        let live = session.inner.shared.lock().tasks.tick_generation;
        assert_ne!(live, stale);
        assert!(session.inner.on_estimated_tick(id, live, 4));
        assert_eq!(session.active_token_index(), Some(4));
    }
}
