//! Frame-throttled position writer
//!
//! Scroll handlers fire far more often than positions need saving. The writer
//! keeps only the latest position and flushes it at most once per frame.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use readalong_config::ReaderConfig;
use readalong_core::{PositionStore, ReadingPosition};

#[derive(Default)]
struct Pending {
    latest: Option<ReadingPosition>,
    flush: Option<JoinHandle<()>>,
}

/// Coalesces position updates for one content key
pub struct ThrottledPositionWriter {
    store: Arc<dyn PositionStore>,
    key: String,
    frame: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl ThrottledPositionWriter {
    pub fn new(store: Arc<dyn PositionStore>, key: impl Into<String>, frame: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            frame,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Writer flushing at the configured frame interval
    pub fn from_config(
        store: Arc<dyn PositionStore>,
        key: impl Into<String>,
        config: &ReaderConfig,
    ) -> Self {
        Self::new(store, key, Duration::from_millis(config.frame_interval_ms))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Saved position for this key, if any; unreadable data counts as none
    pub fn restore(&self) -> Option<ReadingPosition> {
        match self.store.load(&self.key) {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Ignoring unreadable reading position"
                );
                None
            }
        }
    }

    /// Record a position; written on the next frame boundary
    ///
    /// Must be called within a Tokio runtime.
    pub fn record(&self, position: ReadingPosition) {
        let mut pending = self.pending.lock();
        pending.latest = Some(position);
        if pending.flush.is_some() {
            return;
        }

        let shared = Arc::clone(&self.pending);
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let frame = self.frame;
        pending.flush = Some(tokio::spawn(async move {
            tokio::time::sleep(frame).await;
            let latest = {
                let mut pending = shared.lock();
                pending.flush = None;
                pending.latest.take()
            };
            if let Some(position) = latest {
                write(store.as_ref(), &key, position);
            }
        }));
    }

    /// Write any pending position immediately
    pub fn flush(&self) {
        let latest = {
            let mut pending = self.pending.lock();
            if let Some(handle) = pending.flush.take() {
                handle.abort();
            }
            pending.latest.take()
        };
        if let Some(position) = latest {
            write(self.store.as_ref(), &self.key, position);
        }
    }
}

impl Drop for ThrottledPositionWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

fn write(store: &dyn PositionStore, key: &str, position: ReadingPosition) {
    if let Err(e) = store.save(key, position) {
        tracing::warn!(key, error = %e, "Failed to save reading position");
    }
}
