//! Quick notes: one free-text note saved a moment after the last edit.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use todaydo_core::store::keys;
use todaydo_core::{Clock, KvStore, StoreError, SystemClock};
use tokio::task::JoinHandle;

pub const SAVE_DELAY: Duration = Duration::from_secs(1);

/// Save indicator shown next to the note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveStatus {
    pub saving: bool,
    pub last_saved: Option<DateTime<Utc>>,
}

impl SaveStatus {
    /// "Saving...", "Saved just now", "Saved 12s ago", "Saved 3m ago", or
    /// nothing before the first save.
    pub fn describe(&self, now: DateTime<Utc>) -> Option<String> {
        if self.saving {
            return Some("Saving...".to_string());
        }
        let saved = self.last_saved?;
        let seconds = (now - saved).num_seconds().max(0);
        let minutes = seconds / 60;
        Some(if minutes > 0 {
            format!("Saved {}m ago", minutes)
        } else if seconds > 0 {
            format!("Saved {}s ago", seconds)
        } else {
            "Saved just now".to_string()
        })
    }
}

#[derive(Debug, Default)]
struct NotesState {
    text: String,
    status: SaveStatus,
    pending: Option<JoinHandle<()>>,
    /// Bumped on every edit so a stale timer never saves
    generation: u64,
}

struct NotesInner {
    store: KvStore,
    clock: Arc<dyn Clock>,
    delay: Duration,
    state: Mutex<NotesState>,
}

impl NotesInner {
    /// Persist `text` written at `generation`. The saving flag is only
    /// cleared when no newer edit has been made since.
    fn save(&self, text: &str, generation: u64) -> Result<(), StoreError> {
        let result = self.store.set(keys::NOTES, text);
        let mut state = self.state.lock();
        let latest = state.generation == generation;
        if latest {
            state.status.saving = false;
        }
        result?;

        state.status.last_saved = Some(self.clock.now());
        tracing::debug!("Notes saved ({} chars)", text.chars().count());
        Ok(())
    }
}

/// Cloneable handle to the quick note.
#[derive(Clone)]
pub struct QuickNotes {
    inner: Arc<NotesInner>,
}

impl std::fmt::Debug for QuickNotes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickNotes")
            .field("delay", &self.inner.delay)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl QuickNotes {
    pub fn load(store: KvStore) -> Self {
        Self::with_options(store, Arc::new(SystemClock), SAVE_DELAY)
    }

    pub fn with_options(store: KvStore, clock: Arc<dyn Clock>, delay: Duration) -> Self {
        let text: String = store.get(keys::NOTES, String::new());
        Self {
            inner: Arc::new(NotesInner {
                store,
                clock,
                delay,
                state: Mutex::new(NotesState {
                    text,
                    ..NotesState::default()
                }),
            }),
        }
    }

    pub fn text(&self) -> String {
        self.inner.state.lock().text.clone()
    }

    pub fn status(&self) -> SaveStatus {
        self.inner.state.lock().status
    }

    /// Replace the note text and schedule a save after the debounce delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.inner.state.lock();
        state.text = text.clone();
        state.status.saving = true;
        state.generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let generation = state.generation;
        let inner = self.inner.clone();
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            if inner.state.lock().generation != generation {
                return;
            }
            if let Err(e) = inner.save(&text, generation) {
                tracing::error!("Failed to save notes: {}", e);
            }
        }));
    }

    /// Write the current text now, cancelling any scheduled save.
    pub fn flush(&self) -> Result<(), StoreError> {
        let (text, generation) = {
            let mut state = self.inner.state.lock();
            if let Some(pending) = state.pending.take() {
                pending.abort();
            }
            state.generation += 1;
            (state.text.clone(), state.generation)
        };
        self.inner.save(&text, generation)
    }
}
