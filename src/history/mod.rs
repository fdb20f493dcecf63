//! Question History Store
//!
//! Persists the ids of questions already served so a new round never repeats
//! one. The log is newline-delimited decimal ids, append-only in normal
//! operation and fully truncated by an administrative clear.
//!
//! If the log cannot be opened, or a later read or write fails, the store
//! degrades to [`StoreState::Disabled`]: every operation becomes a no-op and
//! the game keeps running without deduplication.

mod backend;

pub use backend::{FileBackend, HistoryBackend, MemoryBackend};

use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::Path;
use tokio::sync::Mutex;

use crate::types::QuestionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreState {
    Ready,
    Disabled,
}

pub struct QuestionHistoryStore {
    /// `None` once disabled. The lock spans each read-check-append sequence.
    backend: Mutex<Option<Box<dyn HistoryBackend>>>,
}

/// Parse the log, dropping blank and non-numeric lines and duplicates
fn parse_log(content: &str) -> HashSet<QuestionId> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<QuestionId>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::debug!("Ignoring malformed history line: {:?}", line);
                None
            }
        })
        .collect()
}

fn degrade(slot: &mut Option<Box<dyn HistoryBackend>>, operation: &str, err: io::Error) {
    if let Some(backend) = slot.take() {
        tracing::warn!(
            "Question history at {} failed during {}: {}. History disabled, questions may repeat.",
            backend.describe(),
            operation,
            err
        );
    }
}

impl QuestionHistoryStore {
    /// Open the file-backed store at `path`, degrading to disabled when the
    /// path cannot be resolved or created.
    pub async fn open(path: &Path) -> Self {
        match FileBackend::open(path).await {
            Ok(backend) => {
                tracing::info!("Question history at {}", path.display());
                Self::with_backend(Box::new(backend))
            }
            Err(e) => {
                tracing::warn!(
                    "Cannot open question history at {}: {}. History disabled, questions may repeat.",
                    path.display(),
                    e
                );
                Self::disabled()
            }
        }
    }

    pub fn with_backend(backend: Box<dyn HistoryBackend>) -> Self {
        Self {
            backend: Mutex::new(Some(backend)),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    pub fn disabled() -> Self {
        Self {
            backend: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> StoreState {
        if self.backend.lock().await.is_some() {
            StoreState::Ready
        } else {
            StoreState::Disabled
        }
    }

    pub async fn is_used(&self, id: QuestionId) -> bool {
        let mut slot = self.backend.lock().await;
        let Some(backend) = slot.as_ref() else {
            tracing::debug!("History disabled, treating question {} as unused", id);
            return false;
        };

        match backend.read_log().await {
            Ok(content) => parse_log(&content).contains(&id),
            Err(e) => {
                degrade(&mut slot, "is_used", e);
                false
            }
        }
    }

    /// Record `id` as served. Returns `false` when it was already recorded
    /// or the store is disabled.
    pub async fn mark_used(&self, id: QuestionId) -> bool {
        let mut slot = self.backend.lock().await;
        let Some(backend) = slot.as_mut() else {
            tracing::debug!("History disabled, not recording question {}", id);
            return false;
        };

        let content = match backend.read_log().await {
            Ok(content) => content,
            Err(e) => {
                degrade(&mut slot, "mark_used", e);
                return false;
            }
        };
        if parse_log(&content).contains(&id) {
            return false;
        }

        // Keep one id per line even if the log was hand-edited without a trailing newline
        let line = if content.is_empty() || content.ends_with('\n') {
            format!("{}\n", id)
        } else {
            format!("\n{}\n", id)
        };

        match backend.append(&line).await {
            Ok(()) => {
                tracing::debug!("Recorded question {} as used", id);
                true
            }
            Err(e) => {
                degrade(&mut slot, "mark_used", e);
                false
            }
        }
    }

    /// All recorded ids; empty when disabled
    pub async fn load_all(&self) -> HashSet<QuestionId> {
        let mut slot = self.backend.lock().await;
        let Some(backend) = slot.as_ref() else {
            return HashSet::new();
        };

        match backend.read_log().await {
            Ok(content) => parse_log(&content),
            Err(e) => {
                degrade(&mut slot, "load_all", e);
                HashSet::new()
            }
        }
    }

    /// Forget every recorded id
    pub async fn clear(&self) {
        let mut slot = self.backend.lock().await;
        let Some(backend) = slot.as_mut() else {
            tracing::debug!("History disabled, nothing to clear");
            return;
        };

        match backend.truncate().await {
            Ok(()) => tracing::info!("Question history cleared"),
            Err(e) => degrade(&mut slot, "clear", e),
        }
    }
}
