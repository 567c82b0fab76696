//! Durable player progress.
//!
//! Three scalars survive restarts: level, current experience and the
//! number of completed challenges. Stores are best-effort caches; callers
//! fall back to defaults when a read fails and ignore failed writes.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_LEVEL: u32 = 1;

/// The persisted part of the leveling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub level: u32,
    pub current_experience: u64,
    pub challenges_completed: u64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            current_experience: 0,
            challenges_completed: 0,
        }
    }
}

/// Somewhere to keep [`Progress`] between sessions.
pub trait ProgressStore: Send {
    /// Read the stored progress. Absent values come back as defaults.
    fn load(&self) -> Result<Progress>;

    /// Overwrite the stored progress.
    fn save(&mut self, progress: &Progress) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    progress: Option<Progress>,
    saves: usize,
    failing: bool,
}

/// In-process store. Clones share the same slot, so a test can keep a
/// handle and inspect what a session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `progress`.
    pub fn with_progress(progress: Progress) -> Self {
        let store = Self::default();
        store.lock().progress = Some(progress);
        store
    }

    /// A store whose reads and writes always fail.
    pub fn failing() -> Self {
        let store = Self::default();
        store.lock().failing = true;
        store
    }

    /// Last saved progress, if any.
    pub fn stored(&self) -> Option<Progress> {
        self.lock().progress
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Progress> {
        let inner = self.lock();
        if inner.failing {
            return Err(std::io::Error::other("memory store unavailable").into());
        }
        Ok(inner.progress.unwrap_or_default())
    }

    fn save(&mut self, progress: &Progress) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing {
            return Err(std::io::Error::other("memory store unavailable").into());
        }
        inner.progress = Some(*progress);
        inner.saves += 1;
        Ok(())
    }
}
