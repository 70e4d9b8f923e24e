//! Thread-safe handle to a [`HoloGraph`].
//!
//! Every call takes the lock, so `learn` and `ask` from different threads
//! are serialized. Readers that need many queries without contending can
//! take a [`snapshot`](SharedHoloGraph::snapshot).

use std::sync::{Arc, Mutex, MutexGuard};

use crate::vsa::ops::VsaResult;

use super::{Answer, HoloGraph, HoloStats};

/// Cloneable, mutex-serialized [`HoloGraph`].
#[derive(Clone)]
pub struct SharedHoloGraph {
    inner: Arc<Mutex<HoloGraph>>,
}

impl SharedHoloGraph {
    pub fn new(graph: HoloGraph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    // A panic while holding the lock leaves the graph in a state that is
    // still structurally valid, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HoloGraph> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn learn(&self, subject: &str, relation: &str, object: &str) -> VsaResult<()> {
        self.lock().learn(subject, relation, object)
    }

    pub fn ask(&self, subject: &str, relation: &str) -> VsaResult<Answer> {
        self.lock().ask(subject, relation)
    }

    pub fn fact_count(&self) -> usize {
        self.lock().fact_count()
    }

    pub fn concept_count(&self) -> usize {
        self.lock().concept_count()
    }

    pub fn stats(&self) -> VsaResult<HoloStats> {
        self.lock().stats()
    }

    /// Clone the current graph with its hologram already rebuilt.
    pub fn snapshot(&self) -> VsaResult<HoloGraph> {
        let mut guard = self.lock();
        guard.hologram()?;
        Ok((*guard).clone())
    }

    /// Run `f` with exclusive access to the graph.
    pub fn with<R>(&self, f: impl FnOnce(&mut HoloGraph) -> R) -> R {
        f(&mut *self.lock())
    }
}

impl From<HoloGraph> for SharedHoloGraph {
    fn from(graph: HoloGraph) -> Self {
        Self::new(graph)
    }
}

impl std::fmt::Debug for SharedHoloGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedHoloGraph").finish_non_exhaustive()
    }
}
