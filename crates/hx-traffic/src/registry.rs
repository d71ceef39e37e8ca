//! The record of every actor the scenario spawned.

use std::sync::{Mutex, MutexGuard, PoisonError};

use hx_core::ActorId;
use tracing::warn;

#[derive(Default)]
struct RegistryState {
    ids:    Vec<ActorId>,
    sealed: bool,
}

/// Append-only list of spawned actors, shared between the spawn contexts
/// and the cleanup handler.
///
/// The registry is drained exactly once.  Draining seals it: later appends
/// are refused and handed back so the caller can destroy those actors
/// instead of leaking them.
#[derive(Default)]
pub struct ActorRegistry {
    state: Mutex<RegistryState>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one actor.  Returns `Err(id)` if the registry is sealed.
    pub fn record(&self, id: ActorId) -> Result<(), ActorId> {
        let mut state = self.state();
        if state.sealed {
            return Err(id);
        }
        state.ids.push(id);
        Ok(())
    }

    /// Record actors in order; returns the ids refused because the registry
    /// was already sealed (empty in the normal case).
    pub fn extend(&self, ids: impl IntoIterator<Item = ActorId>) -> Vec<ActorId> {
        let mut state = self.state();
        if state.sealed {
            let refused: Vec<ActorId> = ids.into_iter().collect();
            if !refused.is_empty() {
                warn!(count = refused.len(), "registry sealed, refusing late actors");
            }
            return refused;
        }
        state.ids.extend(ids);
        Vec::new()
    }

    pub fn len(&self) -> usize {
        self.state().ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().ids.is_empty()
    }

    /// Copy of the current contents, in append order.
    pub fn snapshot(&self) -> Vec<ActorId> {
        self.state().ids.clone()
    }

    /// Take every recorded id and seal the registry.  A second drain
    /// returns nothing.
    pub fn drain(&self) -> Vec<ActorId> {
        let mut state = self.state();
        state.sealed = true;
        std::mem::take(&mut state.ids)
    }

    pub fn is_sealed(&self) -> bool {
        self.state().sealed
    }
}
