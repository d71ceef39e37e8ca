//! Scenario phases and the forward-only tracker.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::{ScenarioError, ScenarioResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScenarioState {
    Initializing,
    /// Burst worker launched and setup pulse applied.
    TrafficActive,
    /// The tree is ticking and waiting on the trigger.
    WaitingForTrigger,
    CleaningUp,
    Done,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScenarioState::Initializing      => "initializing",
            ScenarioState::TrafficActive     => "traffic-active",
            ScenarioState::WaitingForTrigger => "waiting-for-trigger",
            ScenarioState::CleaningUp        => "cleaning-up",
            ScenarioState::Done              => "done",
        };
        f.write_str(s)
    }
}

struct PhaseLog {
    current: ScenarioState,
    history: Vec<ScenarioState>,
}

/// Current phase plus every phase entered so far.
///
/// Phases only move forward; skipping ahead is allowed.
pub struct PhaseTracker {
    log: Mutex<PhaseLog>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(PhaseLog {
                current: ScenarioState::Initializing,
                history: vec![ScenarioState::Initializing],
            }),
        }
    }

    fn log(&self) -> MutexGuard<'_, PhaseLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> ScenarioState {
        self.log().current
    }

    pub fn history(&self) -> Vec<ScenarioState> {
        self.log().history.clone()
    }

    /// Move to `next`.  `Ok(false)` when already there; an earlier phase
    /// is an error.
    pub fn advance(&self, next: ScenarioState) -> ScenarioResult<bool> {
        let mut log = self.log();
        let from = log.current;
        if next < from {
            return Err(ScenarioError::InvalidTransition { from, to: next });
        }
        if next == from {
            return Ok(false);
        }
        info!(%from, to = %next, "scenario phase");
        log.current = next;
        log.history.push(next);
        Ok(true)
    }

    /// Like [`advance`][Self::advance] but a backwards move is ignored.
    pub fn advance_at_least(&self, next: ScenarioState) {
        let _ = self.advance(next);
    }
}
