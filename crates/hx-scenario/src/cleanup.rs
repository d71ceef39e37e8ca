//! Scoped teardown of everything the scenario spawned.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use hx_backend::{Command, SimBackend};
use hx_traffic::{ActorRegistry, BurstHandle, BurstSummary};
use hx_tree::{Behavior, Status, TickContext};
use tracing::{debug, error, info, warn};

use crate::{ClockGuard, PhaseTracker, ScenarioState};

/// What a cleanup did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Destroy commands that succeeded.
    pub destroyed:      usize,
    /// Destroy commands for actors that no longer existed.
    pub stale:          usize,
    /// Burst worker totals, when it stopped within the join timeout.
    pub worker:         Option<BurstSummary>,
    pub clock_restored: bool,
}

#[derive(Default)]
struct CleanupState {
    worker: Option<BurstHandle>,
    report: Option<CleanupReport>,
}

/// Stops the burst worker, destroys every registered actor in one batch
/// and restores the clock.
///
/// [`run`][Self::run] does the work once; later calls return an empty
/// report and touch nothing.
pub struct Cleanup {
    backend:      Arc<dyn SimBackend>,
    registry:     Arc<ActorRegistry>,
    clock:        ClockGuard,
    phase:        Arc<PhaseTracker>,
    join_timeout: Duration,
    state:        Mutex<CleanupState>,
}

impl Cleanup {
    pub fn new(
        backend:      Arc<dyn SimBackend>,
        registry:     Arc<ActorRegistry>,
        clock:        ClockGuard,
        phase:        Arc<PhaseTracker>,
        join_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            registry,
            clock,
            phase,
            join_timeout,
            state: Mutex::new(CleanupState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CleanupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand over the burst worker so cleanup can stop it.
    pub fn attach_worker(&self, handle: BurstHandle) {
        let mut state = self.state();
        if state.report.is_some() {
            // Already cleaned up: stop the newcomer straight away.
            handle.stop();
        }
        state.worker = Some(handle);
    }

    /// Report of the first (working) run, if any.
    pub fn report(&self) -> Option<CleanupReport> {
        self.state().report.clone()
    }

    pub fn run(&self) -> CleanupReport {
        let mut state = self.state();
        if state.report.is_some() {
            return CleanupReport::default();
        }
        self.phase.advance_at_least(ScenarioState::CleaningUp);

        let mut report = CleanupReport::default();

        if let Some(handle) = state.worker.take() {
            match handle.shutdown(self.join_timeout) {
                Ok(summary) => report.worker = summary,
                Err(e) => error!(error = %e, "burst worker ended abnormally"),
            }
        }

        let ids = self.registry.drain();
        if !ids.is_empty() {
            let responses = self.backend.apply_batch_sync(Command::destroy_all(&ids), false);
            for response in responses {
                match response {
                    Ok(_) => report.destroyed += 1,
                    Err(e) => {
                        debug!(error = %e, "destroy of stale actor");
                        report.stale += 1;
                    }
                }
            }
        }

        match self.clock.restore() {
            Ok(()) => report.clock_restored = true,
            Err(e) => warn!(error = %e, "failed to restore clock settings"),
        }

        info!(destroyed = report.destroyed, stale = report.stale, "cleanup finished");
        self.phase.advance_at_least(ScenarioState::Done);
        state.report = Some(report.clone());
        report
    }
}

/// Tree leaf that runs [`Cleanup`] and succeeds.
///
/// The cleanup moves the phase to `CleaningUp` and then `Done`.
pub struct DestroyActors {
    cleanup: Arc<Cleanup>,
}

impl DestroyActors {
    pub fn new(cleanup: Arc<Cleanup>) -> Self {
        Self { cleanup }
    }
}

impl Behavior for DestroyActors {
    fn name(&self) -> &str {
        "DestroyActors"
    }

    fn update(&mut self, _ctx: &TickContext<'_>) -> Status {
        self.cleanup.run();
        Status::Success
    }
}
