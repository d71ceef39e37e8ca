//! Per-tick state passed to every behavior callback.

use hx_backend::SimBackend;
use hx_core::WorldSnapshot;

/// What a behavior can see during one tick.
///
/// Built once per tick by the scenario runner and shared (immutably) with
/// every node and criterion ticked in that iteration.
pub struct TickContext<'a> {
    /// Tree tick counter, starting at 0.
    pub tick: u64,

    /// World timestamp for this tick.  All simulated-time waits measure
    /// against `snapshot.elapsed_seconds`.
    pub snapshot: WorldSnapshot,

    /// The world, for leaves that query or command it.
    pub backend: &'a dyn SimBackend,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(tick: u64, snapshot: WorldSnapshot, backend: &'a dyn SimBackend) -> Self {
        Self { tick, snapshot, backend }
    }

    #[inline]
    pub fn elapsed_seconds(&self) -> f64 {
        self.snapshot.elapsed_seconds
    }
}
