//! Runner observer trait for progress reporting.

use hx_core::WorldSnapshot;
use hx_tree::Status;

use crate::ScenarioReport;

/// Callbacks invoked by [`ScenarioRunner::run`][crate::ScenarioRunner::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait ScenarioObserver {
    /// Called once before the first tick.
    fn on_start(&mut self, _snapshot: &WorldSnapshot) {}

    /// Called after the criteria and the tree were ticked.
    fn on_tick_end(&mut self, _tick: u64, _snapshot: &WorldSnapshot, _status: Status) {}

    /// Called once after cleanup, with the final report.
    fn on_end(&mut self, _report: &ScenarioReport) {}
}

/// A [`ScenarioObserver`] that does nothing.
pub struct NoopObserver;

impl ScenarioObserver for NoopObserver {}
