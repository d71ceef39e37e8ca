//! Drives a scenario's tree against the backend clock.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hx_tree::{Status, TickContext, Verdict};
use tracing::{info, warn};

use crate::{CleanupReport, HighwayCross, ScenarioObserver, ScenarioState};

/// Terminal judgment of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Passed,
    /// Names of the criteria (or the tree) that failed.
    Failed { criteria: Vec<String> },
    /// The tree was still running when the overall timeout elapsed.
    TimedOut,
}

impl ScenarioOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScenarioOutcome::Passed)
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioOutcome::Passed => f.write_str("PASSED"),
            ScenarioOutcome::Failed { criteria } => write!(f, "FAILED ({})", criteria.join(", ")),
            ScenarioOutcome::TimedOut => f.write_str("TIMED OUT"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CriterionReport {
    pub name:     String,
    pub verdict:  Verdict,
    pub expected: f64,
    pub actual:   f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioReport {
    pub name:        String,
    pub outcome:     ScenarioOutcome,
    /// Root status when the loop ended (`Invalid` if it was stopped).
    pub tree_status: Status,
    pub ticks:       u64,
    /// Simulated seconds from the first to the last tick.
    pub sim_seconds: f64,
    pub criteria:    Vec<CriterionReport>,
    pub cleanup:     CleanupReport,
    pub final_state: ScenarioState,
}

/// Ticks the world, the criteria and the tree until the tree finishes, a
/// terminating criterion fails or the overall timeout elapses.
pub struct ScenarioRunner {
    realtime: bool,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self { realtime: false }
    }

    /// Sleep each tick's simulated step in real time.
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn run<O: ScenarioObserver>(&self, scenario: &mut HighwayCross, observer: &mut O) -> ScenarioReport {
        let backend = Arc::clone(scenario.backend());
        let timeout = scenario.timeout_seconds();
        let mut tree = scenario.create_behavior();
        let mut criteria = scenario.create_test_criteria();

        let start = backend.snapshot();
        observer.on_start(&start);
        scenario.phase().advance_at_least(ScenarioState::WaitingForTrigger);

        let mut ticks = 0u64;
        let mut timed_out = false;
        let (tree_status, last) = loop {
            let snapshot = backend.tick();
            let ctx = TickContext::new(ticks, snapshot, backend.as_ref());

            for criterion in criteria.iter_mut() {
                criterion.update(&ctx);
            }
            let status = tree.tick(&ctx);
            observer.on_tick_end(ticks, &snapshot, status);
            ticks += 1;

            if status != Status::Running {
                break (status, snapshot);
            }
            if criteria.iter().any(|c| c.terminate_on_failure() && c.verdict() == Verdict::Failure) {
                warn!("terminating criterion failed, stopping tree");
                tree.stop();
                break (tree.status(), snapshot);
            }
            if snapshot.since(&start) >= timeout {
                warn!(timeout_seconds = timeout, "scenario timed out waiting for the trigger");
                timed_out = true;
                tree.stop();
                break (tree.status(), snapshot);
            }
            if self.realtime {
                pace(snapshot.delta_seconds);
            }
        };

        // Cleanup re-applies the captured settings; variable stepping is the
        // last clock write on every path.
        let first = scenario.cleanup();
        let cleanup = scenario.cleanup_report().unwrap_or(first);
        if let Err(e) = scenario.clock().restore() {
            warn!(error = %e, "failed to restore variable stepping");
        }

        let criteria: Vec<CriterionReport> = criteria
            .iter_mut()
            .map(|c| {
                c.finalise();
                CriterionReport {
                    name:     c.name().to_string(),
                    verdict:  c.verdict(),
                    expected: c.expected_value(),
                    actual:   c.actual_value(),
                }
            })
            .collect();

        let mut failed: Vec<String> = criteria
            .iter()
            .filter(|c| c.verdict == Verdict::Failure)
            .map(|c| c.name.clone())
            .collect();
        if tree_status == Status::Failure {
            failed.push(tree.name().to_string());
        }
        let outcome = if !failed.is_empty() {
            ScenarioOutcome::Failed { criteria: failed }
        } else if timed_out {
            ScenarioOutcome::TimedOut
        } else {
            ScenarioOutcome::Passed
        };

        let report = ScenarioReport {
            name: scenario.name().to_string(),
            outcome,
            tree_status,
            ticks,
            sim_seconds: last.since(&start),
            criteria,
            cleanup,
            final_state: scenario.phase().current(),
        };
        info!(
            scenario = %report.name,
            outcome = %report.outcome,
            ticks = report.ticks,
            sim_seconds = report.sim_seconds,
            "scenario finished"
        );
        observer.on_end(&report);
        report
    }
}

/// Sleep one simulated step of real time.
fn pace(delta_seconds: f64) {
    match Duration::try_from_secs_f64(delta_seconds) {
        Ok(step) if !step.is_zero() => thread::sleep(step),
        Ok(_) => {}
        Err(e) => warn!(delta_seconds, error = %e, "step cannot be paced in real time"),
    }
}
