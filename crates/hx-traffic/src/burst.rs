//! Background burst-mode traffic worker.
//!
//! The worker runs a fixed number of spawn rounds on its own thread.  After
//! each round it waits until the *simulated* clock has advanced by the
//! round interval, polling the backend with a bounded sleep.  The tree
//! thread changes the clock step while the worker runs, so pacing follows
//! whatever step is in effect.
//!
//! Shutdown is cooperative: [`BurstHandle::stop`] raises a flag the worker
//! checks before each round and on every poll, and
//! [`BurstHandle::shutdown`] waits for the completion signal for a bounded
//! time before joining.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use hx_backend::SimBackend;
use hx_core::SpawnRng;
use tracing::{debug, info, warn};

use crate::{TrafficError, TrafficResult, TrafficSpawner};

pub const DEFAULT_BURST_ROUNDS: u32 = 24;
/// Simulated seconds between the starts of consecutive rounds.
pub const DEFAULT_ROUND_INTERVAL_SECS: f64 = 5.0;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, PartialEq)]
pub struct BurstConfig {
    pub rounds:              u32,
    pub round_interval_secs: f64,
    /// Real-time sleep between clock polls.
    pub poll_interval:       Duration,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            rounds:              DEFAULT_BURST_ROUNDS,
            round_interval_secs: DEFAULT_ROUND_INTERVAL_SECS,
            poll_interval:       DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Totals reported by a worker that ran to completion or was stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BurstSummary {
    pub rounds:  u32,
    pub spawned: usize,
    pub failed:  usize,
    /// `true` when the stop flag ended the worker before its last round.
    pub stopped: bool,
}

/// Block until simulated time reaches `start + secs`.
///
/// Returns `false` if `stop` was raised first.
pub fn wait_for_sim_seconds(
    backend: &dyn SimBackend,
    start:   f64,
    secs:    f64,
    poll:    Duration,
    stop:    &AtomicBool,
) -> bool {
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        if backend.snapshot().elapsed_seconds - start >= secs {
            return true;
        }
        thread::sleep(poll);
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct WorkerShared {
    stop:     AtomicBool,
    rounds:   AtomicU32,
    finished: AtomicBool,
}

pub struct BurstSpawner {
    spawner: TrafficSpawner,
    config:  BurstConfig,
    rng:     SpawnRng,
}

impl BurstSpawner {
    pub fn new(spawner: TrafficSpawner, config: BurstConfig, rng: SpawnRng) -> Self {
        Self { spawner, config, rng }
    }

    /// Start the worker thread.
    pub fn spawn(self) -> TrafficResult<BurstHandle> {
        let shared = Arc::new(WorkerShared::default());
        let (done_tx, done_rx) = bounded::<BurstSummary>(1);

        let worker_shared = Arc::clone(&shared);
        let join = thread::Builder::new()
            .name("hx-burst-spawner".to_string())
            .spawn(move || self.run(&worker_shared, &done_tx))
            .map_err(TrafficError::WorkerSpawn)?;

        Ok(BurstHandle { shared, done: done_rx, join: Some(join) })
    }

    fn run(mut self, shared: &WorkerShared, done: &Sender<BurstSummary>) {
        let backend = Arc::clone(self.spawner.backend());
        let mut summary = BurstSummary::default();

        for round in 0..self.config.rounds {
            if shared.stop.load(Ordering::Acquire) {
                summary.stopped = true;
                break;
            }
            let round_start = backend.snapshot().elapsed_seconds;
            let report = self.spawner.spawn_round(&mut self.rng);
            summary.rounds += 1;
            summary.spawned += report.spawned_count();
            summary.failed += report.failed;
            shared.rounds.store(summary.rounds, Ordering::Release);
            info!(round, spawned = report.spawned_count(), failed = report.failed, "burst round");

            let waited = wait_for_sim_seconds(
                backend.as_ref(),
                round_start,
                self.config.round_interval_secs,
                self.config.poll_interval,
                &shared.stop,
            );
            if !waited {
                summary.stopped = round + 1 < self.config.rounds;
                break;
            }
        }

        debug!(rounds = summary.rounds, spawned = summary.spawned, "burst worker finished");
        shared.finished.store(true, Ordering::Release);
        let _ = done.send(summary);
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Control handle for a running burst worker.
pub struct BurstHandle {
    shared: Arc<WorkerShared>,
    done:   Receiver<BurstSummary>,
    join:   Option<JoinHandle<()>>,
}

impl BurstHandle {
    /// Ask the worker to stop at its next check.  Does not block.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Ordering::Acquire)
    }

    pub fn rounds_completed(&self) -> u32 {
        self.shared.rounds.load(Ordering::Acquire)
    }

    /// Wait up to `timeout` for the worker to finish its rounds.
    ///
    /// On timeout the worker is stopped and its thread detached, as with
    /// [`shutdown`][Self::shutdown].
    pub fn wait(self, timeout: Duration) -> TrafficResult<Option<BurstSummary>> {
        self.finish(timeout)
    }

    /// Stop the worker and wait up to `timeout` for it to exit.
    ///
    /// `Ok(None)` means the worker did not answer in time; its thread is
    /// detached.
    pub fn shutdown(self, timeout: Duration) -> TrafficResult<Option<BurstSummary>> {
        self.stop();
        self.finish(timeout)
    }

    fn finish(mut self, timeout: Duration) -> TrafficResult<Option<BurstSummary>> {
        let summary = match self.done.recv_timeout(timeout) {
            Ok(summary) => summary,
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "burst worker did not stop in time, detaching");
                self.stop();
                self.join.take();
                return Ok(None);
            }
            Err(RecvTimeoutError::Disconnected) => {
                // The sender is dropped without a message only on panic.
                if let Some(join) = self.join.take() {
                    let _ = join.join();
                }
                return Err(TrafficError::WorkerPanicked);
            }
        };
        if let Some(join) = self.join.take() {
            join.join().map_err(|_| TrafficError::WorkerPanicked)?;
        }
        Ok(Some(summary))
    }
}

impl Drop for BurstHandle {
    fn drop(&mut self) {
        // A dropped handle stops its worker.
        if self.join.is_some() {
            self.stop();
        }
    }
}
