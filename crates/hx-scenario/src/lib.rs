//! `hx-scenario` — the highway-cross scenario and its runner.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`config`]   | `ScenarioConfig` and its sections (JSON, `#[serde(default)]`)     |
//! | [`clock`]    | `ClockController`, `ClockGuard`, `AccelerateSimulation`, `RestoreSimulation` |
//! | [`phase`]    | `ScenarioState`, `PhaseTracker` (forward-only)                    |
//! | [`cleanup`]  | `Cleanup`, `CleanupReport`, `DestroyActors` leaf                  |
//! | [`topology`] | tree builders: refresh / skip-ahead branches, end condition       |
//! | [`scenario`] | `HighwayCross` — setup, behavior, criteria, teardown              |
//! | [`runner`]   | `ScenarioRunner`, `ScenarioReport`, `ScenarioOutcome`             |
//! | [`observer`] | `ScenarioObserver` trait, `NoopObserver`                          |
//! | [`error`]    | `ScenarioError`, `ScenarioResult<T>`                              |
//!
//! # Run loop
//!
//! ```text
//! scenario = HighwayCross::new(backend, ego, config)   // TM bias, burst worker, clock pulse
//! loop:
//!     snapshot = backend.tick()
//!     criteria.update(ctx); status = tree.tick(ctx); observer.on_tick_end(..)
//!     stop on: status != Running | terminating criterion failed | timeout
//! clock.restore(); cleanup.run()                       // idempotent
//! outcome from criteria (+ timeout)
//! ```

pub mod cleanup;
pub mod clock;
pub mod config;
pub mod error;
pub mod observer;
pub mod phase;
pub mod runner;
pub mod scenario;
pub mod topology;

#[cfg(test)]
mod tests;

pub use cleanup::{Cleanup, CleanupReport, DestroyActors};
pub use clock::{AccelerateSimulation, ClockController, ClockGuard, RestoreSimulation};
pub use config::ScenarioConfig;
pub use error::{ScenarioError, ScenarioResult};
pub use observer::{NoopObserver, ScenarioObserver};
pub use phase::{PhaseTracker, ScenarioState};
pub use runner::{CriterionReport, ScenarioOutcome, ScenarioReport, ScenarioRunner};
pub use scenario::HighwayCross;
