//! Simulation clock control: fast-forward, restore and the setup pulse.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hx_backend::{BackendResult, SimBackend};
use hx_core::WorldSettings;
use hx_tree::{Behavior, Status, TickContext};
use tracing::{debug, error};

use crate::config::ClockSection;

/// Changes the world's fixed step.
#[derive(Clone)]
pub struct ClockController {
    backend:         Arc<dyn SimBackend>,
    accelerate_step: f64,
    pulse_step:      f64,
    pulse_hold:      Duration,
}

impl ClockController {
    pub fn new(backend: Arc<dyn SimBackend>) -> Self {
        Self::from_config(backend, &ClockSection::default())
    }

    pub fn from_config(backend: Arc<dyn SimBackend>, clock: &ClockSection) -> Self {
        Self {
            backend,
            accelerate_step: clock.accelerate_step,
            pulse_step:      clock.pulse_step,
            pulse_hold:      clock.pulse_hold(),
        }
    }

    fn set_step(&self, step: f64) -> BackendResult<()> {
        let settings = WorldSettings::fixed(step)?;
        self.backend.apply_settings(settings)?;
        debug!(fixed_delta_seconds = step, "clock step set");
        Ok(())
    }

    /// Fixed step 0.05 by default.
    pub fn accelerate(&self) -> BackendResult<()> {
        self.set_step(self.accelerate_step)
    }

    /// Back to variable stepping.
    pub fn restore(&self) -> BackendResult<()> {
        self.set_step(0.0)
    }

    /// Apply the pulse step, hold it for the configured real time so
    /// pending spawns register, then restore variable stepping.
    pub fn pulse(&self) -> BackendResult<()> {
        self.set_step(self.pulse_step)?;
        thread::sleep(self.pulse_hold);
        self.restore()
    }
}

/// Remembers the settings in effect at setup so cleanup can put them back.
pub struct ClockGuard {
    backend: Arc<dyn SimBackend>,
    saved:   WorldSettings,
}

impl ClockGuard {
    pub fn capture(backend: Arc<dyn SimBackend>) -> Self {
        let saved = backend.settings();
        Self { backend, saved }
    }

    pub fn restore(&self) -> BackendResult<()> {
        self.backend.apply_settings(self.saved)
    }
}

// ── Leaves ────────────────────────────────────────────────────────────────────

pub struct AccelerateSimulation {
    clock: ClockController,
}

impl AccelerateSimulation {
    pub fn new(clock: ClockController) -> Self {
        Self { clock }
    }
}

impl Behavior for AccelerateSimulation {
    fn name(&self) -> &str {
        "AccelerateSimulation"
    }

    fn update(&mut self, _ctx: &TickContext<'_>) -> Status {
        match self.clock.accelerate() {
            Ok(()) => Status::Success,
            Err(e) => {
                error!(error = %e, "failed to accelerate simulation");
                Status::Failure
            }
        }
    }
}

/// Restores variable stepping on every update.
///
/// Reports `Running` forever unless built with
/// [`completing`][Self::completing], so a sequence ending in the default
/// variant never finishes.
pub struct RestoreSimulation {
    clock:      ClockController,
    completing: bool,
}

impl RestoreSimulation {
    pub fn new(clock: ClockController) -> Self {
        Self { clock, completing: false }
    }

    /// Variant that reports `Success` once the clock is restored.
    pub fn completing(clock: ClockController) -> Self {
        Self { clock, completing: true }
    }
}

impl Behavior for RestoreSimulation {
    fn name(&self) -> &str {
        "RestoreSimulation"
    }

    fn update(&mut self, _ctx: &TickContext<'_>) -> Status {
        if let Err(e) = self.clock.restore() {
            error!(error = %e, "failed to restore simulation clock");
            return Status::Failure;
        }
        if self.completing { Status::Success } else { Status::Running }
    }
}
