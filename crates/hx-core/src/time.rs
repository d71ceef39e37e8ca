//! Simulated-time model.
//!
//! # Design
//!
//! The backend owns the clock.  Each world update advances simulated time
//! by one step whose length depends on the world's *fixed step* setting:
//!
//!   fixed_delta_seconds == 0  → variable step (as fast as the backend
//!                               computes, backend-chosen length)
//!   fixed_delta_seconds  > 0  → every update advances exactly that much
//!
//! Raising the fixed step compresses idle waits (fewer updates per
//! simulated second); zero restores real-time-consistent stepping.
//!
//! Code that must wait on simulated time reads `WorldSnapshot::elapsed_seconds`,
//! which is monotonic for the lifetime of a world.

use std::fmt;

use crate::{HxError, HxResult};

// ── StepMode ──────────────────────────────────────────────────────────────────

/// Typed view of the fixed-step setting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepMode {
    /// Backend-chosen step length (`fixed_delta_seconds == 0`).
    Variable,
    /// Every update advances by exactly this many simulated seconds.
    Fixed(f64),
}

// ── WorldSettings ─────────────────────────────────────────────────────────────

/// The mutable world settings the core touches.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSettings {
    /// `0.0` means variable step.
    pub fixed_delta_seconds: f64,
}

/// Longest fixed step a world accepts, in simulated seconds.
pub const MAX_FIXED_DELTA_SECONDS: f64 = 10.0;

impl WorldSettings {
    pub const VARIABLE: WorldSettings = WorldSettings { fixed_delta_seconds: 0.0 };

    /// Settings with the given fixed step; `0.0` yields variable stepping.
    pub fn fixed(step: f64) -> HxResult<Self> {
        let settings = Self { fixed_delta_seconds: step };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> HxResult<()> {
        if !(0.0..=MAX_FIXED_DELTA_SECONDS).contains(&self.fixed_delta_seconds) {
            return Err(HxError::InvalidStep(self.fixed_delta_seconds));
        }
        Ok(())
    }

    pub fn step_mode(&self) -> StepMode {
        if self.fixed_delta_seconds > 0.0 {
            StepMode::Fixed(self.fixed_delta_seconds)
        } else {
            StepMode::Variable
        }
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self.step_mode(), StepMode::Variable)
    }
}

// ── WorldSnapshot ─────────────────────────────────────────────────────────────

/// Timestamp of one world update.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct WorldSnapshot {
    /// Update counter since the world was created.
    pub frame: u64,
    /// Simulated seconds since the world was created.  Monotonic.
    pub elapsed_seconds: f64,
    /// Length of the step that produced this snapshot.
    pub delta_seconds: f64,
}

impl WorldSnapshot {
    /// Simulated seconds from `earlier` to `self`, floored at zero.
    #[inline]
    pub fn since(&self, earlier: &WorldSnapshot) -> f64 {
        (self.elapsed_seconds - earlier.elapsed_seconds).max(0.0)
    }
}

impl fmt::Display for WorldSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} @ {:.3}s", self.frame, self.elapsed_seconds)
    }
}
