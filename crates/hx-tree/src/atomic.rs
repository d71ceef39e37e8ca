//! Leaf behaviors provided by the framework.

use hx_core::{ActorId, Region};
use tracing::debug;

use crate::{Behavior, Status, TickContext};

// ── Timeout ───────────────────────────────────────────────────────────────────

/// Waits a fixed number of *simulated* seconds, then succeeds.
///
/// The clock starts on activation (`initialise`), so a re-activated wait
/// starts over.
pub struct Timeout {
    name:     String,
    duration: f64,
    start:    f64,
}

impl Timeout {
    pub fn new(duration_secs: f64) -> Self {
        Self::named(format!("Timeout({duration_secs}s)"), duration_secs)
    }

    pub fn named(name: impl Into<String>, duration_secs: f64) -> Self {
        Self { name: name.into(), duration: duration_secs, start: 0.0 }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

impl Behavior for Timeout {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialise(&mut self, ctx: &TickContext<'_>) {
        self.start = ctx.elapsed_seconds();
    }

    fn update(&mut self, ctx: &TickContext<'_>) -> Status {
        if ctx.elapsed_seconds() - self.start >= self.duration {
            Status::Success
        } else {
            Status::Running
        }
    }
}

// ── InTriggerRegion ───────────────────────────────────────────────────────────

/// Succeeds once `actor`'s ground-plane position lies inside `region`
/// (bounds inclusive).  An actor the backend does not know keeps the
/// trigger `Running`.
pub struct InTriggerRegion {
    name:   String,
    actor:  ActorId,
    region: Region,
}

impl InTriggerRegion {
    pub fn new(actor: ActorId, region: Region) -> Self {
        Self { name: "InTriggerRegion".to_string(), actor, region }
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

impl Behavior for InTriggerRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, ctx: &TickContext<'_>) -> Status {
        match ctx.backend.actor_transform(self.actor) {
            Some(t) if self.region.contains(t.location) => {
                debug!(actor = self.actor.0, location = %t.location, region = %self.region, "trigger region reached");
                Status::Success
            }
            _ => Status::Running,
        }
    }
}
