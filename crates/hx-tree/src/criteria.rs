//! Pass/fail criteria evaluated alongside the tree.

use std::fmt;

use hx_core::ActorId;
use tracing::warn;

use crate::TickContext;

/// A criterion's current judgment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Still being evaluated; becomes `Success` at finalisation unless it failed.
    #[default]
    Running,
    Success,
    Failure,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Running => "RUNNING",
            Verdict::Success => "SUCCESS",
            Verdict::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}

/// A test criterion.
///
/// The runner calls [`update`][Self::update] every tick, whatever the tree
/// is doing, and [`finalise`][Self::finalise] once at the end.
pub trait Criterion: Send {
    fn name(&self) -> &str;

    /// The actor under test.
    fn actor(&self) -> ActorId;

    fn update(&mut self, ctx: &TickContext<'_>);

    fn verdict(&self) -> Verdict;

    fn expected_value(&self) -> f64;

    fn actual_value(&self) -> f64;

    /// When `true`, a `Failure` verdict ends the scenario immediately.
    fn terminate_on_failure(&self) -> bool {
        false
    }

    /// Close evaluation: a criterion that never failed passes.
    fn finalise(&mut self);
}

// ── CollisionTest ─────────────────────────────────────────────────────────────

/// Fails as soon as the actor has been involved in any collision.
pub struct CollisionTest {
    actor:                ActorId,
    collisions:           u32,
    verdict:              Verdict,
    terminate_on_failure: bool,
}

impl CollisionTest {
    pub fn new(actor: ActorId) -> Self {
        Self { actor, collisions: 0, verdict: Verdict::Running, terminate_on_failure: false }
    }

    pub fn with_terminate_on_failure(mut self, terminate: bool) -> Self {
        self.terminate_on_failure = terminate;
        self
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }
}

impl Criterion for CollisionTest {
    fn name(&self) -> &str {
        "CollisionTest"
    }

    fn actor(&self) -> ActorId {
        self.actor
    }

    fn update(&mut self, ctx: &TickContext<'_>) {
        let count = ctx.backend.collision_count(self.actor);
        if count > self.collisions {
            warn!(actor = self.actor.0, collisions = count, "collision detected");
        }
        self.collisions = count;
        if count > 0 {
            self.verdict = Verdict::Failure;
        }
    }

    fn verdict(&self) -> Verdict {
        self.verdict
    }

    fn expected_value(&self) -> f64 {
        0.0
    }

    fn actual_value(&self) -> f64 {
        f64::from(self.collisions)
    }

    fn terminate_on_failure(&self) -> bool {
        self.terminate_on_failure
    }

    fn finalise(&mut self) {
        if self.verdict == Verdict::Running {
            self.verdict = Verdict::Success;
        }
    }
}
