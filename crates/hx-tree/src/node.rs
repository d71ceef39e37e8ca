//! The `Behavior` trait and the `Node` wrapper that drives its lifecycle.

use tracing::trace;

use crate::{Status, TickContext};

/// A tree leaf or composite.
///
/// Only [`update`][Self::update] is required.  `initialise` runs before the
/// first update of each activation; `terminate` runs when the behavior
/// finishes (`Success` / `Failure`) or is interrupted (`Invalid`).
///
/// # Thread safety
///
/// Trees are built on one thread and ticked on another (the scenario
/// runner), so behaviors must be `Send`.
pub trait Behavior: Send {
    fn name(&self) -> &str;

    fn initialise(&mut self, _ctx: &TickContext<'_>) {}

    fn update(&mut self, ctx: &TickContext<'_>) -> Status;

    fn terminate(&mut self, _new_status: Status) {}
}

/// Owns one behavior and remembers its last status.
pub struct Node {
    behavior: Box<dyn Behavior>,
    status:   Status,
}

impl Node {
    pub fn new(behavior: impl Behavior + 'static) -> Self {
        Self::boxed(Box::new(behavior))
    }

    pub fn boxed(behavior: Box<dyn Behavior>) -> Self {
        Self { behavior, status: Status::Invalid }
    }

    pub fn name(&self) -> &str {
        self.behavior.name()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn tick(&mut self, ctx: &TickContext<'_>) -> Status {
        if self.status != Status::Running {
            self.behavior.initialise(ctx);
        }
        let status = self.behavior.update(ctx);
        if status != self.status {
            trace!(node = self.behavior.name(), from = %self.status, to = %status, "status change");
        }
        self.status = status;
        if status != Status::Running {
            self.behavior.terminate(status);
        }
        status
    }

    /// Interrupt: a running behavior is terminated with `Invalid`.
    pub fn stop(&mut self) {
        if self.status == Status::Running {
            self.behavior.terminate(Status::Invalid);
        }
        self.status = Status::Invalid;
    }
}
