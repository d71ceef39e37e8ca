//! Composite behaviors: `Sequence` and `Parallel`.

use crate::{Behavior, Node, Status, TickContext};

// ── Sequence ──────────────────────────────────────────────────────────────────

/// Runs children in order, resuming at the running child on the next tick.
///
/// - A child `Success` moves on to the next child within the same tick.
/// - A child `Running` makes the sequence `Running`.
/// - A child `Failure` (or `Invalid`) fails the sequence.
/// - All children succeeded (or none exist): `Success`.
///
/// A sequence whose last child never leaves `Running` never completes.
pub struct Sequence {
    name:     String,
    children: Vec<Node>,
    current:  usize,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), children: Vec::new(), current: 0 }
    }

    pub fn with_child(mut self, child: impl Behavior + 'static) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&mut self, child: impl Behavior + 'static) {
        self.children.push(Node::new(child));
    }

    pub fn add_node(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

impl Behavior for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialise(&mut self, _ctx: &TickContext<'_>) {
        self.current = 0;
    }

    fn update(&mut self, ctx: &TickContext<'_>) -> Status {
        while let Some(child) = self.children.get_mut(self.current) {
            match child.tick(ctx) {
                Status::Success => self.current += 1,
                Status::Running => return Status::Running,
                Status::Failure | Status::Invalid => return Status::Failure,
            }
        }
        Status::Success
    }

    fn terminate(&mut self, new_status: Status) {
        if new_status == Status::Invalid {
            for child in &mut self.children {
                child.stop();
            }
        }
    }
}

// ── Parallel ──────────────────────────────────────────────────────────────────

/// When a [`Parallel`] succeeds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// First child to succeed wins; the others are stopped.
    SuccessOnOne,
    /// Every child must have succeeded.
    SuccessOnAll,
}

/// Ticks every unfinished child on each tick.
///
/// Any child `Failure` fails the parallel and stops the rest.  Children that
/// already succeeded are not re-ticked within one activation.  With
/// `SuccessOnOne` and no children the parallel stays `Running`.
pub struct Parallel {
    name:     String,
    policy:   ParallelPolicy,
    children: Vec<Node>,
}

impl Parallel {
    pub fn new(name: impl Into<String>, policy: ParallelPolicy) -> Self {
        Self { name: name.into(), policy, children: Vec::new() }
    }

    pub fn with_child(mut self, child: impl Behavior + 'static) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&mut self, child: impl Behavior + 'static) {
        self.children.push(Node::new(child));
    }

    pub fn add_node(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    fn stop_running(&mut self) {
        for child in &mut self.children {
            if child.status() == Status::Running {
                child.stop();
            }
        }
    }
}

impl Behavior for Parallel {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialise(&mut self, _ctx: &TickContext<'_>) {
        for child in &mut self.children {
            child.stop();
        }
    }

    fn update(&mut self, ctx: &TickContext<'_>) -> Status {
        let mut any_success = false;
        let mut any_failure = false;
        for child in &mut self.children {
            let status = if child.status() == Status::Success {
                Status::Success
            } else {
                child.tick(ctx)
            };
            any_success |= status == Status::Success;
            any_failure |= status == Status::Failure;
        }

        let all_success = self.children.iter().all(|c| c.status() == Status::Success);
        let outcome = if any_failure {
            Status::Failure
        } else {
            match self.policy {
                ParallelPolicy::SuccessOnOne if any_success => Status::Success,
                ParallelPolicy::SuccessOnAll if all_success => Status::Success,
                _ => Status::Running,
            }
        };
        if outcome != Status::Running {
            self.stop_running();
        }
        outcome
    }

    fn terminate(&mut self, new_status: Status) {
        if new_status == Status::Invalid {
            self.stop_running();
        }
    }
}
