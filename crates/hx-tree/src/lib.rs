//! `hx-tree` — behavior-tree engine used to script scenarios.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`status`]    | `Status` (`Invalid`, `Running`, `Success`, `Failure`)         |
//! | [`context`]   | `TickContext<'a>` — per-tick snapshot + backend handle        |
//! | [`node`]      | `Behavior` trait, `Node` lifecycle wrapper                    |
//! | [`composite`] | `Sequence`, `Parallel`, `ParallelPolicy`                      |
//! | [`atomic`]    | `Timeout` (simulated-time wait), `InTriggerRegion`            |
//! | [`criteria`]  | `Criterion` trait, `Verdict`, `CollisionTest`                 |
//!
//! # Lifecycle
//!
//! Every behavior is wrapped in a [`Node`].  On each tick:
//!
//! ```text
//! if status != Running: behavior.initialise(ctx)
//! status = behavior.update(ctx)
//! if status != Running: behavior.terminate(status)
//! ```
//!
//! A parent that abandons a running child calls [`Node::stop`], which
//! terminates it with `Invalid`.  Composites forward `stop` to their
//! running children.
//!
//! Criteria are not tree nodes: the scenario runner updates them every tick
//! alongside the tree and judges them independently of the tree's status.

pub mod atomic;
pub mod composite;
pub mod context;
pub mod criteria;
pub mod node;
pub mod status;


pub use atomic::{InTriggerRegion, Timeout};
pub use composite::{Parallel, ParallelPolicy, Sequence};
pub use context::TickContext;
pub use criteria::{CollisionTest, Criterion, Verdict};
pub use node::{Behavior, Node};
pub use status::Status;
