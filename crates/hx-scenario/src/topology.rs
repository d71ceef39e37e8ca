//! Builders for the scenario's behavior tree.
//!
//! ```text
//! Sequence "Sequence Behavior"
//! ├── Parallel(SuccessOnOne) "Waiting for end position"
//! │   ├── InTriggerRegion(ego, region)
//! │   ├── [optional] traffic refresh sequence
//! │   └── [optional] skip-ahead sequence
//! └── DestroyActors
//! ```

use std::sync::Arc;

use hx_core::{ActorId, Region, SpawnRng};
use hx_traffic::{TrafficBehavior, TrafficSpawner};
use hx_tree::{InTriggerRegion, Node, Parallel, ParallelPolicy, Sequence, Timeout};

use crate::config::TreeSection;
use crate::{AccelerateSimulation, Cleanup, ClockController, DestroyActors, RestoreSimulation};

/// `[TrafficBehavior, Timeout(wait)] × repeats`, then `Timeout(tail)`.
///
/// Each traffic leaf draws from its own child of `rng`.
pub fn traffic_refresh_sequence(spawner: &TrafficSpawner, rng: &mut SpawnRng, tree: &TreeSection) -> Sequence {
    let mut seq = Sequence::new("Sequence Traffic");
    for i in 0..tree.refresh_repeats {
        seq.add_child(TrafficBehavior::new(spawner.clone(), rng.child(u64::from(i))));
        seq.add_child(Timeout::new(tree.refresh_wait_seconds));
    }
    seq.add_child(Timeout::new(tree.refresh_tail_seconds));
    seq
}

/// `AccelerateSimulation → Timeout(wait) → RestoreSimulation`.
///
/// The restore leaf keeps running, so this branch never finishes on its own.
pub fn skip_ahead_sequence(clock: &ClockController, tree: &TreeSection) -> Sequence {
    Sequence::new("Sequence Skip")
        .with_child(AccelerateSimulation::new(clock.clone()))
        .with_child(Timeout::new(tree.skip_wait_seconds))
        .with_child(RestoreSimulation::new(clock.clone()))
}

/// Race between the trigger and any extra branches; the first success wins.
pub fn end_condition(ego: ActorId, region: Region, branches: Vec<Node>) -> Parallel {
    let mut race = Parallel::new("Waiting for end position", ParallelPolicy::SuccessOnOne)
        .with_child(InTriggerRegion::new(ego, region));
    for branch in branches {
        race.add_node(branch);
    }
    race
}

pub fn behavior(end_condition: Parallel, cleanup: Arc<Cleanup>) -> Sequence {
    Sequence::new("Sequence Behavior")
        .with_child(end_condition)
        .with_child(DestroyActors::new(cleanup))
}
