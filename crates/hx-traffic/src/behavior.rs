use hx_core::SpawnRng;
use hx_tree::{Behavior, Status, TickContext};

use crate::TrafficSpawner;

/// Per-tick traffic leaf: one spawn round per update, then `Success`.
pub struct TrafficBehavior {
    name:    String,
    spawner: TrafficSpawner,
    rng:     SpawnRng,
    rounds:  u32,
    spawned: usize,
}

impl TrafficBehavior {
    pub fn new(spawner: TrafficSpawner, rng: SpawnRng) -> Self {
        Self { name: "TrafficBehavior".to_string(), spawner, rng, rounds: 0, spawned: 0 }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Actors this leaf has spawned over all its rounds.
    pub fn spawned(&self) -> usize {
        self.spawned
    }
}

impl Behavior for TrafficBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, _ctx: &TickContext<'_>) -> Status {
        let report = self.spawner.spawn_round(&mut self.rng);
        self.rounds += 1;
        self.spawned += report.spawned_count();
        Status::Success
    }
}
