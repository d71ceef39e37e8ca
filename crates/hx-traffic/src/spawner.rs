//! One randomized, batched spawn round across the lane slots.

use std::sync::Arc;

use hx_backend::{Blueprint, Command, SimBackend};
use hx_core::{ActorId, HxError, SlotId, SpawnRng, Transform};
use tracing::{debug, error, info, warn};

use crate::{ActorRegistry, LaneLayout, TrafficError, TrafficResult};

/// Traffic manager port the spawned vehicles are handed to.
pub const DEFAULT_TM_PORT: u16 = 8000;
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.5;
pub const DEFAULT_VEHICLE_FILTER: &str = "vehicle.*";

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnerConfig {
    pub tm_port:           u16,
    /// Per-slot Bernoulli probability.
    pub spawn_probability: f64,
    /// Glob pattern over blueprint ids.
    pub vehicle_filter:    String,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            tm_port:           DEFAULT_TM_PORT,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            vehicle_filter:    DEFAULT_VEHICLE_FILTER.to_string(),
        }
    }
}

/// A slot selected for this round and the blueprint drawn for it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedSpawn {
    pub slot:      SlotId,
    pub transform: Transform,
    pub blueprint: Blueprint,
}

/// What one round did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundReport {
    /// Commands submitted (= selected slots).
    pub requested: usize,
    /// Actors created and recorded, in slot order.
    pub spawned:   Vec<ActorId>,
    /// Spawns the backend rejected.
    pub failed:    usize,
    /// Actors created after the registry was sealed; destroyed at once.
    pub refused:   usize,
}

impl RoundReport {
    pub fn spawned_count(&self) -> usize {
        self.spawned.len()
    }
}

/// Builds and submits spawn rounds.
///
/// Cheap to clone: the backend and registry are shared, the catalogue is
/// read once at construction.  Randomness comes from the caller's
/// [`SpawnRng`] so each execution context keeps its own stream.
#[derive(Clone)]
pub struct TrafficSpawner {
    backend:   Arc<dyn SimBackend>,
    registry:  Arc<ActorRegistry>,
    layout:    LaneLayout,
    config:    SpawnerConfig,
    catalogue: Vec<Blueprint>,
}

impl TrafficSpawner {
    /// Reads the vehicle catalogue: blueprints matching the filter, minus
    /// two-wheelers.  Blueprints without a readable `number_of_wheels`
    /// are left out as well.  The spawn probability must lie in `[0, 1]`.
    pub fn new(
        backend:  Arc<dyn SimBackend>,
        layout:   LaneLayout,
        registry: Arc<ActorRegistry>,
        config:   SpawnerConfig,
    ) -> TrafficResult<Self> {
        if !(0.0..=1.0).contains(&config.spawn_probability) {
            return Err(HxError::InvalidProbability(config.spawn_probability).into());
        }
        let catalogue: Vec<Blueprint> = backend
            .blueprint_library()
            .filter(&config.vehicle_filter)?
            .into_iter()
            .filter(|bp| match bp.number_of_wheels() {
                Some(wheels) => wheels != 2,
                None => {
                    debug!(blueprint = %bp.id, "no usable number_of_wheels, skipping");
                    false
                }
            })
            .collect();
        if catalogue.is_empty() {
            return Err(TrafficError::EmptyCatalogue { pattern: config.vehicle_filter });
        }
        info!(blueprints = catalogue.len(), slots = layout.len(), "traffic spawner ready");
        Ok(Self { backend, registry, layout, config, catalogue })
    }

    pub fn catalogue(&self) -> &[Blueprint] {
        &self.catalogue
    }

    pub fn layout(&self) -> &LaneLayout {
        &self.layout
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    pub fn backend(&self) -> &Arc<dyn SimBackend> {
        &self.backend
    }

    /// One Bernoulli trial per slot.
    pub fn draw_round(&self, rng: &mut SpawnRng) -> Vec<bool> {
        rng.bernoulli_mask(self.layout.len(), self.config.spawn_probability)
    }

    /// Pair each selected slot with a random blueprint.  Mask entries past
    /// the last slot are ignored.
    pub fn plan_round(&self, mask: &[bool], rng: &mut SpawnRng) -> Vec<PlannedSpawn> {
        self.layout
            .slots()
            .iter()
            .zip(mask)
            .filter(|(_, selected)| **selected)
            .filter_map(|(slot, _)| {
                rng.choose(&self.catalogue).map(|bp| PlannedSpawn {
                    slot:      slot.id,
                    transform: slot.transform,
                    blueprint: bp.clone(),
                })
            })
            .collect()
    }

    pub fn build_batch(&self, plan: &[PlannedSpawn]) -> Vec<Command> {
        plan.iter()
            .map(|p| Command::spawn_with_autopilot(p.blueprint.clone(), p.transform, self.config.tm_port))
            .collect()
    }

    /// Submit one batch synchronously without ticking.  Successes are
    /// recorded in response order; failures are logged and dropped.
    pub fn submit(&self, batch: Vec<Command>) -> RoundReport {
        let mut report = RoundReport { requested: batch.len(), ..RoundReport::default() };
        if batch.is_empty() {
            return report;
        }

        for (index, response) in self.backend.apply_batch_sync(batch, false).into_iter().enumerate() {
            match response {
                Ok(id) => report.spawned.push(id),
                Err(e) => {
                    error!(index, error = %e, "spawn failed");
                    report.failed += 1;
                }
            }
        }

        let refused = self.registry.extend(report.spawned.iter().copied());
        if !refused.is_empty() {
            warn!(count = refused.len(), "destroying actors spawned after cleanup");
            report.spawned.retain(|id| !refused.contains(id));
            report.refused = refused.len();
            self.backend.apply_batch_sync(Command::destroy_all(&refused), false);
        }
        report
    }

    /// Draw, plan, build and submit one round.
    pub fn spawn_round(&self, rng: &mut SpawnRng) -> RoundReport {
        let mask = self.draw_round(rng);
        self.spawn_with(&mask, rng)
    }

    /// Same as [`spawn_round`][Self::spawn_round] with an explicit mask.
    pub fn spawn_with(&self, mask: &[bool], rng: &mut SpawnRng) -> RoundReport {
        let plan = self.plan_round(mask, rng);
        let batch = self.build_batch(&plan);
        let report = self.submit(batch);
        debug!(
            requested = report.requested,
            spawned = report.spawned_count(),
            failed = report.failed,
            "spawn round"
        );
        report
    }
}
