//! The highway-cross scenario.

use std::sync::Arc;

use hx_backend::{Command, SimBackend};
use hx_core::{ActorId, SpawnRng};
use hx_traffic::{ActorRegistry, BurstSpawner, TrafficSpawner};
use hx_tree::{CollisionTest, Criterion, Node};
use tracing::{debug, info};

use crate::config::ScenarioConfig;
use crate::{
    topology, Cleanup, CleanupReport, ClockController, ClockGuard, PhaseTracker, ScenarioResult,
    ScenarioState,
};

/// RNG child offsets, one per execution context.
const BURST_RNG_OFFSET: u64 = 1;
const REFRESH_RNG_OFFSET: u64 = 2;

/// Populates five lanes with autopilot traffic while the ego vehicle drives
/// toward the target region, then tears everything down.
///
/// Construction performs actor setup: the traffic manager is biased, the
/// burst worker starts and the clock pulse is applied.  Dropping the value
/// runs cleanup (if the tree has not already) and removes every other
/// actor registered with the scenario.  The host process is never exited.
pub struct HighwayCross {
    name:         String,
    config:       ScenarioConfig,
    backend:      Arc<dyn SimBackend>,
    ego:          ActorId,
    registry:     Arc<ActorRegistry>,
    phase:        Arc<PhaseTracker>,
    clock:        ClockController,
    cleanup:      Arc<Cleanup>,
    spawner:      TrafficSpawner,
    rng:          SpawnRng,
    other_actors: Vec<ActorId>,
}

impl HighwayCross {
    pub fn new(backend: Arc<dyn SimBackend>, ego: ActorId, config: ScenarioConfig) -> ScenarioResult<Self> {
        config.validate()?;

        let registry = Arc::new(ActorRegistry::new());
        let phase = Arc::new(PhaseTracker::new());
        let clock = ClockController::from_config(Arc::clone(&backend), &config.clock);
        let guard = ClockGuard::capture(Arc::clone(&backend));
        let cleanup = Arc::new(Cleanup::new(
            Arc::clone(&backend),
            Arc::clone(&registry),
            guard,
            Arc::clone(&phase),
            config.join_timeout(),
        ));
        let spawner = TrafficSpawner::new(
            Arc::clone(&backend),
            config.lane_layout(),
            Arc::clone(&registry),
            config.spawner_config(),
        )?;
        let rng = SpawnRng::seeded_or_entropy(config.seed);

        let mut scenario = Self {
            name: "HighwayCross".to_string(),
            config,
            backend,
            ego,
            registry,
            phase,
            clock,
            cleanup,
            spawner,
            rng,
            other_actors: Vec::new(),
        };
        scenario.initialize_actors()?;
        Ok(scenario)
    }

    fn initialize_actors(&mut self) -> ScenarioResult<()> {
        let tm = self.backend.traffic_manager(self.config.traffic.tm_port)?;
        tm.set_global_percentage_speed_difference(self.config.traffic.speed_difference);

        let worker = BurstSpawner::new(
            self.spawner.clone(),
            self.config.burst_config(),
            self.rng.child(BURST_RNG_OFFSET),
        );
        self.cleanup.attach_worker(worker.spawn()?);

        self.clock.pulse()?;
        self.phase.advance(ScenarioState::TrafficActive)?;
        info!(ego = self.ego.0, tm_port = tm.port(), "scenario initialised");
        Ok(())
    }

    /// Build the tree.  Optional branches follow `config.tree`.
    pub fn create_behavior(&mut self) -> Node {
        let mut branches = Vec::new();
        if self.config.tree.traffic_refresh {
            let mut rng = self.rng.child(REFRESH_RNG_OFFSET);
            branches.push(Node::new(topology::traffic_refresh_sequence(&self.spawner, &mut rng, &self.config.tree)));
        }
        if self.config.tree.skip_ahead {
            branches.push(Node::new(topology::skip_ahead_sequence(&self.clock, &self.config.tree)));
        }
        debug!(branches = branches.len() + 1, "end condition branches");
        let race = topology::end_condition(self.ego, self.config.trigger.region, branches);
        Node::new(topology::behavior(race, Arc::clone(&self.cleanup)))
    }

    pub fn create_test_criteria(&self) -> Vec<Box<dyn Criterion>> {
        vec![Box::new(CollisionTest::new(self.ego))]
    }

    /// Register a framework-owned actor to be destroyed on teardown.
    pub fn register_other_actor(&mut self, actor: ActorId) {
        self.other_actors.push(actor);
    }

    /// Destroy every registered other actor.  Returns how many were destroyed.
    pub fn remove_all_actors(&mut self) -> usize {
        if self.other_actors.is_empty() {
            return 0;
        }
        let ids = std::mem::take(&mut self.other_actors);
        self.backend
            .apply_batch_sync(Command::destroy_all(&ids), false)
            .into_iter()
            .filter(Result::is_ok)
            .count()
    }

    /// Run cleanup now (idempotent).
    pub fn cleanup(&self) -> CleanupReport {
        self.cleanup.run()
    }

    pub fn cleanup_report(&self) -> Option<CleanupReport> {
        self.cleanup.report()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ego(&self) -> ActorId {
        self.ego
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn SimBackend> {
        &self.backend
    }

    pub fn clock(&self) -> &ClockController {
        &self.clock
    }

    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    pub fn phase(&self) -> &Arc<PhaseTracker> {
        &self.phase
    }

    pub fn timeout_seconds(&self) -> f64 {
        self.config.timeout_seconds
    }
}

impl Drop for HighwayCross {
    fn drop(&mut self) {
        self.cleanup.run();
        let removed = self.remove_all_actors();
        debug!(removed, "scenario dropped");
    }
}
