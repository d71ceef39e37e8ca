//! `LocalWorld` — an in-process [`SimBackend`].
//!
//! Models exactly what the scenario core observes of a real simulator:
//!
//! - a fixed-step setting and a monotonic simulated clock;
//! - a blueprint catalogue;
//! - batched spawn / autopilot / destroy commands with per-command results;
//! - straight-line autopilot kinematics biased by the traffic manager's
//!   global speed difference;
//! - spawn-overlap rejection and edge-triggered collision counting.
//!
//! Time only moves when someone calls [`tick`][SimBackend::tick] (or, in
//! free-running mode, on every [`snapshot`][SimBackend::snapshot] read).
//! All state lives behind one mutex, so every backend call is atomic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hx_core::{ActorId, StepMode, Transform, WorldSettings, WorldSnapshot};
use tracing::{debug, trace};

use crate::{
    ActorRef, BackendError, BackendResult, BlueprintLibrary, Command, CommandError,
    CommandResponse, SimBackend, SpawnActor, TrafficManager,
};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LocalWorldConfig {
    /// Step length used while `fixed_delta_seconds == 0`.
    pub variable_delta_seconds: f64,
    /// Autopilot speed at zero speed difference, m/s.
    pub cruise_speed: f32,
    /// Hard cap on autopilot speed, m/s.
    pub max_speed: f32,
    /// A spawn closer than this (planar metres) to any actor is rejected.
    pub spawn_clearance: f32,
    /// Two actors closer than this register a collision.
    pub collision_radius: f32,
    /// When set, every `snapshot()` read advances the clock by this step.
    pub free_running_step: Option<f64>,
    /// Ports with a traffic manager listening.
    pub traffic_manager_ports: Vec<u16>,
}

impl Default for LocalWorldConfig {
    fn default() -> Self {
        Self {
            variable_delta_seconds: 0.05,
            cruise_speed:           20.0,
            max_speed:              40.0,
            spawn_clearance:        3.0,
            collision_radius:       2.0,
            free_running_step:      None,
            traffic_manager_ports:  vec![8000],
        }
    }
}

/// One submitted batch, kept for inspection.
#[derive(Debug, Clone)]
pub struct BatchRecord {
    pub commands:  Vec<Command>,
    /// `true` for `apply_batch_sync`, `false` for fire-and-forget.
    pub synchronous: bool,
    /// World time at submission.
    pub submitted_at: WorldSnapshot,
}

// ── State ─────────────────────────────────────────────────────────────────────

struct LocalActor {
    blueprint: String,
    transform: Transform,
    /// Traffic manager port driving this actor, if any.
    autopilot: Option<u16>,
}

#[derive(Default)]
struct WorldState {
    settings:         WorldSettings,
    snapshot:         WorldSnapshot,
    next_id:          u32,
    actors:           BTreeMap<ActorId, LocalActor>,
    speed_difference: HashMap<u16, f32>,
    /// Pairs currently in contact (lower id first).
    contacts:         HashSet<(ActorId, ActorId)>,
    collisions:       HashMap<ActorId, u32>,
    batches:          Vec<BatchRecord>,
    settings_history: Vec<WorldSettings>,
}

struct Shared {
    config:  LocalWorldConfig,
    library: BlueprintLibrary,
    state:   Mutex<WorldState>,
}

// ── LocalWorld ────────────────────────────────────────────────────────────────

/// Cheap to clone; clones share one world.
#[derive(Clone)]
pub struct LocalWorld {
    shared: Arc<Shared>,
}

impl Default for LocalWorld {
    fn default() -> Self {
        Self::new(LocalWorldConfig::default())
    }
}

impl LocalWorld {
    /// A world with the [stock][BlueprintLibrary::stock] catalogue.
    pub fn new(config: LocalWorldConfig) -> Self {
        Self::with_library(config, BlueprintLibrary::stock())
    }

    pub fn with_library(config: LocalWorldConfig, library: BlueprintLibrary) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                library,
                state: Mutex::new(WorldState::default()),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, WorldState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Host-side helpers ─────────────────────────────────────────────────

    /// Spawn an actor outside of any batch (e.g. the ego vehicle).
    pub fn spawn_actor(&self, blueprint: &str, transform: Transform) -> CommandResponse {
        let bp = self
            .shared
            .library
            .find(blueprint)
            .cloned()
            .ok_or_else(|| CommandError::UnknownBlueprint(blueprint.to_string()))?;
        let mut state = self.state();
        self.execute(&mut state, Command::Spawn(SpawnActor::new(bp, transform)), None)
    }

    pub fn set_autopilot(&self, actor: ActorId, enabled: bool, tm_port: u16) -> Result<(), CommandError> {
        let mut state = self.state();
        let command = Command::SetAutopilot { actor: ActorRef::Id(actor), enabled, tm_port };
        self.execute(&mut state, command, None).map(|_| ())
    }

    /// Teleport an actor.
    pub fn set_transform(&self, actor: ActorId, transform: Transform) -> Result<(), CommandError> {
        let mut state = self.state();
        let entry = state.actors.get_mut(&actor).ok_or(CommandError::ActorNotFound(actor))?;
        entry.transform = transform;
        Ok(())
    }

    pub fn actor_count(&self) -> usize {
        self.state().actors.len()
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.state().actors.keys().copied().collect()
    }

    pub fn is_alive(&self, actor: ActorId) -> bool {
        self.state().actors.contains_key(&actor)
    }

    /// Blueprint id of a live actor.
    pub fn blueprint_of(&self, actor: ActorId) -> Option<String> {
        self.state().actors.get(&actor).map(|a| a.blueprint.clone())
    }

    pub fn autopilot_port(&self, actor: ActorId) -> Option<u16> {
        self.state().actors.get(&actor).and_then(|a| a.autopilot)
    }

    /// Every batch submitted so far, oldest first.
    pub fn batches(&self) -> Vec<BatchRecord> {
        self.state().batches.clone()
    }

    /// Every settings value applied so far, oldest first.
    pub fn settings_history(&self) -> Vec<WorldSettings> {
        self.state().settings_history.clone()
    }

    pub fn speed_difference(&self, port: u16) -> Option<f32> {
        self.state().speed_difference.get(&port).copied()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn execute(
        &self,
        state:   &mut WorldState,
        command: Command,
        future:  Option<ActorId>,
    ) -> CommandResponse {
        match command {
            Command::Spawn(spawn) => {
                if self.shared.library.find(&spawn.blueprint.id).is_none() {
                    return Err(CommandError::UnknownBlueprint(spawn.blueprint.id));
                }
                let location = spawn.transform.location;
                let clearance = self.shared.config.spawn_clearance;
                let blocked = state
                    .actors
                    .values()
                    .any(|a| a.transform.location.planar_distance(location) < clearance);
                if blocked {
                    return Err(CommandError::SpawnCollision {
                        blueprint: spawn.blueprint.id,
                        location,
                    });
                }

                let id = ActorId(state.next_id);
                state.next_id += 1;
                state.actors.insert(id, LocalActor {
                    blueprint: spawn.blueprint.id,
                    transform: spawn.transform,
                    autopilot: None,
                });

                for follow_up in spawn.then {
                    if let Err(e) = self.execute(state, follow_up, Some(id)) {
                        // A half-configured actor would be invisible to the caller.
                        state.actors.remove(&id);
                        return Err(e);
                    }
                }
                trace!(actor = id.0, %location, "spawned");
                Ok(id)
            }

            Command::SetAutopilot { actor, enabled, tm_port } => {
                let id = match actor {
                    ActorRef::Future => future.ok_or(CommandError::UnresolvedFutureActor)?,
                    ActorRef::Id(id) => id,
                };
                if enabled && !self.shared.config.traffic_manager_ports.contains(&tm_port) {
                    return Err(CommandError::UnknownTrafficManager(tm_port));
                }
                let entry = state.actors.get_mut(&id).ok_or(CommandError::ActorNotFound(id))?;
                entry.autopilot = enabled.then_some(tm_port);
                Ok(id)
            }

            Command::DestroyActor(id) => {
                state.actors.remove(&id).ok_or(CommandError::ActorNotFound(id))?;
                state.contacts.retain(|&(a, b)| a != id && b != id);
                Ok(id)
            }
        }
    }

    fn step_length(&self, state: &WorldState) -> f64 {
        match state.settings.step_mode() {
            StepMode::Fixed(step) => step,
            StepMode::Variable    => self.shared.config.variable_delta_seconds,
        }
    }

    fn advance(&self, state: &mut WorldState, dt: f64) {
        let cfg = &self.shared.config;
        state.snapshot = WorldSnapshot {
            frame:           state.snapshot.frame + 1,
            elapsed_seconds: state.snapshot.elapsed_seconds + dt,
            delta_seconds:   dt,
        };

        let dt = dt as f32;
        let speed_difference = &state.speed_difference;
        for actor in state.actors.values_mut() {
            let Some(port) = actor.autopilot else { continue };
            let pct = speed_difference.get(&port).copied().unwrap_or(0.0);
            let speed = (cfg.cruise_speed * (1.0 - pct / 100.0)).max(0.0).min(cfg.max_speed);
            let (fx, fy) = actor.transform.rotation.forward();
            actor.transform.location.x += fx * speed * dt;
            actor.transform.location.y += fy * speed * dt;
        }

        // Edge-triggered contact detection: O(n²) over a handful of actors.
        let positions: Vec<(ActorId, _)> = state
            .actors
            .iter()
            .map(|(&id, a)| (id, a.transform.location))
            .collect();
        for (i, &(a, la)) in positions.iter().enumerate() {
            for &(b, lb) in &positions[i + 1..] {
                let pair = (a, b);
                if la.planar_distance(lb) < cfg.collision_radius {
                    if state.contacts.insert(pair) {
                        *state.collisions.entry(a).or_default() += 1;
                        *state.collisions.entry(b).or_default() += 1;
                        debug!(a = a.0, b = b.0, "collision");
                    }
                } else {
                    state.contacts.remove(&pair);
                }
            }
        }
    }

    fn run_batch(&self, commands: Vec<Command>, synchronous: bool, do_tick: bool) -> Vec<CommandResponse> {
        let mut state = self.state();
        let submitted_at = state.snapshot;
        state.batches.push(BatchRecord { commands: commands.clone(), synchronous, submitted_at });

        let responses: Vec<CommandResponse> = commands
            .into_iter()
            .map(|command| self.execute(&mut state, command, None))
            .collect();

        if do_tick {
            let dt = self.step_length(&state);
            self.advance(&mut state, dt);
        }
        responses
    }
}

// ── SimBackend ────────────────────────────────────────────────────────────────

impl SimBackend for LocalWorld {
    fn settings(&self) -> WorldSettings {
        self.state().settings
    }

    fn apply_settings(&self, settings: WorldSettings) -> BackendResult<()> {
        settings.validate()?;
        let mut state = self.state();
        state.settings = settings;
        state.settings_history.push(settings);
        debug!(fixed_delta_seconds = settings.fixed_delta_seconds, "settings applied");
        Ok(())
    }

    fn blueprint_library(&self) -> BlueprintLibrary {
        self.shared.library.clone()
    }

    fn apply_batch(&self, commands: Vec<Command>) {
        let failed = self
            .run_batch(commands, false, false)
            .into_iter()
            .filter(Result::is_err)
            .count();
        if failed > 0 {
            debug!(failed, "fire-and-forget batch had failing commands");
        }
    }

    fn apply_batch_sync(&self, commands: Vec<Command>, do_tick: bool) -> Vec<CommandResponse> {
        self.run_batch(commands, true, do_tick)
    }

    fn snapshot(&self) -> WorldSnapshot {
        let mut state = self.state();
        if let Some(step) = self.shared.config.free_running_step {
            self.advance(&mut state, step);
        }
        state.snapshot
    }

    fn tick(&self) -> WorldSnapshot {
        let mut state = self.state();
        let dt = self.step_length(&state);
        self.advance(&mut state, dt);
        state.snapshot
    }

    fn actor_transform(&self, actor: ActorId) -> Option<Transform> {
        self.state().actors.get(&actor).map(|a| a.transform)
    }

    fn collision_count(&self, actor: ActorId) -> u32 {
        self.state().collisions.get(&actor).copied().unwrap_or(0)
    }

    fn traffic_manager(&self, port: u16) -> BackendResult<Box<dyn TrafficManager>> {
        if !self.shared.config.traffic_manager_ports.contains(&port) {
            return Err(BackendError::UnknownTrafficManager(port));
        }
        Ok(Box::new(LocalTrafficManager { world: self.clone(), port }))
    }
}

// ── LocalTrafficManager ───────────────────────────────────────────────────────

struct LocalTrafficManager {
    world: LocalWorld,
    port:  u16,
}

impl TrafficManager for LocalTrafficManager {
    fn port(&self) -> u16 {
        self.port
    }

    fn set_global_percentage_speed_difference(&self, percentage: f32) {
        self.world.state().speed_difference.insert(self.port, percentage);
    }
}
