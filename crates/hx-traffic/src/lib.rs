//! `hx-traffic` — populates the road segment with autopilot vehicles.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`registry`] | `ActorRegistry` — scoped, append-only, sealed on drain         |
//! | [`slots`]    | `SpawnSlot`, `LaneLayout` (five lanes at `x = 340`)            |
//! | [`spawner`]  | `TrafficSpawner`, `SpawnerConfig`, `PlannedSpawn`, `RoundReport` |
//! | [`burst`]    | `BurstSpawner` / `BurstHandle` background worker               |
//! | [`behavior`] | `TrafficBehavior` — one spawn round per tree tick              |
//! | [`error`]    | `TrafficError`, `TrafficResult<T>`                             |
//!
//! # Spawn round
//!
//! ```text
//! mask  = one Bernoulli(p) trial per slot
//! plan  = (slot, random blueprint) for every selected slot, slot order kept
//! batch = SpawnActor(blueprint, slot pose).then(SetAutopilot(Future, tm_port))
//! responses = backend.apply_batch_sync(batch, false)
//! Ok(id) -> registry, Err(e) -> logged and dropped
//! ```
//!
//! Both execution contexts (the burst worker thread and the tree) append to
//! the same `Arc<ActorRegistry>`; the registry is the only state they share.

pub mod behavior;
pub mod burst;
pub mod error;
pub mod registry;
pub mod slots;
pub mod spawner;


pub use behavior::TrafficBehavior;
pub use burst::{wait_for_sim_seconds, BurstConfig, BurstHandle, BurstSpawner, BurstSummary};
pub use error::{TrafficError, TrafficResult};
pub use registry::ActorRegistry;
pub use slots::{LaneLayout, SpawnSlot};
pub use spawner::{PlannedSpawn, RoundReport, SpawnerConfig, TrafficSpawner};
