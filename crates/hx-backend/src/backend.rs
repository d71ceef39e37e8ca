//! The `SimBackend` trait — the only way the scenario core touches the world.

use hx_core::{ActorId, Transform, WorldSettings, WorldSnapshot};

use crate::{BackendResult, BlueprintLibrary, Command, CommandResponse};

/// A handle to a traffic-control session.
///
/// Autopilot-enable commands name the session by [`port`][Self::port]; the
/// global speed bias applies to every vehicle the session drives.
pub trait TrafficManager: Send + Sync {
    fn port(&self) -> u16;

    /// Percentage by which vehicles drive *below* their target speed.
    /// Negative values make them drive faster (e.g. `-1000.0`).
    fn set_global_percentage_speed_difference(&self, percentage: f32);
}

/// A simulation world as seen by the scenario core.
///
/// # Thread safety
///
/// The scenario tree and the background traffic worker call into the same
/// backend concurrently, so implementations must be `Send + Sync` and every
/// method takes `&self`.  Individual calls are expected to be atomic with
/// respect to each other; no ordering across threads is assumed.
///
/// # Batches
///
/// [`apply_batch`][Self::apply_batch] is fire-and-forget.
/// [`apply_batch_sync`][Self::apply_batch_sync] executes the batch before
/// returning and answers with exactly one response per submitted command,
/// in submission order.  A failing command never aborts the rest of its
/// batch.
pub trait SimBackend: Send + Sync {
    fn settings(&self) -> WorldSettings;

    /// Replace the world settings.  Rejects negative or non-finite steps.
    fn apply_settings(&self, settings: WorldSettings) -> BackendResult<()>;

    fn blueprint_library(&self) -> BlueprintLibrary;

    fn apply_batch(&self, commands: Vec<Command>);

    /// Execute `commands` and collect one response per command.
    ///
    /// With `do_tick` the world also advances one step after the batch.
    fn apply_batch_sync(&self, commands: Vec<Command>, do_tick: bool) -> Vec<CommandResponse>;

    /// The timestamp of the latest world update.
    fn snapshot(&self) -> WorldSnapshot;

    /// Advance the world by one step and return the new timestamp.
    fn tick(&self) -> WorldSnapshot;

    /// Current pose of `actor`, or `None` if it does not exist.
    fn actor_transform(&self, actor: ActorId) -> Option<Transform>;

    /// Collision events recorded for `actor` since it was spawned.
    fn collision_count(&self, actor: ActorId) -> u32;

    fn traffic_manager(&self, port: u16) -> BackendResult<Box<dyn TrafficManager>>;
}
