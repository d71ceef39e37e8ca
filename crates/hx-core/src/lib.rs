//! `hx-core` — foundational types for the highway-cross scenario engine.
//!
//! This crate is a dependency of every other `hx-*` crate.  It has no
//! `hx-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `ActorId`, `SlotId`                                        |
//! | [`geo`]    | `Location`, `Rotation`, `Transform`, `Region`              |
//! | [`time`]   | `WorldSettings`, `StepMode`, `WorldSnapshot`               |
//! | [`rng`]    | `SpawnRng` (seedable, child derivation)                    |
//! | [`error`]  | `HxError`, `HxResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{HxError, HxResult};
pub use geo::{Location, Region, Rotation, Transform};
pub use ids::{ActorId, SlotId};
pub use rng::SpawnRng;
pub use time::{MAX_FIXED_DELTA_SECONDS, StepMode, WorldSettings, WorldSnapshot};
