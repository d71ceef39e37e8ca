//! `hx-backend` — the simulation backend boundary.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`backend`]   | `SimBackend` trait, `TrafficManager` trait                 |
//! | [`command`]   | `Command`, `SpawnActor`, `ActorRef`, `CommandResponse`     |
//! | [`blueprint`] | `Blueprint`, `BlueprintLibrary`, glob filtering            |
//! | [`local`]     | `LocalWorld` — in-process backend for tests and demos      |
//! | [`error`]     | `BackendError`, `CommandError`, `BackendResult<T>`         |
//!
//! # Design notes
//!
//! The scenario core never talks to a concrete simulator.  World settings,
//! the blueprint catalogue, batched spawn/destroy commands, the simulated
//! clock, actor poses and collision counts all go through [`SimBackend`].
//! All methods take `&self`: implementations are shared between the
//! scenario thread and the background traffic worker and synchronise
//! internally.

pub mod backend;
pub mod blueprint;
pub mod command;
pub mod error;
pub mod local;

#[cfg(test)]
mod tests;

pub use backend::{SimBackend, TrafficManager};
pub use blueprint::{Blueprint, BlueprintLibrary};
pub use command::{ActorRef, Command, CommandResponse, SpawnActor};
pub use error::{BackendError, BackendResult, CommandError};
pub use local::{BatchRecord, LocalWorld, LocalWorldConfig};
