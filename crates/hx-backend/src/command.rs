//! Batched actor commands.
//!
//! A batch is a `Vec<Command>` submitted in one backend call.  The
//! synchronous variant answers with one [`CommandResponse`] per command, in
//! submission order.  A spawn can carry follow-up commands (`then`) that
//! refer to the not-yet-known new actor through [`ActorRef::Future`].

use hx_core::{ActorId, Transform};

use crate::{Blueprint, CommandError};

/// One response per submitted command: the affected actor, or why it failed.
pub type CommandResponse = Result<ActorId, CommandError>;

/// Actor target of a follow-up command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRef {
    /// The actor created by the enclosing `SpawnActor`.
    Future,
    /// An existing actor.
    Id(ActorId),
}

/// Spawn request with optional follow-ups applied to the new actor.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnActor {
    pub blueprint: Blueprint,
    pub transform: Transform,
    pub then:      Vec<Command>,
}

impl SpawnActor {
    pub fn new(blueprint: Blueprint, transform: Transform) -> Self {
        Self { blueprint, transform, then: Vec::new() }
    }

    /// Chain a command to run against the spawned actor once it exists.
    pub fn then(mut self, command: Command) -> Self {
        self.then.push(command);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Spawn(SpawnActor),

    /// Hand the actor to (or take it back from) a traffic manager.
    SetAutopilot {
        actor:   ActorRef,
        enabled: bool,
        tm_port: u16,
    },

    DestroyActor(ActorId),
}

impl Command {
    /// Spawn, then enable autopilot on the new actor. The traffic spawn unit.
    pub fn spawn_with_autopilot(blueprint: Blueprint, transform: Transform, tm_port: u16) -> Self {
        SpawnActor::new(blueprint, transform)
            .then(Command::SetAutopilot {
                actor:   ActorRef::Future,
                enabled: true,
                tm_port,
            })
            .into()
    }

    /// One destroy command per id, in order.
    pub fn destroy_all(actors: &[ActorId]) -> Vec<Command> {
        actors.iter().copied().map(Command::DestroyActor).collect()
    }

    pub fn is_spawn(&self) -> bool {
        matches!(self, Command::Spawn(_))
    }
}

impl From<SpawnActor> for Command {
    fn from(spawn: SpawnActor) -> Self {
        Command::Spawn(spawn)
    }
}
