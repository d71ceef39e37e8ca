use hx_core::{ActorId, HxError, Location};
use thiserror::Error;

/// Failure of a backend call as a whole.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid world settings: {0}")]
    InvalidSettings(#[from] HxError),

    #[error("no traffic manager listening on port {0}")]
    UnknownTrafficManager(u16),

    #[error("invalid blueprint pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source:  glob::PatternError,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure of one command inside a batch.
///
/// A failed command never aborts the rest of its batch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown blueprint '{0}'")]
    UnknownBlueprint(String),

    #[error("spawn of '{blueprint}' failed because of collision at spawn position {location}")]
    SpawnCollision {
        blueprint: String,
        location:  Location,
    },

    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("future actor referenced outside of a spawn chain")]
    UnresolvedFutureActor,

    #[error("no traffic manager listening on port {0}")]
    UnknownTrafficManager(u16),
}
