use hx_backend::BackendError;
use hx_core::HxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("no spawnable vehicle blueprints match '{pattern}'")]
    EmptyCatalogue { pattern: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Value(#[from] HxError),

    #[error("failed to start spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("spawn worker thread panicked")]
    WorkerPanicked,
}

pub type TrafficResult<T> = Result<T, TrafficError>;
