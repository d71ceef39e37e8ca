use std::path::PathBuf;

use hx_backend::BackendError;
use hx_core::HxError;
use hx_traffic::TrafficError;
use thiserror::Error;

use crate::ScenarioState;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario configuration error: {0}")]
    Config(String),

    #[error("invalid scenario value: {0}")]
    Value(#[from] HxError),

    #[error("reading {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing scenario config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("traffic error: {0}")]
    Traffic(#[from] TrafficError),

    #[error("phase cannot move back from {from} to {to}")]
    InvalidTransition {
        from: ScenarioState,
        to:   ScenarioState,
    },
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
