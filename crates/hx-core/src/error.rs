//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `HxError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// The base error type for `hx-core` value validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HxError {
    #[error("invalid region: {axis} bounds [{min}, {max}] are inverted")]
    InvertedRegion {
        axis: &'static str,
        min:  f32,
        max:  f32,
    },

    #[error("invalid fixed step {0}: must be within [0, {max}]", max = crate::time::MAX_FIXED_DELTA_SECONDS)]
    InvalidStep(f64),

    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `hx-core`.
pub type HxResult<T> = Result<T, HxError>;
