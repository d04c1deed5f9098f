//! Error types for the forecast engine.

use thiserror::Error;

/// Errors surfaced by the forecast engine.
///
/// Partial weather or marine data never produces an error; unknown values
/// fall back to neutral sub-scores. Only inputs the engine cannot score at
/// all are reported here.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// A field the scorer cannot do without is absent or not finite
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A provider timestamp did not match any supported layout
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Provider payload was not valid JSON for the expected shape
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
