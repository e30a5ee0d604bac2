//! Error types for the solofit_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for solofit_core operations
///
/// None of these are fatal: every failing operation leaves session and
/// progress state exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Operation not allowed in the session's current state
    #[error("Cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// Attempted to start a workout with no exercises
    #[error("Workout has no exercises")]
    EmptyWorkout,

    /// Exercise navigation that the engine does not support
    #[error("Navigation unavailable: {0}")]
    NavigationUnavailable(String),

    /// Progress could not be persisted
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
