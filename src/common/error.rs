//! Error types for rust_motion_planning

use thiserror::Error;

/// Main error type for the planning toolkit
///
/// Failing to find a path is not an error: `solve` reports it through
/// [`PlannerStatus`](crate::common::PlannerStatus). These variants cover
/// misuse and I/O.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// A solution path was requested but none has been computed
    #[error("No solution path")]
    NoSolutionPath,
    /// A start state is outside the bounds or the space dimension
    #[error("Invalid start state: {0}")]
    InvalidStart(String),
    /// Configuration text could not be parsed
    #[error("Configuration error: {0}")]
    ConfigParse(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Visualization error
    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl From<toml::de::Error> for PlanningError {
    fn from(e: toml::de::Error) -> Self {
        PlanningError::ConfigParse(e.to_string())
    }
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
