use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
///
/// Raised only for settings that cannot be corrected automatically.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised inside a solver.
///
/// The optimizer facade converts every one of these into a result envelope;
/// none of them reaches the caller as an `Err`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("model is infeasible")]
    Infeasible,

    #[error("time limit of {limit:?} reached without an incumbent")]
    Timeout { limit: Duration },

    #[error("run cancelled")]
    Cancelled,

    #[error("{backend} backend failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("{algorithm} failed internally: {message}")]
    Internal {
        algorithm: &'static str,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
