use std::path::PathBuf;

use jvdeps_maven::CoordinateError;
use jvdeps_parser::PoolError;
use thiserror::Error;

/// Errors that stop a whole generation run.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("coordinate index is unusable: {0}")]
    Coordinates(#[from] CoordinateError),

    #[error("failed to start parser pool: {0}")]
    PoolStart(#[source] PoolError),

    #[error("generation run was cancelled")]
    Cancelled,

    #[error("parse task failed: {0}")]
    Task(String),
}

/// Errors that skip one unit while the rest of the run continues.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Parse(#[from] PoolError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
