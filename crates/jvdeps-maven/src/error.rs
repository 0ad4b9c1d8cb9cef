use std::path::PathBuf;

use thiserror::Error;

/// The lock file could not be turned into a [`CoordinateIndex`](crate::CoordinateIndex).
///
/// Every variant is fatal for a generation run.
#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("failed to read lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed lock file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported lock file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("invalid coordinate `{coordinate}`: {reason}")]
    InvalidCoordinate { coordinate: String, reason: String },

    #[error("coordinate `{coordinate}` is listed more than once")]
    DuplicateCoordinate { coordinate: String },

    #[error("artifact `{coordinate}` lists invalid class name `{class}`")]
    InvalidClassName { coordinate: String, class: String },

    #[error("artifact `{coordinate}` has no label and the lock file names no repository")]
    MissingLabel { coordinate: String },

    #[error("artifact `{coordinate}` has invalid label `{label}`")]
    InvalidLabel { coordinate: String, label: String },
}
