//! Error handling for the jvdeps CLI.
//!
//! Library errors convert into [`CliError`] via `#[from]`; `main` renders
//! the result through [`cli_error_to_miette`].

use std::path::{Path, PathBuf};

use jvdeps_config::ConfigError;
use jvdeps_maven::CoordinateError;
use jvdeps_parser::PoolError;
use jvdeps_resolve::ResolveError;
use miette::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lock file error: {0}")]
    Coordinates(#[from] CoordinateError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Parser error: {0}")]
    Parser(#[from] PoolError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `--strict` and the run was not clean.
    #[error("{unresolved} unresolved symbol(s), {ambiguities} ambiguity(ies), {skipped} skipped unit(s)")]
    Strict {
        unresolved: usize,
        ambiguities: usize,
        skipped: usize,
    },
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Attach the path an I/O operation was working on.
pub trait ResultExt<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| {
            let path = path.as_ref().to_path_buf();
            if source.kind() == std::io::ErrorKind::NotFound {
                CliError::FileNotFound(path)
            } else {
                CliError::Io { path, source }
            }
        })
    }
}

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Coordinates(e) => miette::miette!(
            "Lock file error: {}\n\nHint: Check `resolver.lock_file` or pass --lock-file",
            e
        ),
        CliError::Resolve(ResolveError::PoolStart(e)) => miette::miette!(
            "Failed to start parser workers: {}\n\nHint: Check `parser.command` or use --in-process",
            e
        ),
        CliError::Resolve(ResolveError::Cancelled) => miette::miette!("Cancelled"),
        CliError::Strict { .. } => miette::miette!(
            "{}\n\nHint: Inspect the warnings above or rerun with --json for details",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_io_errors_name_the_file() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.with_path("pkg/A.java").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p == Path::new("pkg/A.java")));
        assert!(err.to_string().contains("pkg/A.java"));
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.with_path("out.json").unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn strict_failure_counts_every_problem() {
        let err = CliError::Strict {
            unresolved: 2,
            ambiguities: 1,
            skipped: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 unresolved"));
        assert!(msg.contains("1 ambiguity"));
        assert!(cli_error_to_miette(err).to_string().contains("--json"));
    }

    #[test]
    fn lock_file_errors_carry_a_hint() {
        let err = CliError::from(CoordinateError::UnsupportedVersion {
            found: 9,
            expected: 1,
        });
        assert!(cli_error_to_miette(err).to_string().contains("--lock-file"));
    }
}
