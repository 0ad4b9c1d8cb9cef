//! Error types for parsing and worker pool operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`WorkerPool`](crate::WorkerPool) and other
/// [`SourceParser`](crate::SourceParser) implementations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Not a single worker process could be started.
    #[error("no parser workers could be started with `{command}`: {reason}")]
    NoWorkers { command: String, reason: String },

    /// Pool options are unusable (empty command, zero workers, ...).
    #[error("invalid parser pool configuration: {0}")]
    InvalidConfig(String),

    /// The worker answered, but the file could not be parsed.
    ///
    /// Workers reporting this are healthy, so the request is not retried.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The request failed on one worker and again on the retry.
    #[error("parser workers failed on {}: {first}; retry failed: {second}", path.display())]
    WorkerFailed {
        path: PathBuf,
        first: WorkerFailure,
        second: WorkerFailure,
    },

    /// The pool was shut down before or while the request was routed.
    #[error("parser pool has been shut down")]
    ShutDown,
}

impl PoolError {
    /// Whether the error came from the worker infrastructure rather than the
    /// source file itself.
    pub fn is_worker_failure(&self) -> bool {
        matches!(self, PoolError::WorkerFailed { .. })
    }
}

/// A single failed exchange with one worker process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerFailure {
    #[error("worker {worker} did not respond within {timeout:?}")]
    Timeout { worker: u64, timeout: Duration },

    #[error("worker {worker} exited unexpectedly")]
    Crashed { worker: u64 },

    #[error("worker {worker} sent an invalid response: {reason}")]
    Protocol { worker: u64, reason: String },

    #[error("worker {worker} I/O error: {reason}")]
    Io { worker: u64, reason: String },

    #[error("worker could not be spawned: {reason}")]
    Spawn { reason: String },
}

/// Errors from the in-process Java scanner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("unbalanced braces at byte {offset}")]
    UnbalancedBraces { offset: usize },

    #[error("malformed {statement} statement at byte {offset}")]
    Malformed {
        statement: &'static str,
        offset: usize,
    },
}
