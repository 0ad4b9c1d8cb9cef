//! # jvdeps-parser
//!
//! Turns Java source files into structural facts ([`ParseResult`]) using a
//! pool of long-lived, out-of-process parser workers.
//!
//! ## Overview
//!
//! - [`WorkerPool`] spawns `pool_size` persistent worker processes and routes
//!   parse requests to idle workers. Unresponsive or crashed workers are
//!   killed, respawned, and the request is retried exactly once.
//! - [`scanner`] is the in-process Java scanner used by the reference worker
//!   binary (`jvdeps-parser-worker`) and by [`ScannerParser`].
//! - [`SourceParser`] is the seam the dependency resolver talks to, so tests
//!   and `--in-process` runs can skip the process boundary entirely.
//!
//! ## Wire protocol
//!
//! Workers speak newline-delimited JSON on stdin/stdout:
//!
//! ```text
//! -> {"id":1,"path":"pkg/a/A.java","contents":"package pkg.a; ..."}
//! <- {"id":1,"result":{"package":"pkg.a","declaredTypes":["A"], ...}}
//! <- {"id":2,"error":"unbalanced braces at byte 120"}
//! ```
//!
//! Closing stdin asks a worker to exit.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jvdeps_parser::{PoolOptions, SourceFile, WorkerCommand, WorkerPool};
//!
//! # async fn example() -> Result<(), jvdeps_parser::PoolError> {
//! let command = WorkerCommand::from_argv(["jvdeps-parser-worker"])?;
//! let pool = WorkerPool::start(PoolOptions::new(command).pool_size(4))?;
//!
//! let file = SourceFile::new("pkg/a/A.java", "package pkg.a; class A {}");
//! let parsed = pool.parse(&file).await?;
//! assert_eq!(parsed.declared_types, vec!["A".to_string()]);
//!
//! pool.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod parser;
pub mod pool;
pub mod protocol;
pub mod result;
pub mod scanner;
pub mod source;

pub use error::{PoolError, ScanError, WorkerFailure};
pub use parser::{ScannerParser, SourceParser};
pub use pool::{
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SHUTDOWN_TIMEOUT, PoolOptions, PoolStats, ShutdownReport,
    WORKER_LOG_ENV, WorkerCommand, WorkerPool, default_pool_size,
};
pub use protocol::{WorkerRequest, WorkerResponse};
pub use result::ParseResult;
pub use source::{ContentStamp, SourceFile};
