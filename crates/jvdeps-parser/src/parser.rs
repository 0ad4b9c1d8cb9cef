//! The seam between the dependency resolver and whatever turns source text
//! into [`ParseResult`]s.

use async_trait::async_trait;

use crate::error::PoolError;
use crate::pool::WorkerPool;
use crate::result::ParseResult;
use crate::scanner;
use crate::source::SourceFile;

/// Anything that can parse a Java source file.
#[async_trait]
pub trait SourceParser: Send + Sync {
    async fn parse(&self, file: &SourceFile) -> Result<ParseResult, PoolError>;

    /// Release any resources (worker processes). Idempotent.
    async fn shutdown(&self) {}
}

#[async_trait]
impl SourceParser for WorkerPool {
    async fn parse(&self, file: &SourceFile) -> Result<ParseResult, PoolError> {
        WorkerPool::parse(self, file).await
    }

    async fn shutdown(&self) {
        WorkerPool::shutdown(self).await;
    }
}

/// Runs the [`scanner`] on the calling task, with no worker processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScannerParser;

#[async_trait]
impl SourceParser for ScannerParser {
    async fn parse(&self, file: &SourceFile) -> Result<ParseResult, PoolError> {
        scanner::scan(file.contents()).map_err(|err| PoolError::Parse {
            path: file.path().to_path_buf(),
            message: err.to_string(),
        })
    }
}
