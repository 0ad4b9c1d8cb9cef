//! A generation run: parse every unit, then resolve every unit.

use std::collections::BTreeMap;
use std::sync::Arc;

use jvdeps_parser::{PoolOptions, SourceParser, WorkerPool};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{ResolveError, UnitError};
use crate::resolver::DependencyResolver;
use crate::unit::{UnitOutcome, UnitRequest};

/// Triggers cancellation of every run holding the paired signal.
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by a [`GenerationRun`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever if the handle
    /// is dropped first.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// A connected handle and signal.
pub fn cancellation() -> (CancellationHandle, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (CancellationHandle { tx }, CancellationSignal { rx })
}

/// Everything a run produced, ordered by unit directory.
#[derive(Debug, Serialize)]
pub struct GenerationReport {
    pub units: Vec<UnitOutcome>,
    /// Files sent to the parser during this run.
    pub parsed_files: usize,
}

impl GenerationReport {
    pub fn resolved(&self) -> impl Iterator<Item = &crate::UnitResolution> {
        self.units.iter().filter_map(UnitOutcome::resolution)
    }

    pub fn skipped(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| matches!(unit, UnitOutcome::Skipped { .. }))
            .count()
    }

    pub fn unresolved(&self) -> usize {
        self.resolved()
            .map(|resolution| resolution.report.unresolved.len())
            .sum()
    }

    pub fn ambiguities(&self) -> usize {
        self.resolved()
            .map(|resolution| resolution.report.ambiguities.len())
            .sum()
    }
}

/// Owns the parser for one generation pass.
///
/// [`execute`](Self::execute) consumes the run and shuts the parser down on
/// every exit path.
pub struct GenerationRun {
    resolver: DependencyResolver,
    parser: Arc<dyn SourceParser>,
    cancel: CancellationSignal,
}

impl GenerationRun {
    pub fn new(resolver: DependencyResolver, parser: Arc<dyn SourceParser>) -> Self {
        Self {
            resolver,
            parser,
            cancel: CancellationSignal::never(),
        }
    }

    /// Start a worker pool for this run. Must be called within a tokio
    /// runtime.
    pub fn with_pool(resolver: DependencyResolver, options: PoolOptions) -> Result<Self, ResolveError> {
        let pool = WorkerPool::start(options).map_err(ResolveError::PoolStart)?;
        Ok(Self::new(resolver, Arc::new(pool)))
    }

    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.cancel = signal;
        self
    }

    /// Parse all units, then resolve all units. Generated units are parsed
    /// into the index but produce no outcome.
    pub async fn execute(mut self, units: Vec<UnitRequest>) -> Result<GenerationReport, ResolveError> {
        let result = self.passes(units).await;
        self.parser.shutdown().await;

        if matches!(result, Err(ResolveError::Cancelled)) {
            // Partially populated packages must never be surfaced.
            self.resolver.index().clear();
            warn!("generation run cancelled");
        }
        result
    }

    async fn passes(&mut self, mut units: Vec<UnitRequest>) -> Result<GenerationReport, ResolveError> {
        units.sort_by(|a, b| a.directory.cmp(&b.directory));

        let (failures, parsed_files) = self.parse_all(&units).await?;
        if self.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let mut failures = failures;
        let mut outcomes = Vec::with_capacity(units.len());
        for (position, unit) in units.iter().enumerate() {
            let failure = failures.remove(&position);
            if !unit.kind.emits_rule() {
                if let Some(error) = failure {
                    warn!(directory = %unit.directory.display(), %error, "generated sources not indexed");
                }
                continue;
            }
            let outcome = match failure {
                Some(error) => {
                    warn!(directory = %unit.directory.display(), %error, "skipping unit");
                    UnitOutcome::Skipped {
                        directory: unit.directory.clone(),
                        error,
                    }
                }
                None => UnitOutcome::Resolved(self.resolver.resolve_unit(&unit.directory, unit.kind)),
            };
            outcomes.push(outcome);
        }

        let report = GenerationReport {
            units: outcomes,
            parsed_files,
        };
        info!(
            units = report.units.len(),
            skipped = report.skipped(),
            parsed_files,
            unresolved = report.unresolved(),
            "generation run complete"
        );
        Ok(report)
    }

    /// Parse every stale file of every unit concurrently. Concurrency is
    /// bounded by the parser itself (the pool's worker count).
    async fn parse_all(
        &mut self,
        units: &[UnitRequest],
    ) -> Result<(BTreeMap<usize, UnitError>, usize), ResolveError> {
        let mut tasks = JoinSet::new();
        for (position, unit) in units.iter().enumerate() {
            for file in &unit.files {
                if !self.resolver.needs_parse(&unit.directory, file) {
                    continue;
                }
                let parser = Arc::clone(&self.parser);
                let file = file.clone();
                tasks.spawn(async move {
                    let result = parser.parse(&file).await;
                    (position, file, result)
                });
            }
        }

        let submitted = tasks.len();
        debug!(units = units.len(), files = submitted, "parsing units");

        let mut failures: BTreeMap<usize, UnitError> = BTreeMap::new();
        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    // Dropping the parse futures kills the workers serving them.
                    tasks.shutdown().await;
                    return Err(ResolveError::Cancelled);
                }

                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((position, file, Ok(result)))) => {
                        self.resolver.record(&units[position].directory, &file, result);
                    }
                    Some(Ok((position, file, Err(error)))) => {
                        warn!(path = %file.path().display(), %error, "parse failed");
                        failures.entry(position).or_insert(UnitError::Parse(error));
                    }
                    Some(Err(join_error)) => {
                        tasks.shutdown().await;
                        return Err(ResolveError::Task(join_error.to_string()));
                    }
                },
            }
        }

        Ok((failures, submitted))
    }
}
