//! Pool of persistent parser worker processes.
//!
//! Workers live in fixed slots. A semaphore with one permit per slot bounds
//! concurrency and an LRU queue of idle slot indices hands each request an
//! exclusive [`Checkout`]. Handles are moved out of their slot for the
//! duration of a request so no lock is ever held across an await point.
//!
//! Dead workers leave their slot empty; the next checkout of that slot
//! respawns it.

mod worker;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{PoolError, WorkerFailure};
use crate::result::ParseResult;
use crate::source::{ContentStamp, SourceFile};
use worker::WorkerHandle;

/// Default time a worker gets to answer one request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time workers get to exit after stdin is closed.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Environment variable carrying the worker-side log filter.
pub const WORKER_LOG_ENV: &str = "JVDEPS_PARSER_LOG";

/// Program, arguments and extra environment used to launch a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl WorkerCommand {
    /// Build from an argv vector; the first element is the program.
    pub fn from_argv<I, S>(argv: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .filter(|program| !program.trim().is_empty())
            .ok_or_else(|| PoolError::InvalidConfig("worker command is empty".to_string()))?;
        Ok(Self {
            program,
            args: argv.collect(),
            env: Vec::new(),
        })
    }

    /// Set an environment variable for every spawned worker.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env.retain(|(existing, _)| *existing != key);
        self.env.push((key, value.into()));
        self
    }

    /// Log filter for the worker process, passed as [`WORKER_LOG_ENV`].
    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.env(WORKER_LOG_ENV, level)
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().map(|(key, value)| (key, value)));
        command
    }
}

impl fmt::Display for WorkerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One worker per available core, capped at 8.
pub fn default_pool_size() -> usize {
    num_cpus::get().min(8)
}

/// Options for [`WorkerPool::start`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub command: WorkerCommand,
    pub pool_size: usize,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl PoolOptions {
    /// Defaults: one worker per core (at most 8), 10s requests, 2s shutdown.
    pub fn new(command: WorkerCommand) -> Self {
        Self {
            command,
            pool_size: default_pool_size(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    fn validate(&self) -> Result<(), PoolError> {
        if self.pool_size == 0 {
            return Err(PoolError::InvalidConfig(
                "pool size must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(PoolError::InvalidConfig(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters describing the pool's lifetime so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Worker processes started, including respawns.
    pub spawned: u64,
    /// Worker processes started to replace a dead one.
    pub respawned: u64,
    /// Requests answered from the content-stamp memo.
    pub memo_hits: u64,
}

/// What [`WorkerPool::shutdown`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that exited on their own after stdin closed.
    pub exited: usize,
    /// Workers force-killed after the grace period.
    pub killed: usize,
}

#[derive(Debug)]
struct Shared {
    options: PoolOptions,
    permits: Semaphore,
    idle: Mutex<VecDeque<usize>>,
    slots: Vec<Mutex<Option<WorkerHandle>>>,
    memo: DashMap<ContentStamp, Arc<ParseResult>>,
    shut_down: AtomicBool,
    next_worker: AtomicU64,
    next_request: AtomicU64,
    spawned: AtomicU64,
    respawned: AtomicU64,
    memo_hits: AtomicU64,
}

impl Shared {
    fn spawn_worker(&self) -> Result<WorkerHandle, WorkerFailure> {
        let id = self.next_worker.fetch_add(1, Ordering::Relaxed);
        let handle = WorkerHandle::spawn(id, &self.options.command)?;
        self.spawned.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Wait for an idle slot, preferring any slot other than `avoid`.
    async fn checkout(&self, avoid: Option<usize>) -> Result<Checkout<'_>, PoolError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PoolError::ShutDown)?;

        let slot = {
            let mut idle = self.idle.lock();
            let position = idle
                .iter()
                .position(|&slot| Some(slot) != avoid)
                .unwrap_or(0);
            // One permit per queued slot, so the queue cannot be empty here.
            idle.remove(position).ok_or(PoolError::ShutDown)?
        };

        let handle = self.slots[slot].lock().take();
        Ok(Checkout {
            shared: self,
            slot,
            handle,
            _permit: permit,
        })
    }
}

/// Exclusive use of one worker slot for one request.
///
/// Dropping the checkout returns the worker to the idle queue, unless the
/// request was abandoned mid-exchange or the pool is shutting down, in which
/// case the worker is killed.
struct Checkout<'p> {
    shared: &'p Shared,
    slot: usize,
    handle: Option<WorkerHandle>,
    _permit: SemaphorePermit<'p>,
}

impl Checkout<'_> {
    /// The slot's worker, respawning it if the slot is empty.
    fn worker(&mut self) -> Result<&mut WorkerHandle, WorkerFailure> {
        if self.handle.is_none() {
            let handle = self.shared.spawn_worker()?;
            self.shared.respawned.fetch_add(1, Ordering::Relaxed);
            debug!(slot = self.slot, worker = handle.id(), "respawned parser worker");
            self.handle = Some(handle);
        }
        self.handle.as_mut().ok_or(WorkerFailure::Spawn {
            reason: "worker slot is empty".to_string(),
        })
    }

    /// Kill the worker and leave the slot empty.
    fn discard(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.kill();
        }
    }
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if handle.is_in_flight() || self.shared.shut_down.load(Ordering::Acquire) {
                debug!(worker = handle.id(), "killing abandoned parser worker");
                handle.kill();
            } else {
                *self.shared.slots[self.slot].lock() = Some(handle);
            }
        }
        // Queue the slot before the permit field is dropped.
        self.shared.idle.lock().push_back(self.slot);
    }
}

enum Attempt {
    Answered(Result<ParseResult, String>),
    Failed { slot: usize, failure: WorkerFailure },
}

/// A bounded pool of persistent parser workers.
///
/// Cheap to clone; clones share the same workers. Call
/// [`shutdown`](Self::shutdown) when done. Dropping the last clone kills any
/// remaining workers, but without the grace period.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Spawn `pool_size` workers. Must be called within a tokio runtime.
    ///
    /// Workers that fail to start are logged and respawned on first use;
    /// the pool only fails if none start at all.
    pub fn start(options: PoolOptions) -> Result<Self, PoolError> {
        options.validate()?;

        let shared = Shared {
            permits: Semaphore::new(options.pool_size),
            idle: Mutex::new((0..options.pool_size).collect()),
            slots: (0..options.pool_size).map(|_| Mutex::new(None)).collect(),
            memo: DashMap::new(),
            shut_down: AtomicBool::new(false),
            next_worker: AtomicU64::new(1),
            next_request: AtomicU64::new(1),
            spawned: AtomicU64::new(0),
            respawned: AtomicU64::new(0),
            memo_hits: AtomicU64::new(0),
            options,
        };

        let mut started = 0;
        let mut last_failure = None;
        for slot in &shared.slots {
            match shared.spawn_worker() {
                Ok(handle) => {
                    *slot.lock() = Some(handle);
                    started += 1;
                }
                Err(failure) => {
                    warn!(error = %failure, "failed to start parser worker");
                    last_failure = Some(failure);
                }
            }
        }

        if started == 0 {
            return Err(PoolError::NoWorkers {
                command: shared.options.command.to_string(),
                reason: last_failure
                    .map(|failure| failure.to_string())
                    .unwrap_or_else(|| "no workers requested".to_string()),
            });
        }

        debug!(
            started,
            requested = shared.options.pool_size,
            command = %shared.options.command,
            "parser pool started"
        );

        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Parse one file, retrying once on another worker if the first fails.
    pub async fn parse(&self, file: &SourceFile) -> Result<ParseResult, PoolError> {
        let shared = &self.shared;
        if shared.shut_down.load(Ordering::Acquire) {
            return Err(PoolError::ShutDown);
        }

        if let Some(hit) = shared.memo.get(&file.stamp()) {
            shared.memo_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(ParseResult::clone(&hit));
        }

        let (failed_slot, first) = match self.attempt(file, None).await? {
            Attempt::Answered(outcome) => return self.finish(file, outcome),
            Attempt::Failed { slot, failure } => (slot, failure),
        };

        warn!(
            path = %file.path().display(),
            error = %first,
            "parser worker failed, retrying on another worker"
        );

        match self.attempt(file, Some(failed_slot)).await? {
            Attempt::Answered(outcome) => self.finish(file, outcome),
            Attempt::Failed { failure, .. } => Err(PoolError::WorkerFailed {
                path: file.path().to_path_buf(),
                first,
                second: failure,
            }),
        }
    }

    async fn attempt(&self, file: &SourceFile, avoid: Option<usize>) -> Result<Attempt, PoolError> {
        let shared = &self.shared;
        let mut checkout = shared.checkout(avoid).await?;
        let slot = checkout.slot;
        let request_id = shared.next_request.fetch_add(1, Ordering::Relaxed);

        let worker = match checkout.worker() {
            Ok(worker) => worker,
            Err(failure) => return Ok(Attempt::Failed { slot, failure }),
        };

        let response = worker
            .request(request_id, file, shared.options.request_timeout)
            .await;

        match response {
            Ok(outcome) => Ok(Attempt::Answered(outcome)),
            Err(failure) => {
                checkout.discard();
                Ok(Attempt::Failed { slot, failure })
            }
        }
    }

    fn finish(
        &self,
        file: &SourceFile,
        outcome: Result<ParseResult, String>,
    ) -> Result<ParseResult, PoolError> {
        match outcome {
            Ok(result) => {
                self.shared
                    .memo
                    .insert(file.stamp(), Arc::new(result.clone()));
                Ok(result)
            }
            Err(message) => Err(PoolError::Parse {
                path: file.path().to_path_buf(),
                message,
            }),
        }
    }

    /// Terminate every worker: close stdin, wait up to the shutdown timeout,
    /// then kill stragglers. Calling it again is a no-op.
    pub async fn shutdown(&self) -> ShutdownReport {
        let shared = &self.shared;
        if shared.shut_down.swap(true, Ordering::AcqRel) {
            return ShutdownReport::default();
        }
        shared.permits.close();

        let grace = shared.options.shutdown_timeout;
        let mut exits = JoinSet::new();
        for slot in &shared.slots {
            let handle = slot.lock().take();
            if let Some(handle) = handle {
                exits.spawn(handle.terminate(grace));
            }
        }

        let mut report = ShutdownReport::default();
        while let Some(exit) = exits.join_next().await {
            match exit {
                Ok(true) => report.exited += 1,
                Ok(false) | Err(_) => report.killed += 1,
            }
        }

        debug!(
            exited = report.exited,
            killed = report.killed,
            "parser pool shut down"
        );
        report
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.load(Ordering::Acquire)
    }

    pub fn size(&self) -> usize {
        self.shared.options.pool_size
    }

    pub fn stats(&self) -> PoolStats {
        let shared = &self.shared;
        PoolStats {
            spawned: shared.spawned.load(Ordering::Relaxed),
            respawned: shared.respawned.load(Ordering::Relaxed),
            memo_hits: shared.memo_hits.load(Ordering::Relaxed),
        }
    }
}
