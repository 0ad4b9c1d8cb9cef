//! A single long-lived parser worker process.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::WorkerCommand;
use crate::error::WorkerFailure;
use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::result::ParseResult;
use crate::source::SourceFile;

/// Owned exclusively by the pool; checked out for one request at a time.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    id: u64,
    child: Child,
    /// `None` once the terminate signal (EOF) has been sent.
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    /// Set while a request is written but its response not yet read. A handle
    /// left in this state has an unknown position in the stream and must not
    /// be reused.
    in_flight: bool,
    served: u64,
}

impl WorkerHandle {
    /// Spawn a worker. Must run inside a tokio runtime.
    pub(crate) fn spawn(id: u64, command: &WorkerCommand) -> Result<Self, WorkerFailure> {
        let mut process = command.to_command();
        process
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = process.spawn().map_err(|err| WorkerFailure::Spawn {
            reason: format!("{command}: {err}"),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| WorkerFailure::Spawn {
            reason: "worker stdin was not captured".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| WorkerFailure::Spawn {
            reason: "worker stdout was not captured".to_string(),
        })?;

        debug!(worker = id, pid = ?child.id(), %command, "spawned parser worker");

        Ok(Self {
            id,
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            in_flight: false,
            served: 0,
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Send one request and wait up to `limit` for its response.
    ///
    /// The outer `Result` is the health of the worker; the inner one is the
    /// worker's verdict on the file.
    pub(crate) async fn request(
        &mut self,
        request_id: u64,
        file: &SourceFile,
        limit: Duration,
    ) -> Result<Result<ParseResult, String>, WorkerFailure> {
        let worker = self.id;
        let line = serde_json::to_string(&WorkerRequest::new(request_id, file)).map_err(|err| {
            WorkerFailure::Protocol {
                worker,
                reason: format!("could not encode request: {err}"),
            }
        })?;

        self.in_flight = true;
        let reply = match timeout(limit, self.exchange(&line)).await {
            Ok(reply) => reply?,
            Err(_) => {
                return Err(WorkerFailure::Timeout {
                    worker,
                    timeout: limit,
                });
            }
        };
        self.in_flight = false;

        let response: WorkerResponse =
            serde_json::from_str(&reply).map_err(|err| WorkerFailure::Protocol {
                worker,
                reason: format!("undecodable response: {err}"),
            })?;

        if response.id != request_id {
            // The stream is out of step; nothing further from it can be trusted.
            self.in_flight = true;
            return Err(WorkerFailure::Protocol {
                worker,
                reason: format!("expected response {request_id}, got {}", response.id),
            });
        }

        let outcome = response
            .into_outcome()
            .ok_or_else(|| WorkerFailure::Protocol {
                worker,
                reason: "response must carry exactly one of `result` or `error`".to_string(),
            })?;

        self.served += 1;
        Ok(outcome)
    }

    async fn exchange(&mut self, line: &str) -> Result<String, WorkerFailure> {
        let worker = self.id;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or(WorkerFailure::Crashed { worker })?;

        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|err| write_failure(worker, err))?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|err| write_failure(worker, err))?;
        stdin
            .flush()
            .await
            .map_err(|err| write_failure(worker, err))?;

        match self.stdout.next_line().await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(WorkerFailure::Crashed { worker }),
            Err(err) => Err(WorkerFailure::Io {
                worker,
                reason: err.to_string(),
            }),
        }
    }

    /// Ask the process to die without waiting for it.
    pub(crate) fn kill(&mut self) {
        if let Err(err) = self.child.start_kill() {
            debug!(worker = self.id, error = %err, "parser worker already gone");
        }
    }

    /// Close stdin and wait up to `grace` for a clean exit, killing the
    /// process otherwise. Returns `true` when it exited on its own.
    pub(crate) async fn terminate(mut self, grace: Duration) -> bool {
        drop(self.stdin.take());

        match timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(
                    worker = self.id,
                    served = self.served,
                    %status,
                    "parser worker exited"
                );
                true
            }
            Ok(Err(err)) => {
                warn!(worker = self.id, error = %err, "failed to wait for parser worker");
                self.kill();
                false
            }
            Err(_) => {
                warn!(
                    worker = self.id,
                    "parser worker did not exit within {grace:?}, killing it"
                );
                if let Err(err) = self.child.kill().await {
                    debug!(worker = self.id, error = %err, "kill failed");
                }
                false
            }
        }
    }
}

fn write_failure(worker: u64, err: std::io::Error) -> WorkerFailure {
    match err.kind() {
        std::io::ErrorKind::BrokenPipe => WorkerFailure::Crashed { worker },
        _ => WorkerFailure::Io {
            worker,
            reason: err.to_string(),
        },
    }
}
