//! Reference parser worker: reads one JSON request per line on stdin and
//! answers each on stdout with the scanner's result. Exits at end of input.
//!
//! Logs go to stderr, filtered by `JVDEPS_PARSER_LOG` (default `warn`).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use jvdeps_parser::scanner;
use jvdeps_parser::{WORKER_LOG_ENV, WorkerRequest, WorkerResponse};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn init_logger() {
    let filter = EnvFilter::try_from_env(WORKER_LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // stderr is shared with the parent process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .compact()
        .try_init();
}

fn main() -> Result<()> {
    init_logger();

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut served = 0u64;

    for line in stdin.lines() {
        let line = line.context("failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        // A request we cannot decode has no id to answer with.
        let request: WorkerRequest<'_> =
            serde_json::from_str(&line).context("undecodable request")?;

        let response = match scanner::scan(&request.contents) {
            Ok(result) => {
                debug!(id = request.id, path = %request.path, "parsed");
                WorkerResponse::ok(request.id, result)
            }
            Err(err) => {
                warn!(id = request.id, path = %request.path, %err, "parse failed");
                WorkerResponse::failed(request.id, err.to_string())
            }
        };

        serde_json::to_writer(&mut stdout, &response).context("failed to encode response")?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        served += 1;
    }

    debug!(served, "input closed, exiting");
    Ok(())
}
