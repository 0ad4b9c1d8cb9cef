use std::path::PathBuf;

use jvdeps_config::{DEFAULT_WORKER_PROGRAM, JvdepsConfig};
use jvdeps_parser::{PoolOptions, WorkerCommand};
use tracing::debug;

use crate::error::Result;

/// Pool options from the configuration. The default worker program is
/// taken from next to the running `jvdeps` binary when it is installed
/// there, and from `PATH` otherwise.
pub fn pool_options(config: &JvdepsConfig) -> Result<PoolOptions> {
    let mut options = config.pool_options()?;
    if options.command.program() != DEFAULT_WORKER_PROGRAM {
        return Ok(options);
    }
    if let Some(sibling) = sibling_worker() {
        debug!(path = %sibling.display(), "using bundled parser worker");
        let argv = std::iter::once(sibling.to_string_lossy().into_owned())
            .chain(options.command.args().iter().cloned());
        options.command = WorkerCommand::from_argv(argv)?;
    }
    Ok(options)
}

fn sibling_worker() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.with_file_name(format!(
        "{DEFAULT_WORKER_PROGRAM}{}",
        std::env::consts::EXE_SUFFIX
    ));
    candidate.is_file().then_some(candidate)
}
