use std::path::PathBuf;

use clap::{Args, Subcommand};
use jvdeps_config::{ConfigOverrides, ParserOverrides, ResolverOverrides};

/// Available jvdeps subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the dependencies of every unit in the workspace
    ///
    /// A unit is a directory directly containing `.java` files. Each one is
    /// resolved to the labels its build rule needs.
    Resolve(ResolveArgs),

    /// Parse a single Java file and print its structural facts as JSON
    Parse(ParseArgs),

    /// Print the effective configuration after all layers are merged
    Config(ConfigArgs),
}

impl Command {
    /// Values from this command that take precedence over every config layer.
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Command::Resolve(args) => ConfigOverrides {
                parser: ParserOverrides {
                    pool_size: args.jobs,
                    log_level: args.worker_log.clone(),
                    ..Default::default()
                },
                resolver: ResolverOverrides {
                    lock_file: args.lock_file.clone(),
                },
                ..Default::default()
            },
            Command::Parse(_) | Command::Config(_) => ConfigOverrides::default(),
        }
    }
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Maven lock file (overrides `resolver.lock_file`)
    #[arg(short = 'l', long, value_name = "FILE")]
    pub lock_file: Option<PathBuf>,

    /// Resolve only these unit directories (repeatable)
    ///
    /// Without this flag every directory under the configured source roots
    /// that contains `.java` files is a unit.
    #[arg(short = 'u', long = "unit", value_name = "DIR")]
    pub units: Vec<PathBuf>,

    /// Write the full resolution report as JSON to FILE
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Exit non-zero if any symbol is unresolved or ambiguous, or any unit
    /// was skipped
    #[arg(long)]
    pub strict: bool,

    /// Parse with the built-in scanner instead of worker processes
    #[arg(long)]
    pub in_process: bool,

    /// Number of parser workers (overrides `parser.pool_size`)
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Log filter for parser workers (overrides `parser.log_level`)
    #[arg(long, value_name = "FILTER")]
    pub worker_log: Option<String>,
}

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Java source file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Parse with the built-in scanner instead of a worker process
    #[arg(long)]
    pub in_process: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Only validate; print nothing on success
    #[arg(long)]
    pub check: bool,
}
