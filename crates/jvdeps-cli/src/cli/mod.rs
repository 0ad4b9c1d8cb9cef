//! Command-line interface definition.
//!
//! - `jvdeps resolve` - compute `deps`/`runtime_deps` for every unit
//! - `jvdeps parse` - print the structural facts of one Java file
//! - `jvdeps config` - print the effective configuration

mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{Command, ConfigArgs, ParseArgs, ResolveArgs};

/// jvdeps - Java dependency resolution for build-file generation
#[derive(Parser, Debug)]
#[command(
    name = "jvdeps",
    version,
    about = "Resolve Java build-rule dependencies",
    long_about = "jvdeps parses the Java sources of a workspace, indexes what each directory\n\
                  declares and resolves every referenced symbol to a workspace directory or\n\
                  a Maven artifact from the lock file."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Workspace root; unit directories and labels are relative to it
    #[arg(short = 'w', long, global = true, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    /// Config file to use instead of `<workspace>/jvdeps.toml`; relative paths
    /// are taken from the workspace
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_flags_parse() {
        let cli = Cli::try_parse_from([
            "jvdeps",
            "--workspace",
            "/work",
            "resolve",
            "--lock-file",
            "maven_install.json",
            "--unit",
            "pkg/a",
            "--unit",
            "pkg/b",
            "--strict",
            "--in-process",
            "--worker-log",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.workspace, PathBuf::from("/work"));
        let Command::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.lock_file, Some(PathBuf::from("maven_install.json")));
        assert_eq!(args.units, vec![PathBuf::from("pkg/a"), PathBuf::from("pkg/b")]);
        assert!(args.strict);
        assert!(args.in_process);
        assert!(args.json.is_none());
        assert_eq!(args.worker_log.as_deref(), Some("debug"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["jvdeps", "parse", "A.java", "-v", "-c", "ci.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        assert!(matches!(cli.command, Command::Parse(ref args) if args.file == PathBuf::from("A.java")));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["jvdeps", "-v", "-q", "config"]).is_err());
    }
}
