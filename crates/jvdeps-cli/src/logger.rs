//! Logging setup for the jvdeps CLI.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: DEBUG for jvdeps crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. `settings.log_level` from the configuration
//! 5. INFO for jvdeps crates
//!
//! Log lines go to stderr; stdout is reserved for command output.

use jvdeps_config::LogFormat;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const JVDEPS_CRATES: &[&str] = &[
    "jvdeps_cli",
    "jvdeps_config",
    "jvdeps_index",
    "jvdeps_maven",
    "jvdeps_parser",
    "jvdeps_resolve",
];

#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub verbose: bool,
    pub quiet: bool,
    pub no_color: bool,
    pub level: Option<String>,
    pub format: LogFormat,
}

/// Filter directive applying `level` to every jvdeps crate.
pub fn crate_directives(level: &str) -> String {
    JVDEPS_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the filter without installing anything.
pub fn build_filter(options: &LoggerOptions) -> EnvFilter {
    if options.verbose {
        return EnvFilter::new(crate_directives("debug"));
    }
    if options.quiet {
        return EnvFilter::new("error");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match options.level.as_deref().map(EnvFilter::try_new) {
            Some(Ok(filter)) => filter,
            _ => EnvFilter::new(crate_directives("info")),
        }
    })
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init_logger(options: &LoggerOptions) {
    let filter = build_filter(options);
    let registry = tracing_subscriber::registry().with(filter);

    match options.format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(!options.no_color)
                    .compact(),
            )
            .init(),
        LogFormat::Full => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(!options.no_color),
            )
            .init(),
    }
}
