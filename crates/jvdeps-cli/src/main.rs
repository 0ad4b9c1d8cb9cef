//! jvdeps - dependency resolution for generated Java build rules.
//!
//! Parses arguments, loads layered configuration, initializes logging and
//! dispatches to the selected command.

use clap::Parser;
use jvdeps_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let context = commands::CommandContext::load(&args).map_err(error::cli_error_to_miette)?;

    logger::init_logger(&logger::LoggerOptions {
        verbose: args.verbose,
        quiet: args.quiet,
        no_color: args.no_color,
        level: context.config.settings.log_level.clone(),
        format: context.config.settings.log_format,
    });
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Resolve(resolve_args) => commands::resolve_execute(&context, resolve_args).await,
        cli::Command::Parse(parse_args) => commands::parse_execute(&context, parse_args).await,
        cli::Command::Config(config_args) => commands::config_execute(&context, config_args),
    };

    result.map_err(error::cli_error_to_miette)
}
