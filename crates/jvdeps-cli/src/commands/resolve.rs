//! The resolve command: discover units, run a generation, report.

use std::path::Path;
use std::sync::Arc;

use jvdeps_index::SourcePackageIndex;
use jvdeps_maven::CoordinateIndex;
use jvdeps_parser::ScannerParser;
use jvdeps_resolve::{
    DependencyResolver, GenerationReport, GenerationRun, UnitOutcome, UnitRequest, cancellation,
};
use tokio::signal;
use tracing::{info, warn};

use crate::cli::ResolveArgs;
use crate::commands::discover::{self, Units};
use crate::commands::{CommandContext, utils};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the resolve command.
///
/// 1. Validate the merged configuration
/// 2. Discover units (or take `--unit` directories)
/// 3. Load the coordinate index from the lock file
/// 4. Parse and resolve every unit; Ctrl-C cancels the run
/// 5. Print each unit and a summary, optionally write JSON
///
/// With `--strict`, any unresolved symbol, ambiguity or skipped unit makes
/// the command fail after everything has been reported.
pub async fn execute(context: &CommandContext, args: ResolveArgs) -> Result<()> {
    let report = run(context, &args).await?;

    for unit in &report.units {
        ui::print_unit(unit);
    }
    ui::print_summary(&report);

    if let Some(path) = &args.json {
        write_json(path, &report).await?;
        ui::info(&format!("Wrote {}", path.display()));
    }

    check_strict(&args, &report)
}

/// Everything up to (not including) output.
pub async fn run(context: &CommandContext, args: &ResolveArgs) -> Result<GenerationReport> {
    let config = &context.config;
    config.validate()?;

    let units = if args.units.is_empty() {
        discover::discover_units(&context.root, config)
    } else {
        discover::explicit_units(&context.root, &args.units, config)?
    };
    if units.is_empty() {
        ui::warning("No Java sources found");
    }

    let coordinates = match config.lock_file(&context.root) {
        Some(path) => CoordinateIndex::load(&path)?,
        None => {
            ui::warning("No lock file configured; only workspace symbols will resolve");
            CoordinateIndex::empty()
        }
    };
    info!(
        units = units.len(),
        classes = coordinates.len(),
        artifacts = coordinates.artifact_count(),
        "starting generation run"
    );

    let (requests, unreadable) = read_units(&context.root, units).await;

    let resolver = DependencyResolver::new(Arc::new(SourcePackageIndex::new()), Arc::new(coordinates))
        .with_options(config.resolver_options()?);
    let generation = if args.in_process {
        GenerationRun::new(resolver, Arc::new(ScannerParser))
    } else {
        GenerationRun::with_pool(resolver, utils::pool_options(config)?)?
    };

    let (handle, signal) = cancellation();
    let interrupt = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            ui::warning("Interrupted, shutting down parser workers...");
            handle.cancel();
        }
    });
    let result = generation.with_cancellation(signal).execute(requests).await;
    interrupt.abort();

    let mut report = result?;
    report.units.extend(unreadable);
    report.units.sort_by(|a, b| a.directory().cmp(b.directory()));
    Ok(report)
}

/// Read every unit's files. A unit with an unreadable file is skipped; a
/// generated one is only left out of the index, since it has no rule.
async fn read_units(root: &Path, units: Units) -> (Vec<UnitRequest>, Vec<UnitOutcome>) {
    let mut requests = Vec::with_capacity(units.len());
    let mut unreadable = Vec::new();
    for (directory, unit) in units {
        match UnitRequest::read(root, directory.clone(), unit.files).await {
            Ok(request) => requests.push(request.with_kind(unit.kind)),
            Err(error) if !unit.kind.emits_rule() => {
                warn!(directory = %directory.display(), %error, "generated sources not indexed");
            }
            Err(error) => unreadable.push(UnitOutcome::Skipped { directory, error }),
        }
    }
    (requests, unreadable)
}

async fn write_json(path: &Path, report: &GenerationReport) -> Result<()> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    tokio::fs::write(path, json).await.with_path(path)
}

fn check_strict(args: &ResolveArgs, report: &GenerationReport) -> Result<()> {
    let (unresolved, ambiguities, skipped) =
        (report.unresolved(), report.ambiguities(), report.skipped());
    if args.strict && unresolved + ambiguities + skipped > 0 {
        return Err(CliError::Strict {
            unresolved,
            ambiguities,
            skipped,
        });
    }
    Ok(())
}
