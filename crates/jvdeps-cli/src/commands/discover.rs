//! Finding units: directories that directly contain `.java` files.
//!
//! Source roots yield library units, test roots yield test units and
//! generated roots yield units that are indexed but never get a rule. A
//! directory listed under `resolver.modules` absorbs every unit below it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jvdeps_config::JvdepsConfig;
use jvdeps_resolve::UnitKind;
use path_clean::PathClean;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CliError, Result};

/// A unit's kind and its Java files, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredUnit {
    pub kind: UnitKind,
    pub files: Vec<PathBuf>,
}

/// Unit directory (relative to the workspace root) to its unit.
pub type Units = BTreeMap<PathBuf, DiscoveredUnit>;

/// Walk every configured root, skipping excluded directory names.
///
/// Source roots never descend into a test or generated root, and test roots
/// never descend into a generated root, so each directory has one kind.
pub fn discover_units(root: &Path, config: &JvdepsConfig) -> Units {
    let test_roots = config.test_roots(root);
    let generated_roots = config.generated_roots(root);
    let source_skips: Vec<PathBuf> = test_roots.iter().chain(&generated_roots).cloned().collect();

    let passes = [
        (config.source_roots(root), UnitKind::Library, source_skips),
        (test_roots, UnitKind::Test, generated_roots.clone()),
        (generated_roots, UnitKind::Generated, Vec::new()),
    ];

    let mut units = Units::new();
    for (roots, kind, skip) in passes {
        for walk_root in roots {
            if !walk_root.is_dir() {
                warn!(path = %walk_root.display(), ?kind, "root does not exist");
                continue;
            }
            let walker = WalkDir::new(&walk_root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    entry.depth() == 0
                        || !(is_excluded_dir(entry, config) || skip.iter().any(|s| s == entry.path()))
                });
            collect(root, walker, kind, &mut units);
        }
    }
    let units = group_modules(units, &config.resolver.modules);
    debug!(units = units.len(), "discovered units");
    units
}

/// Only the named directories, each scanned one level deep.
///
/// A directory under a test or generated root keeps that kind.
pub fn explicit_units(root: &Path, directories: &[PathBuf], config: &JvdepsConfig) -> Result<Units> {
    let test_roots = config.test_roots(root);
    let generated_roots = config.generated_roots(root);
    let mut units = Units::new();
    for directory in directories {
        let path = root.join(directory);
        if !path.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "unit is not a directory: {}",
                path.display()
            )));
        }
        let path = path.clean();
        let kind = if generated_roots.iter().any(|r| path.starts_with(r.clean())) {
            UnitKind::Generated
        } else if test_roots.iter().any(|r| path.starts_with(r.clean())) {
            UnitKind::Test
        } else {
            UnitKind::Library
        };
        let walker = WalkDir::new(&path).max_depth(1).sort_by_file_name().into_iter();
        collect(root, walker, kind, &mut units);
    }
    Ok(units)
}

/// Fold every unit below a module directory into that module's unit. The
/// deepest matching module wins; the first kind seen is kept.
fn group_modules(units: Units, modules: &[PathBuf]) -> Units {
    if modules.is_empty() {
        return units;
    }
    let modules: Vec<PathBuf> = modules.iter().map(|m| m.clean()).collect();
    let mut grouped = Units::new();
    for (directory, unit) in units {
        let target = modules
            .iter()
            .filter(|module| directory.starts_with(module))
            .max_by_key(|module| module.components().count())
            .cloned()
            .unwrap_or(directory);
        match grouped.get_mut(&target) {
            Some(existing) => existing.files.extend(unit.files),
            None => {
                grouped.insert(target, unit);
            }
        }
    }
    for unit in grouped.values_mut() {
        unit.files.sort();
    }
    grouped
}

fn collect(
    root: &Path,
    walker: impl Iterator<Item = walkdir::Result<DirEntry>>,
    kind: UnitKind,
    units: &mut Units,
) {
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.path().extension().is_none_or(|ext| ext != "java") {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.clean();
        let directory = relative
            .parent()
            .map(Path::to_path_buf)
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));
        units
            .entry(directory)
            .or_insert_with(|| DiscoveredUnit { kind, files: Vec::new() })
            .files
            .push(relative);
    }
}

fn is_excluded_dir(entry: &DirEntry, config: &JvdepsConfig) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| config.is_excluded(name))
}
