use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use jvdeps_parser::{ParseResult, SourceFile};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::package::{FileFacts, Package, PackageSnapshot, ReferencedSymbols};

/// Which directory declares a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "directories", rename_all = "snake_case")]
pub enum Lookup {
    Found(PathBuf),
    /// More than one directory declares the symbol, sorted by path.
    Ambiguous(Vec<PathBuf>),
    /// Nothing recorded so far declares it.
    Missing,
}

/// Directory-keyed cache of parsed package facts.
#[derive(Debug, Default)]
pub struct SourcePackageIndex {
    packages: DashMap<PathBuf, Arc<Mutex<Package>>>,
    /// Fully-qualified declared type -> directories declaring it.
    owners: DashMap<String, BTreeSet<PathBuf>>,
    generation: AtomicU64,
}

impl SourcePackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's parse result into the package for `directory`.
    ///
    /// Safe to call concurrently; merges into the same directory are
    /// serialised. Returns the index generation after the merge.
    pub fn record_parse(
        &self,
        directory: impl Into<PathBuf>,
        file: &SourceFile,
        result: ParseResult,
    ) -> u64 {
        let directory = directory.into();
        // Clone the handle so the shard lock is released before the package
        // lock is taken.
        let package = self
            .packages
            .entry(directory.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Package::new(directory.clone()))))
            .clone();

        let mut package = package.lock();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let facts = FileFacts {
            stamp: file.stamp(),
            result,
        };
        let change = package.merge(file.path().to_path_buf(), facts, generation);

        for symbol in &change.removed {
            if let Some(mut owners) = self.owners.get_mut(symbol) {
                owners.remove(&directory);
            }
            self.owners.remove_if(symbol, |_, owners| owners.is_empty());
        }

        for symbol in change.added {
            let mut owners = self.owners.entry(symbol.clone()).or_default();
            owners.insert(directory.clone());
            if owners.len() > 1 {
                warn!(
                    symbol = %symbol,
                    directories = ?owners.iter().collect::<Vec<_>>(),
                    "type declared in more than one directory"
                );
            }
        }

        let names = package.package_names();
        if names.len() > 1 {
            debug!(
                directory = %directory.display(),
                packages = ?names,
                "unit spans several packages"
            );
        }

        debug!(
            directory = %directory.display(),
            path = %file.path().display(),
            stamp = %file.stamp(),
            generation,
            "recorded parse"
        );
        generation
    }

    /// Whether `file` is already recorded under `directory` with the same
    /// content.
    pub fn is_current(&self, directory: &Path, file: &SourceFile) -> bool {
        let Some(package) = self.packages.get(directory).map(|entry| entry.clone()) else {
            return false;
        };
        package.lock().is_current(file.path(), file.stamp())
    }

    /// Which directory declares `symbol`.
    ///
    /// A `Missing` answer is only final once every directory that could
    /// declare the symbol has been recorded.
    pub fn lookup(&self, symbol: &str) -> Lookup {
        match self.owners.get(symbol) {
            None => Lookup::Missing,
            Some(owners) => {
                let mut directories = owners.iter();
                match (directories.next(), directories.next()) {
                    (None, _) => Lookup::Missing,
                    (Some(only), None) => Lookup::Found(only.clone()),
                    _ => Lookup::Ambiguous(owners.iter().cloned().collect()),
                }
            }
        }
    }

    /// Everything the package in `directory` references, or `None` if
    /// nothing was recorded for it.
    pub fn all_referenced_symbols(&self, directory: &Path) -> Option<ReferencedSymbols> {
        let package = self.packages.get(directory)?.clone();
        let symbols = package.lock().referenced_symbols();
        Some(symbols)
    }

    /// Types declared in `directory` that some other directory declares
    /// too, with every declaring directory. Sorted by name.
    pub fn conflicts_in(&self, directory: &Path) -> Vec<(String, Vec<PathBuf>)> {
        let Some(package) = self.packages.get(directory).map(|entry| entry.clone()) else {
            return Vec::new();
        };
        let declared = package.lock().declared_types().clone();
        declared
            .into_iter()
            .filter_map(|symbol| {
                let owners = self.owners.get(&symbol)?;
                (owners.len() > 1).then(|| {
                    let directories = owners.iter().cloned().collect();
                    (symbol.clone(), directories)
                })
            })
            .collect()
    }

    pub fn package(&self, directory: &Path) -> Option<PackageSnapshot> {
        let package = self.packages.get(directory)?.clone();
        let snapshot = package.lock().snapshot();
        Some(snapshot)
    }

    /// Recorded directories, sorted.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut directories: Vec<PathBuf> =
            self.packages.iter().map(|entry| entry.key().clone()).collect();
        directories.sort();
        directories
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Incremented by every merge.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.packages.clear();
        self.owners.clear();
    }
}
