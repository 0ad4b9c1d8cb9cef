//! Facts for one source directory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use jvdeps_parser::result::qualify;
use jvdeps_parser::{ContentStamp, ParseResult};
use serde::Serialize;

/// One file's contribution to its package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFacts {
    pub stamp: ContentStamp,
    pub result: ParseResult,
}

/// Declared types that appeared or disappeared in a merge.
#[derive(Debug, Default)]
pub(crate) struct DeclaredChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// Parsed facts for every recorded file in one directory.
#[derive(Debug)]
pub struct Package {
    directory: PathBuf,
    files: BTreeMap<PathBuf, FileFacts>,
    /// Fully-qualified declared types, across all files.
    declared: BTreeSet<String>,
    generation: u64,
}

impl Package {
    pub(crate) fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            files: BTreeMap::new(),
            declared: BTreeSet::new(),
            generation: 0,
        }
    }

    /// Record `path`'s facts, replacing anything recorded for it before.
    pub(crate) fn merge(
        &mut self,
        path: PathBuf,
        facts: FileFacts,
        generation: u64,
    ) -> DeclaredChange {
        self.files.insert(path, facts);
        self.generation = generation;

        let declared: BTreeSet<String> = self
            .files
            .values()
            .flat_map(|facts| facts.result.qualified_declared_types())
            .collect();

        let change = DeclaredChange {
            added: declared.difference(&self.declared).cloned().collect(),
            removed: self.declared.difference(&declared).cloned().collect(),
        };
        self.declared = declared;
        change
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Declared Java package. Files normally agree; when they don't, the
    /// first file in path order wins.
    pub fn name(&self) -> &str {
        self.files
            .values()
            .next()
            .map(|facts| facts.result.package.as_str())
            .unwrap_or_default()
    }

    /// Every distinct package name declared by the files.
    pub fn package_names(&self) -> BTreeSet<&str> {
        self.files
            .values()
            .map(|facts| facts.result.package.as_str())
            .collect()
    }

    pub fn declared_types(&self) -> &BTreeSet<String> {
        &self.declared
    }

    pub fn declares(&self, symbol: &str) -> bool {
        self.declared.contains(symbol)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Whether `path` is recorded with exactly this content.
    pub fn is_current(&self, path: &Path, stamp: ContentStamp) -> bool {
        self.files
            .get(path)
            .is_some_and(|facts| facts.stamp == stamp)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Union of everything the package's files reference.
    ///
    /// Simple names declared by the package itself are dropped here, since
    /// they need no dependency.
    pub fn referenced_symbols(&self) -> ReferencedSymbols {
        let mut symbols = ReferencedSymbols {
            package: self.name().to_string(),
            packages: self.package_names().into_iter().map(str::to_string).collect(),
            ..ReferencedSymbols::default()
        };

        for facts in self.files.values() {
            let result = &facts.result;
            symbols.qualified.extend(result.imports.iter().cloned());
            symbols
                .qualified
                .extend(result.qualified_references.iter().cloned());
            symbols
                .wildcard_packages
                .extend(result.wildcard_imports.iter().cloned());
            symbols
                .reflective
                .extend(result.reflective_references.iter().cloned());
            symbols.simple_names.extend(
                result
                    .simple_names
                    .iter()
                    .filter(|name| !self.declared.contains(&qualify(&result.package, name)))
                    .cloned(),
            );
        }

        symbols
    }

    pub fn snapshot(&self) -> PackageSnapshot {
        PackageSnapshot {
            directory: self.directory.clone(),
            package: self.name().to_string(),
            declared_types: self.declared.iter().cloned().collect(),
            files: self.files.len(),
            generation: self.generation,
        }
    }
}

/// Everything a package needs resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferencedSymbols {
    /// Declared Java package of the directory.
    pub package: String,
    /// Every package declared by the unit's files. More than one when a
    /// unit spans a module of several packages.
    pub packages: BTreeSet<String>,
    /// Fully-qualified names: explicit imports plus inline references.
    pub qualified: BTreeSet<String>,
    /// Simple names not declared by the package and not explicitly imported.
    pub simple_names: BTreeSet<String>,
    /// Packages imported with a wildcard.
    pub wildcard_packages: BTreeSet<String>,
    /// Class names only seen in reflective string literals.
    pub reflective: BTreeSet<String>,
}

/// A detached copy of a package's summary, for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSnapshot {
    pub directory: PathBuf,
    pub package: String,
    pub declared_types: Vec<String>,
    pub files: usize,
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(contents: &str, result: ParseResult) -> FileFacts {
        FileFacts {
            stamp: ContentStamp::of(contents.as_bytes()),
            result,
        }
    }

    fn parsed(package: &str, declared: &[&str], simple: &[&str]) -> ParseResult {
        ParseResult {
            package: package.to_string(),
            declared_types: declared.iter().map(|s| s.to_string()).collect(),
            simple_names: simple.iter().map(|s| s.to_string()).collect(),
            ..ParseResult::default()
        }
    }

    #[test]
    fn remerging_a_file_replaces_its_declarations() {
        let mut package = Package::new(PathBuf::from("pkg/b"));

        let change = package.merge(
            PathBuf::from("pkg/b/Foo.java"),
            facts("v1", parsed("pkg.b", &["Foo", "Old"], &[])),
            1,
        );
        assert_eq!(change.added, vec!["pkg.b.Foo", "pkg.b.Old"]);

        let change = package.merge(
            PathBuf::from("pkg/b/Foo.java"),
            facts("v2", parsed("pkg.b", &["Foo"], &[])),
            2,
        );
        assert!(change.added.is_empty());
        assert_eq!(change.removed, vec!["pkg.b.Old"]);
        assert_eq!(package.generation(), 2);
        assert_eq!(package.file_count(), 1);
    }

    #[test]
    fn simple_names_declared_by_sibling_files_are_dropped() {
        let mut package = Package::new(PathBuf::from("pkg/a"));
        package.merge(
            PathBuf::from("pkg/a/A.java"),
            facts("a", parsed("pkg.a", &["A"], &["Helper", "Missing"])),
            1,
        );
        package.merge(
            PathBuf::from("pkg/a/Helper.java"),
            facts("h", parsed("pkg.a", &["Helper"], &[])),
            2,
        );

        let symbols = package.referenced_symbols();
        assert_eq!(symbols.package, "pkg.a");
        assert_eq!(
            symbols.simple_names,
            BTreeSet::from(["Missing".to_string()])
        );
    }

    #[test]
    fn is_current_compares_stamps() {
        let mut package = Package::new(PathBuf::from("p"));
        let recorded = facts("one", ParseResult::default());
        let stamp = recorded.stamp;
        package.merge(PathBuf::from("p/A.java"), recorded, 1);

        assert!(package.is_current(Path::new("p/A.java"), stamp));
        assert!(!package.is_current(Path::new("p/A.java"), ContentStamp::of(b"two")));
        assert!(!package.is_current(Path::new("p/B.java"), stamp));
    }
}
