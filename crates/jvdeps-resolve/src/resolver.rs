//! Resolution of one unit's referenced symbols to labels.

use std::path::Path;
use std::sync::Arc;

use jvdeps_index::{Lookup, ReferencedSymbols, SourcePackageIndex};
use jvdeps_maven::{CoordinateIndex, CoordinateMatch, Label};
use jvdeps_parser::result::qualify;
use jvdeps_parser::{ParseResult, SourceFile};
use tracing::{debug, warn};

use crate::classify::{Classification, DependencySet};
use crate::heuristic::RuntimeHeuristic;
use crate::jdk::{JdkPlatform, is_java_lang};
use crate::label::{BazelConvention, LabelLookup};
use crate::outcome::{Ambiguity, ResolutionOutcome};
use crate::unit::{UnitKind, UnitReport, UnitResolution};

/// Knobs that change how symbols are classified.
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    pub jdk: JdkPlatform,
    pub runtime: RuntimeHeuristic,
}

/// Where in the unit a symbol was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// Import or inline fully-qualified reference.
    Direct,
    /// Only in a reflective string literal.
    ReflectiveOnly,
}

/// Resolves units against the shared package index and the coordinate
/// index. Cheap to clone.
#[derive(Clone)]
pub struct DependencyResolver {
    index: Arc<SourcePackageIndex>,
    coordinates: Arc<CoordinateIndex>,
    labels: Arc<dyn LabelLookup>,
    options: ResolverOptions,
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("packages", &self.index.len())
            .field("coordinates", &self.coordinates.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DependencyResolver {
    pub fn new(index: Arc<SourcePackageIndex>, coordinates: Arc<CoordinateIndex>) -> Self {
        Self {
            index,
            coordinates,
            labels: Arc::new(BazelConvention),
            options: ResolverOptions::default(),
        }
    }

    pub fn with_labels(mut self, labels: impl LabelLookup + 'static) -> Self {
        self.labels = Arc::new(labels);
        self
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn index(&self) -> &Arc<SourcePackageIndex> {
        &self.index
    }

    pub fn coordinates(&self) -> &Arc<CoordinateIndex> {
        &self.coordinates
    }

    /// Whether `file` still has to be parsed for `directory`.
    pub fn needs_parse(&self, directory: &Path, file: &SourceFile) -> bool {
        !self.index.is_current(directory, file)
    }

    pub fn record(&self, directory: &Path, file: &SourceFile, result: ParseResult) {
        self.index.record_parse(directory, file, result);
    }

    /// Resolve everything the package in `directory` references.
    pub fn resolve_unit(&self, directory: &Path, kind: UnitKind) -> UnitResolution {
        let symbols = self
            .index
            .all_referenced_symbols(directory)
            .unwrap_or_default();

        let mut dependencies = DependencySet::new();
        let mut report = UnitReport::default();
        let mut record = |symbol: &str, outcome: ResolutionOutcome| match outcome {
            ResolutionOutcome::Found {
                label,
                classification,
            } => dependencies.insert(label, classification),
            ResolutionOutcome::Local | ResolutionOutcome::Builtin => {}
            ResolutionOutcome::Ambiguous(ambiguity) => {
                warn!(directory = %directory.display(), "{ambiguity}");
                report.ambiguities.push(ambiguity);
            }
            ResolutionOutcome::Unresolved => {
                report.unresolved.insert(symbol.to_string());
            }
        };

        for symbol in &symbols.qualified {
            let outcome = self.resolve_symbol(symbol, directory, Usage::Direct);
            record(symbol, outcome);
        }

        if self.options.runtime.detects_reflection() {
            for symbol in symbols.reflective.difference(&symbols.qualified) {
                let outcome = self.resolve_symbol(symbol, directory, Usage::ReflectiveOnly);
                record(symbol, outcome);
            }
        }

        for name in &symbols.simple_names {
            let outcome = self.resolve_simple_name(name, directory, &symbols);
            record(&qualify(&symbols.package, name), outcome);
        }

        // A type declared here and elsewhere is ambiguous for every
        // declaring unit, referenced or not.
        for (symbol, directories) in self.index.conflicts_in(directory) {
            if report.ambiguities.iter().all(|known| known.symbol != symbol) {
                report.ambiguities.push(Ambiguity::local(symbol, directories));
            }
        }

        report.ambiguities.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        let (deps, runtime_deps) = dependencies.split();

        debug!(
            directory = %directory.display(),
            deps = deps.len(),
            runtime_deps = runtime_deps.len(),
            unresolved = report.unresolved.len(),
            ambiguities = report.ambiguities.len(),
            "resolved unit"
        );

        UnitResolution {
            directory: directory.to_path_buf(),
            kind,
            label: self.labels.label_for(directory),
            deps,
            runtime_deps,
            report,
        }
    }

    /// Resolve one fully-qualified symbol referenced from `directory`:
    /// the package index, then the coordinate index, then the platform.
    pub fn resolve_symbol(&self, symbol: &str, directory: &Path, usage: Usage) -> ResolutionOutcome {
        match self.lookup_indices(symbol, directory, usage) {
            ResolutionOutcome::Unresolved if self.options.jdk.provides(symbol) => {
                ResolutionOutcome::Builtin
            }
            outcome => outcome,
        }
    }

    fn lookup_indices(&self, symbol: &str, directory: &Path, usage: Usage) -> ResolutionOutcome {
        match self.lookup_local(symbol, directory) {
            ResolutionOutcome::Unresolved => self.lookup_coordinates(symbol, usage),
            outcome => outcome,
        }
    }

    fn lookup_local(&self, symbol: &str, directory: &Path) -> ResolutionOutcome {
        match self.index.lookup(symbol) {
            Lookup::Found(owner) if owner == directory => ResolutionOutcome::Local,
            Lookup::Found(owner) => ResolutionOutcome::Found {
                label: self.labels.label_for(&owner),
                classification: Classification::Compile,
            },
            Lookup::Ambiguous(directories) => {
                ResolutionOutcome::Ambiguous(Ambiguity::local(symbol, directories))
            }
            Lookup::Missing => ResolutionOutcome::Unresolved,
        }
    }

    fn lookup_coordinates(&self, symbol: &str, usage: Usage) -> ResolutionOutcome {
        match self.coordinates.resolve(symbol) {
            CoordinateMatch::Found(artifact) => {
                let runtime_only = usage == Usage::ReflectiveOnly
                    || self.options.runtime.is_runtime_only(symbol);
                ResolutionOutcome::Found {
                    label: artifact.label,
                    classification: if runtime_only {
                        Classification::Runtime
                    } else {
                        Classification::Compile
                    },
                }
            }
            CoordinateMatch::Ambiguous(artifacts) => {
                ResolutionOutcome::Ambiguous(Ambiguity::coordinate(symbol, artifacts))
            }
            CoordinateMatch::Missing => ResolutionOutcome::Unresolved,
        }
    }

    /// Own packages, then wildcard imports, then `java.lang` and platform
    /// wildcard imports.
    fn resolve_simple_name(
        &self,
        name: &str,
        directory: &Path,
        symbols: &ReferencedSymbols,
    ) -> ResolutionOutcome {
        let own = qualify(&symbols.package, name);
        let other_packages = symbols.packages.iter().filter(|package| **package != symbols.package);
        for package in std::iter::once(&symbols.package).chain(other_packages) {
            match self.lookup_local(&qualify(package, name), directory) {
                ResolutionOutcome::Unresolved => {}
                outcome => return outcome,
            }
        }

        let mut hits: Vec<(String, ResolutionOutcome)> = Vec::new();
        let mut platform_wildcard = false;
        for package in &symbols.wildcard_packages {
            let candidate = qualify(package, name);
            match self.lookup_indices(&candidate, directory, Usage::Direct) {
                ResolutionOutcome::Unresolved => {
                    platform_wildcard |= self.options.jdk.provides_package(package);
                }
                outcome => hits.push((candidate, outcome)),
            }
        }

        match hits.len() {
            0 => {}
            1 => {
                if let Some((_, outcome)) = hits.pop() {
                    return outcome;
                }
            }
            _ => {
                let candidates = hits.into_iter().map(|(candidate, _)| candidate).collect();
                return ResolutionOutcome::Ambiguous(Ambiguity::wildcard(own, candidates));
            }
        }

        if is_java_lang(name) || platform_wildcard {
            return ResolutionOutcome::Builtin;
        }
        ResolutionOutcome::Unresolved
    }

    /// Label for a unit, through the configured lookup.
    pub fn label_for(&self, directory: &Path) -> Label {
        self.labels.label_for(directory)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn parsed(package: &str, declared: &[&str]) -> ParseResult {
        ParseResult {
            package: package.to_string(),
            declared_types: declared.iter().map(|s| s.to_string()).collect(),
            ..ParseResult::default()
        }
    }

    fn resolver_with(lock: &str) -> DependencyResolver {
        let coordinates = CoordinateIndex::build(lock.as_bytes()).unwrap();
        DependencyResolver::new(Arc::new(SourcePackageIndex::new()), Arc::new(coordinates))
    }

    const LOCK: &str = r#"{"version": 1, "repository": "maven", "artifacts": [
        {"coordinate": "com.example:lib:1.0", "classes": ["com.example.lib.Bar", "com.example.lib.Util"]},
        {"coordinate": "org.postgresql:postgresql:42.7.0", "classes": ["org.postgresql.Driver"]},
        {"coordinate": "other:util:1.0", "classes": ["other.util.Util"]}
    ]}"#;

    #[test]
    fn platform_symbols_are_builtin() {
        let resolver = resolver_with(LOCK);
        assert_eq!(
            resolver.resolve_symbol("java.util.List", Path::new("a"), Usage::Direct),
            ResolutionOutcome::Builtin
        );
    }

    #[test]
    fn locked_classes_under_platform_prefixes_are_found() {
        let resolver = resolver_with(
            r#"{"version": 1, "repository": "maven", "artifacts": [
                {"coordinate": "javax.inject:javax.inject:1", "classes": ["javax.inject.Inject"]}
            ]}"#,
        );
        assert_eq!(
            resolver.resolve_symbol("javax.inject.Inject", Path::new("a"), Usage::Direct),
            ResolutionOutcome::Found {
                label: Label::new_unchecked("@maven//:javax_inject_javax_inject"),
                classification: Classification::Compile,
            }
        );
        assert_eq!(
            resolver.resolve_symbol("javax.inject.Named", Path::new("a"), Usage::Direct),
            ResolutionOutcome::Builtin
        );
    }

    #[test]
    fn workspace_types_under_platform_prefixes_are_found() {
        let resolver = resolver_with(LOCK);
        let file = SourceFile::new("ext/Patch.java", "Patch");
        resolver.record(Path::new("ext"), &file, parsed("javax.extra", &["Patch"]));
        assert!(matches!(
            resolver.resolve_symbol("javax.extra.Patch", Path::new("app"), Usage::Direct),
            ResolutionOutcome::Found { .. }
        ));
    }

    #[test]
    fn reflective_only_matches_are_runtime() {
        let resolver = resolver_with(LOCK);
        match resolver.resolve_symbol("org.postgresql.Driver", Path::new("a"), Usage::ReflectiveOnly) {
            ResolutionOutcome::Found { classification, .. } => {
                assert_eq!(classification, Classification::Runtime)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn configured_patterns_force_runtime() {
        let options = ResolverOptions {
            runtime: RuntimeHeuristic::new(true, [r"\.Driver$"]).unwrap(),
            ..ResolverOptions::default()
        };
        let resolver = resolver_with(LOCK).with_options(options);
        match resolver.resolve_symbol("org.postgresql.Driver", Path::new("a"), Usage::Direct) {
            ResolutionOutcome::Found { classification, .. } => {
                assert_eq!(classification, Classification::Runtime)
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn self_references_contribute_nothing() {
        let resolver = resolver_with(LOCK);
        let file = SourceFile::new("pkg/a/A.java", "A");
        resolver.record(Path::new("pkg/a"), &file, parsed("pkg.a", &["A"]));
        assert_eq!(
            resolver.resolve_symbol("pkg.a.A", Path::new("pkg/a"), Usage::Direct),
            ResolutionOutcome::Local
        );
    }

    #[test]
    fn simple_names_try_wildcards_then_java_lang() {
        let resolver = resolver_with(LOCK);
        let symbols = ReferencedSymbols {
            package: "pkg.a".to_string(),
            wildcard_packages: BTreeSet::from(["com.example.lib".to_string(), "java.util".to_string()]),
            ..ReferencedSymbols::default()
        };
        let dir = Path::new("pkg/a");

        assert!(matches!(
            resolver.resolve_simple_name("Bar", dir, &symbols),
            ResolutionOutcome::Found { .. }
        ));
        assert_eq!(resolver.resolve_simple_name("String", dir, &symbols), ResolutionOutcome::Builtin);
        // Satisfied by the platform wildcard.
        assert_eq!(resolver.resolve_simple_name("List", dir, &symbols), ResolutionOutcome::Builtin);

        let no_platform = ReferencedSymbols {
            wildcard_packages: BTreeSet::from(["com.example.lib".to_string()]),
            ..symbols.clone()
        };
        assert_eq!(
            resolver.resolve_simple_name("Nope", dir, &no_platform),
            ResolutionOutcome::Unresolved
        );
    }

    #[test]
    fn platform_wildcards_consult_the_indices_first() {
        let resolver = resolver_with(
            r#"{"version": 1, "repository": "maven", "artifacts": [
                {"coordinate": "javax.servlet:servlet-api:2.5", "classes": ["javax.servlet.Filter"]}
            ]}"#,
        );
        let symbols = ReferencedSymbols {
            package: "pkg.a".to_string(),
            wildcard_packages: BTreeSet::from(["javax.servlet".to_string()]),
            ..ReferencedSymbols::default()
        };
        let dir = Path::new("pkg/a");

        assert_eq!(
            resolver.resolve_simple_name("Filter", dir, &symbols),
            ResolutionOutcome::Found {
                label: Label::new_unchecked("@maven//:javax_servlet_servlet_api"),
                classification: Classification::Compile,
            }
        );
        assert_eq!(resolver.resolve_simple_name("Servlet", dir, &symbols), ResolutionOutcome::Builtin);
    }

    #[test]
    fn simple_name_in_two_wildcards_is_ambiguous() {
        let resolver = resolver_with(LOCK);
        let symbols = ReferencedSymbols {
            package: "pkg.a".to_string(),
            wildcard_packages: BTreeSet::from(["com.example.lib".to_string(), "other.util".to_string()]),
            ..ReferencedSymbols::default()
        };

        match resolver.resolve_simple_name("Util", Path::new("pkg/a"), &symbols) {
            ResolutionOutcome::Ambiguous(ambiguity) => {
                assert_eq!(ambiguity.symbol, "pkg.a.Util");
                assert_eq!(
                    ambiguity.kind,
                    crate::outcome::AmbiguityKind::WildcardImport {
                        candidates: vec!["com.example.lib.Util".to_string(), "other.util.Util".to_string()],
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
