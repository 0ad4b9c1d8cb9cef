//! # jvdeps-resolve
//!
//! Resolves each package-grouping unit (one directory of Java sources, one
//! build rule) to a sorted, classified label list.
//!
//! ## Algorithm
//!
//! 1. Files whose content stamp the [`SourcePackageIndex`] does not hold are
//!    parsed and recorded.
//! 2. Fully-qualified references (imports, inline names) resolve through the
//!    package index, then the coordinate index. Only a miss in both falls
//!    back to the platform prefixes.
//! 3. Simple names try the unit's own Java packages, wildcard imports, then
//!    `java.lang`.
//! 4. Reflective-only coordinate matches become `runtime_deps`; everything
//!    else that matched becomes `deps`. `Compile` wins over `Runtime`.
//! 5. Anything unmatched is reported as unresolved. Ambiguities are reported
//!    with every candidate named and contribute no label.
//!
//! [`GenerationRun`] parses every unit before resolving any, so a negative
//! package-index lookup is final when it matters. [`UnitKind::Generated`]
//! units are parsed into the index and never emitted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jvdeps_index::SourcePackageIndex;
//! use jvdeps_maven::CoordinateIndex;
//! use jvdeps_parser::{ScannerParser, SourceFile};
//! use jvdeps_resolve::{DependencyResolver, GenerationRun, UnitRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinates = CoordinateIndex::load("maven_install.json".as_ref())?;
//! let resolver = DependencyResolver::new(
//!     Arc::new(SourcePackageIndex::new()),
//!     Arc::new(coordinates),
//! );
//!
//! let units = vec![UnitRequest::new(
//!     "pkg/a",
//!     vec![SourceFile::new("pkg/a/A.java", "package pkg.a; class A {}")],
//! )];
//! let report = GenerationRun::new(resolver, Arc::new(ScannerParser))
//!     .execute(units)
//!     .await?;
//! for unit in report.resolved() {
//!     println!("{}: {:?}", unit.label, unit.deps);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`SourcePackageIndex`]: jvdeps_index::SourcePackageIndex

mod classify;
mod error;
mod heuristic;
mod jdk;
mod label;
mod outcome;
mod resolver;
mod run;
mod unit;

pub use classify::{Classification, DependencySet, ResolvedDependency};
pub use error::{ResolveError, UnitError};
pub use heuristic::RuntimeHeuristic;
pub use jdk::{DEFAULT_JDK_PREFIXES, JdkPlatform, is_java_lang};
pub use jvdeps_maven::Label;
pub use label::{BazelConvention, LabelLookup};
pub use outcome::{Ambiguity, AmbiguityKind, ResolutionOutcome};
pub use resolver::{DependencyResolver, ResolverOptions, Usage};
pub use run::{CancellationHandle, CancellationSignal, GenerationReport, GenerationRun, cancellation};
pub use unit::{UnitKind, UnitOutcome, UnitReport, UnitRequest, UnitResolution};
