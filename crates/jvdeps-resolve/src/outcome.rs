//! Per-symbol resolution results.

use std::fmt;
use std::path::PathBuf;

use jvdeps_maven::{Artifact, Label};
use serde::Serialize;

use crate::classify::Classification;

/// How one referenced symbol was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Provided by another unit or an external artifact.
    Found {
        label: Label,
        classification: Classification,
    },
    /// Declared by the unit itself.
    Local,
    /// Provided by the JDK.
    Builtin,
    Ambiguous(Ambiguity),
    Unresolved,
}

/// A symbol with more than one possible provider. Never auto-picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ambiguity {
    pub symbol: String,
    #[serde(flatten)]
    pub kind: AmbiguityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmbiguityKind {
    /// Several source directories declare the same type.
    LocalDeclaration { directories: Vec<PathBuf> },
    /// Several artifacts provide the same class.
    Coordinate { artifacts: Vec<Artifact> },
    /// A simple name matches a type in several wildcard-imported packages.
    WildcardImport { candidates: Vec<String> },
}

impl Ambiguity {
    pub fn local(symbol: impl Into<String>, directories: Vec<PathBuf>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: AmbiguityKind::LocalDeclaration { directories },
        }
    }

    pub fn coordinate(symbol: impl Into<String>, artifacts: Vec<Artifact>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: AmbiguityKind::Coordinate { artifacts },
        }
    }

    pub fn wildcard(symbol: impl Into<String>, candidates: Vec<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: AmbiguityKind::WildcardImport { candidates },
        }
    }
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AmbiguityKind::LocalDeclaration { directories } => {
                let directories: Vec<_> = directories.iter().map(|d| d.display().to_string()).collect();
                write!(
                    f,
                    "`{}` is declared in several directories: {}",
                    self.symbol,
                    directories.join(", ")
                )
            }
            AmbiguityKind::Coordinate { artifacts } => {
                let artifacts: Vec<_> = artifacts
                    .iter()
                    .map(|a| format!("{} ({})", a.coordinate, a.label))
                    .collect();
                write!(
                    f,
                    "`{}` is provided by several artifacts: {}",
                    self.symbol,
                    artifacts.join(", ")
                )
            }
            AmbiguityKind::WildcardImport { candidates } => write!(
                f,
                "`{}` matches several wildcard imports: {}",
                self.symbol,
                candidates.join(", ")
            ),
        }
    }
}
