//! Package-grouping units: what goes in, what comes out.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use jvdeps_maven::Label;
use jvdeps_parser::SourceFile;
use serde::{Serialize, Serializer};

use crate::error::UnitError;
use crate::outcome::Ambiguity;

/// What a unit's sources are for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    #[default]
    Library,
    Test,
    /// Indexed so other units can resolve against it; emits no rule.
    Generated,
}

impl UnitKind {
    pub fn emits_rule(self) -> bool {
        self != UnitKind::Generated
    }
}

/// The source files that become one build rule.
#[derive(Debug, Clone)]
pub struct UnitRequest {
    /// Workspace-relative directory.
    pub directory: PathBuf,
    pub files: Vec<SourceFile>,
    pub kind: UnitKind,
}

impl UnitRequest {
    pub fn new(directory: impl Into<PathBuf>, files: Vec<SourceFile>) -> Self {
        Self {
            directory: directory.into(),
            files,
            kind: UnitKind::Library,
        }
    }

    pub fn with_kind(mut self, kind: UnitKind) -> Self {
        self.kind = kind;
        self
    }

    /// Read `paths` (workspace-relative) from under `root`.
    pub async fn read(
        root: &Path,
        directory: impl Into<PathBuf>,
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Self, UnitError> {
        let mut files = Vec::new();
        for path in paths {
            let file = SourceFile::read(root, &path)
                .await
                .map_err(|source| UnitError::Read { path, source })?;
            files.push(file);
        }
        Ok(Self::new(directory, files))
    }
}

/// Issues found while resolving one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    /// Symbols no index could satisfy, sorted.
    pub unresolved: BTreeSet<String>,
    pub ambiguities: Vec<Ambiguity>,
}

impl UnitReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.ambiguities.is_empty()
    }
}

/// The attribute content for one unit's build rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitResolution {
    pub directory: PathBuf,
    pub kind: UnitKind,
    pub label: Label,
    pub deps: Vec<Label>,
    pub runtime_deps: Vec<Label>,
    pub report: UnitReport,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitOutcome {
    Resolved(UnitResolution),
    Skipped {
        directory: PathBuf,
        #[serde(serialize_with = "display")]
        error: UnitError,
    },
}

impl UnitOutcome {
    pub fn directory(&self) -> &Path {
        match self {
            UnitOutcome::Resolved(resolution) => &resolution.directory,
            UnitOutcome::Skipped { directory, .. } => directory,
        }
    }

    pub fn resolution(&self) -> Option<&UnitResolution> {
        match self {
            UnitOutcome::Resolved(resolution) => Some(resolution),
            UnitOutcome::Skipped { .. } => None,
        }
    }
}

fn display<S: Serializer>(error: &UnitError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
