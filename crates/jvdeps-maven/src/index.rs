use std::path::Path;

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::Serialize;
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::CoordinateError;
use crate::label::Label;
use crate::lockfile::LockFile;

/// A published artifact and the label that represents it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Artifact {
    pub coordinate: Coordinate,
    pub label: Label,
}

/// Result of [`CoordinateIndex::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateMatch {
    Found(Artifact),
    /// Artifacts with distinct labels all provide the class, sorted by label.
    Ambiguous(Vec<Artifact>),
    Missing,
}

/// Read-only map from fully-qualified class name to providing artifacts.
#[derive(Debug, Default)]
pub struct CoordinateIndex {
    artifacts: Vec<Artifact>,
    /// Class name -> indices into `artifacts`, deduplicated.
    classes: HashMap<String, Vec<usize>>,
}

impl CoordinateIndex {
    /// An index that resolves nothing, for runs without a lock file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and validate lock file bytes.
    pub fn build(lock_file: &[u8]) -> Result<Self, CoordinateError> {
        Self::from_lock_file(LockFile::from_slice(lock_file)?)
    }

    /// Read and build from `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, CoordinateError> {
        let bytes = std::fs::read(path).map_err(|source| CoordinateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::build(&bytes)?;
        debug!(
            path = %path.display(),
            artifacts = index.artifact_count(),
            classes = index.len(),
            "loaded coordinate index"
        );
        Ok(index)
    }

    pub fn from_lock_file(lock: LockFile) -> Result<Self, CoordinateError> {
        let mut index = Self::default();
        let mut seen = HashSet::default();

        for locked in lock.artifacts {
            let coordinate: Coordinate = locked.coordinate.parse()?;
            if !seen.insert(coordinate.clone()) {
                return Err(CoordinateError::DuplicateCoordinate {
                    coordinate: locked.coordinate,
                });
            }

            let label = match (locked.label, lock.repository.as_deref()) {
                (Some(label), _) => {
                    Label::parse(label.clone()).ok_or(CoordinateError::InvalidLabel {
                        coordinate: locked.coordinate.clone(),
                        label,
                    })?
                }
                (None, Some(repository)) => Label::for_coordinate(repository, &coordinate),
                (None, None) => {
                    return Err(CoordinateError::MissingLabel {
                        coordinate: locked.coordinate,
                    });
                }
            };

            let position = index.artifacts.len();
            for class in locked.classes {
                if !is_class_name(&class) {
                    return Err(CoordinateError::InvalidClassName {
                        coordinate: locked.coordinate,
                        class,
                    });
                }
                let providers = index.classes.entry(class).or_default();
                if !providers.contains(&position) {
                    providers.push(position);
                }
            }
            index.artifacts.push(Artifact { coordinate, label });
        }

        Ok(index)
    }

    /// Exact lookup of a fully-qualified class name.
    pub fn resolve(&self, symbol: &str) -> CoordinateMatch {
        let Some(providers) = self.classes.get(symbol) else {
            return CoordinateMatch::Missing;
        };

        let mut candidates: Vec<&Artifact> =
            providers.iter().map(|&i| &self.artifacts[i]).collect();
        candidates.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.coordinate.cmp(&b.coordinate)));
        // Two coordinates behind one label are still one dependency.
        candidates.dedup_by(|a, b| a.label == b.label);

        match candidates.as_slice() {
            [] => CoordinateMatch::Missing,
            [only] => CoordinateMatch::Found((*only).clone()),
            many => CoordinateMatch::Ambiguous(many.iter().map(|a| (*a).clone()).collect()),
        }
    }

    /// Number of distinct class names.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            segment
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}
