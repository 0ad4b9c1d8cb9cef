//! Dependency classification and the per-unit label set.

use std::collections::BTreeMap;

use jvdeps_maven::Label;
use serde::Serialize;

/// Why a unit needs a label. Ordered so that `max` picks the stronger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Needed only at execution time (reflection, service loading).
    Runtime,
    /// Needed to compile against.
    Compile,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResolvedDependency {
    pub label: Label,
    pub classification: Classification,
}

/// Labels collected for one unit, each with the strongest classification it
/// earned. Iteration is in label order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    labels: BTreeMap<Label, Classification>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: Label, classification: Classification) {
        self.labels
            .entry(label)
            .and_modify(|existing| *existing = (*existing).max(classification))
            .or_insert(classification);
    }

    pub fn get(&self, label: &Label) -> Option<Classification> {
        self.labels.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResolvedDependency> + '_ {
        self.labels
            .iter()
            .map(|(label, &classification)| ResolvedDependency {
                label: label.clone(),
                classification,
            })
    }

    /// Sorted `(deps, runtime_deps)`.
    pub fn split(self) -> (Vec<Label>, Vec<Label>) {
        let mut deps = Vec::new();
        let mut runtime_deps = Vec::new();
        for (label, classification) in self.labels {
            match classification {
                Classification::Compile => deps.push(label),
                Classification::Runtime => runtime_deps.push(label),
            }
        }
        (deps, runtime_deps)
    }
}

impl Extend<ResolvedDependency> for DependencySet {
    fn extend<T: IntoIterator<Item = ResolvedDependency>>(&mut self, iter: T) {
        for dependency in iter {
            self.insert(dependency.label, dependency.classification);
        }
    }
}

impl FromIterator<ResolvedDependency> for DependencySet {
    fn from_iter<T: IntoIterator<Item = ResolvedDependency>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
