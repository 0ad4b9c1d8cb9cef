use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoordinateError;

/// A Maven coordinate: `group:artifact[:packaging[:classifier]]:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub packaging: Option<String>,
    pub classifier: Option<String>,
    pub version: String,
}

impl Coordinate {
    /// `group:artifact`, the identity of the artifact across versions.
    pub fn versionless(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoordinateError::InvalidCoordinate {
            coordinate: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(invalid("empty segment"));
        }
        if parts.iter().any(|part| part.contains(char::is_whitespace)) {
            return Err(invalid("segments may not contain whitespace"));
        }

        match parts.as_slice() {
            [group, artifact, version] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                packaging: None,
                classifier: None,
                version: version.to_string(),
            }),
            [group, artifact, packaging, version] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                packaging: Some(packaging.to_string()),
                classifier: None,
                version: version.to_string(),
            }),
            [group, artifact, packaging, classifier, version] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                packaging: Some(packaging.to_string()),
                classifier: Some(classifier.to_string()),
                version: version.to_string(),
            }),
            _ => Err(invalid(
                "expected group:artifact[:packaging[:classifier]]:version",
            )),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(packaging) = &self.packaging {
            write!(f, ":{packaging}")?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
