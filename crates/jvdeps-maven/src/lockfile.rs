//! On-disk lock file shape.

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

/// The only lock file version this crate reads.
pub const LOCK_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    pub version: u32,
    /// Repository name used to derive labels for artifacts without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub artifacts: Vec<LockedArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedArtifact {
    pub coordinate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fully-qualified names of the classes the artifact provides.
    #[serde(default)]
    pub classes: Vec<String>,
}

impl LockFile {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoordinateError> {
        let lock: LockFile = serde_json::from_slice(bytes)?;
        if lock.version != LOCK_FILE_VERSION {
            return Err(CoordinateError::UnsupportedVersion {
                found: lock.version,
                expected: LOCK_FILE_VERSION,
            });
        }
        Ok(lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifacts_is_malformed() {
        let err = LockFile::from_slice(br#"{"version": 1}"#).unwrap_err();
        assert!(matches!(err, CoordinateError::Json(_)), "{err}");
    }

    #[test]
    fn future_versions_are_rejected() {
        let err = LockFile::from_slice(br#"{"version": 2, "artifacts": []}"#).unwrap_err();
        assert!(matches!(
            err,
            CoordinateError::UnsupportedVersion { found: 2, expected: 1 }
        ));
    }
}
