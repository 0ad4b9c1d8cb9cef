//! Source files handed to parser workers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// BLAKE3 hash of a file's contents.
///
/// Two files with the same stamp are guaranteed to parse to the same
/// [`ParseResult`](crate::ParseResult), which is what lets the pool and the
/// package index skip work for unchanged content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentStamp([u8; 32]);

impl ContentStamp {
    pub fn of(contents: &[u8]) -> Self {
        Self(*blake3::hash(contents).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex form of the stamp.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for ContentStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is plenty for logs.
        f.write_str(&self.to_hex()[..12])
    }
}

/// A Java source file: workspace-relative path plus immutable contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    contents: Arc<str>,
    stamp: ContentStamp,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Arc<str>>) -> Self {
        let contents = contents.into();
        let stamp = ContentStamp::of(contents.as_bytes());
        Self {
            path: path.into(),
            contents,
            stamp,
        }
    }

    /// Read `relative` (resolved against `root`) from disk.
    ///
    /// The stored path stays relative so labels and reports never leak the
    /// absolute workspace location.
    pub async fn read(root: &Path, relative: impl Into<PathBuf>) -> std::io::Result<Self> {
        let relative = relative.into();
        let contents = tokio::fs::read_to_string(root.join(&relative)).await?;
        Ok(Self::new(relative, contents))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn stamp(&self) -> ContentStamp {
        self.stamp
    }

    /// Directory containing the file (empty for files at the workspace root).
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
