//! # jvdeps-maven
//!
//! Resolves fully-qualified Java class names that no local package declares
//! to the published artifact providing them, and to the build label that
//! represents that artifact.
//!
//! The input is a lock file listing, per artifact, its coordinate, its label
//! and the classes it provides:
//!
//! ```json
//! {
//!   "version": 1,
//!   "repository": "maven",
//!   "artifacts": [
//!     {"coordinate": "com.example:lib:1.0",
//!      "label": "@maven//:com_example_lib",
//!      "classes": ["com.example.lib.Bar"]}
//!   ]
//! }
//! ```
//!
//! Lookups are exact: a class resolves only if some artifact lists that exact
//! name. A class provided by two artifacts with different labels is reported
//! as [`CoordinateMatch::Ambiguous`], never picked.

mod coordinate;
mod error;
mod index;
mod label;
mod lockfile;

pub use coordinate::Coordinate;
pub use error::CoordinateError;
pub use index::{Artifact, CoordinateIndex, CoordinateMatch};
pub use label::Label;
pub use lockfile::{LOCK_FILE_VERSION, LockFile, LockedArtifact};
