//! # jvdeps-index
//!
//! In-memory, directory-keyed cache of parsed Java package facts.
//!
//! [`SourcePackageIndex`] is the single source of truth for "what does
//! directory D declare and reference". It is populated incrementally while
//! files are parsed and queried by fully-qualified symbol afterwards.
//!
//! ## Synchronisation
//!
//! - Packages live in a sharded [`DashMap`](dashmap::DashMap), so merges into
//!   different directories never contend.
//! - Each [`Package`] sits behind its own mutex, serialising merges into the
//!   same directory.
//! - A declared-type owner map answers [`lookup`](SourcePackageIndex::lookup)
//!   without touching any package lock.
//!
//! The index is run-scoped: share it by `Arc` handle, drop it when the run
//! ends.

mod index;
mod package;

pub use index::{Lookup, SourcePackageIndex};
pub use package::{FileFacts, Package, PackageSnapshot, ReferencedSymbols};
