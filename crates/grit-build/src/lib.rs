//! Snapshot and history construction for grit.
//!
//! Turns a directory hierarchy into a graph of blob and tree objects, and
//! records commits over those trees while keeping HEAD on the newest one.
//!
//! # Key Types
//!
//! - [`TreeBuilder`] -- Recursive directory → tree snapshotting
//! - [`CommitBuilder`] -- Commit assembly, HEAD advancement, `show`
//! - [`CommitRequest`] -- Fully specified commit (explicit signatures)
//! - [`DirSource`] -- Read access to a directory hierarchy
//! - [`DiskSource`] / [`MemorySource`] -- Filesystem and in-memory sources

pub mod commit;
pub mod error;
pub mod source;
pub mod tree;

pub use commit::{CommitBuilder, CommitRequest};
pub use error::{BuildError, BuildResult};
pub use source::{DirSource, DiskSource, EntryKind, MemorySource, SourceEntry};
pub use tree::{TreeBuilder, DEFAULT_EXCLUDES};
