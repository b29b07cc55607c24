//! Error types for the build crate.

use std::path::PathBuf;

use grit_refs::RefError;
use grit_store::StoreError;

/// Errors that can occur while building trees and commits.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A file or directory could not be read from the source.
    #[error("cannot read {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build root is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A directory entry has a name that cannot appear in a tree.
    #[error("invalid entry name at {}: {reason}", .path.display())]
    InvalidName { path: PathBuf, reason: String },

    /// HEAD does not resolve to any commit yet.
    #[error("no commits yet")]
    NoCommits,

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Ref operation failed.
    #[error("ref error: {0}")]
    Ref(#[from] RefError),
}

impl BuildError {
    pub(crate) fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Source {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for build results.
pub type BuildResult<T> = Result<T, BuildError>;
