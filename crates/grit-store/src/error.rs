use std::path::PathBuf;

use grit_types::{ObjectId, TypeError};

use crate::object::ObjectKind;

/// Errors from codec and object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// Canonical bytes could not be decoded (no stored object involved).
    #[error("corrupt object data: {0}")]
    Corrupt(String),

    /// A stored object failed to decompress, verify, or decode.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// The object cannot be encoded (e.g. a tree entry name with a `/`).
    #[error("cannot encode object: {0}")]
    Encoding(String),

    /// An object of one kind was found where another was required.
    #[error("expected {expected}, found {actual}")]
    KindMismatch {
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// An object id string could not be parsed.
    #[error("invalid object id: {0}")]
    InvalidId(#[from] TypeError),

    /// No stored object matches an abbreviated id.
    #[error("no object matches {0:?}")]
    NoMatch(String),

    /// An abbreviated id matched several objects.
    #[error("ambiguous object prefix: {0}")]
    AmbiguousPrefix(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns `true` for any variant describing corrupt data.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_) | Self::CorruptObject { .. })
    }

    /// Attach the id of the stored object a codec failure came from.
    pub fn for_object(self, id: &ObjectId) -> Self {
        match self {
            Self::Corrupt(reason) => Self::CorruptObject { id: *id, reason },
            other => other,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
