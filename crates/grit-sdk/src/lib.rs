//! High-level SDK for grit.
//!
//! [`Repository`] ties the object store, ref store, and builders to an
//! on-disk `.git` layout and exposes the operations the CLI dispatches to.

pub mod config;
pub mod error;
pub mod repository;

pub use config::{CoreConfig, RepoConfig, UserConfig, CONFIG_FILE};
pub use error::{SdkError, SdkResult};
pub use repository::{Repository, GIT_DIR};

// Re-export key types
pub use grit_build::CommitRequest;
pub use grit_refs::Head;
pub use grit_store::{Blob, Commit, EntryMode, Object, ObjectKind, Tree, TreeEntry};
pub use grit_types::{ObjectId, Signature};
