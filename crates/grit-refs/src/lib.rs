//! Reference management for grit.
//!
//! References are the human-readable entry points into the commit graph,
//! laid out like git's: a `HEAD` file naming the current branch, and one
//! file per branch under `refs/heads/` holding the hex id of its tip.
//!
//! # Architecture
//!
//! - **Branches** are mutable pointers to commit ids. They advance as new
//!   commits are written.
//! - **HEAD** is a symbolic ref that names the current branch, or a detached
//!   ref pointing directly to a commit id. Resolving HEAD yields the most
//!   recent commit.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`Head`]
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Branch/ref name validation
//! - [`file`] -- On-disk [`FileRefStore`]
//! - [`memory`] -- In-memory [`InMemoryRefStore`] for tests

pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use memory::InMemoryRefStore;
pub use names::{branch_ref, validate_branch_name, validate_ref_name};
pub use traits::RefStore;
pub use types::Head;
