//! Content-addressed object storage for grit.
//!
//! This crate implements git's object model and a hash-keyed store laid out
//! like `.git/objects/`. Every object (blob, tree, commit) is stored as an
//! immutable value identified by the SHA-1 of its canonical encoding.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- snapshot root, optional parent, identities, message
//!
//! # Codec
//!
//! [`codec`] converts between [`Object`] values and canonical bytes
//! (`"<type> <len>\0<payload>"`) without touching storage.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- zlib-compressed files sharded by id prefix
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Children are written before the objects that reference them.
//! 3. Reads verify the content hash; corrupt data is an error, never a value.
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, Object, ObjectKind, Tree, TreeEntry};
pub use traits::ObjectStore;
