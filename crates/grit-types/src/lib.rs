//! Foundation types for grit.
//!
//! Every other grit crate depends on `grit-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (SHA-1 of an object's canonical encoding)
//! - [`Signature`] -- Author/committer identity with a timestamp and UTC offset

pub mod error;
pub mod object;
pub mod signature;

pub use error::TypeError;
pub use object::{ObjectId, HEX_LEN, ID_LEN};
pub use signature::Signature;
