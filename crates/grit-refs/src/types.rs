//! Core ref types.

use grit_types::ObjectId;

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// HEAD points to a branch by short name (e.g. `main`).
    Symbolic(String),
    /// HEAD is detached, pointing directly to a commit id.
    Detached(ObjectId),
}

impl Head {
    /// The branch HEAD names, if symbolic.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Head::Symbolic(name) => Some(name),
            Head::Detached(_) => None,
        }
    }
}
