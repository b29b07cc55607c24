//! The [`RefStore`] trait defining the reference storage interface.

use grit_types::ObjectId;
use tracing::debug;

use crate::error::Result;
use crate::names::branch_ref;
use crate::types::Head;

/// Storage backend for named references.
///
/// Implementations must be thread-safe (`Send + Sync`). Ref names are
/// canonical (`refs/heads/main`); HEAD is handled separately because it is
/// either symbolic or detached.
pub trait RefStore: Send + Sync {
    /// Read a ref by its canonical name.
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>>;

    /// Create or move a ref.
    fn write_ref(&self, name: &str, target: &ObjectId) -> Result<()>;

    /// Read the current HEAD state.
    ///
    /// Returns `Ok(None)` if HEAD has not been set.
    fn head(&self) -> Result<Option<Head>>;

    /// Set HEAD to point at a branch (symbolic ref).
    fn set_head(&self, branch: &str) -> Result<()>;

    /// Set HEAD to a detached state pointing directly to a commit.
    fn set_head_detached(&self, target: &ObjectId) -> Result<()>;

    /// The commit HEAD currently resolves to.
    ///
    /// `None` if HEAD is unset or names a branch with no commits yet.
    fn resolve_head(&self) -> Result<Option<ObjectId>> {
        match self.head()? {
            Some(Head::Symbolic(branch)) => self.read_ref(&branch_ref(&branch)),
            Some(Head::Detached(id)) => Ok(Some(id)),
            None => Ok(None),
        }
    }

    /// Advance whatever HEAD points at to `target`.
    ///
    /// Moves the current branch when HEAD is symbolic; otherwise HEAD itself
    /// is (re)detached at `target`.
    fn update_head(&self, target: &ObjectId) -> Result<()> {
        match self.head()? {
            Some(Head::Symbolic(branch)) => {
                debug!(branch = %branch, target = %target, "advancing branch");
                self.write_ref(&branch_ref(&branch), target)
            }
            Some(Head::Detached(_)) | None => {
                debug!(target = %target, "moving detached HEAD");
                self.set_head_detached(target)
            }
        }
    }
}
