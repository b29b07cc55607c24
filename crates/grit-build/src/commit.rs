use grit_refs::RefStore;
use grit_store::codec::split_header;
use grit_store::{Commit, Object, ObjectKind, ObjectStore, StoreError};
use grit_types::{ObjectId, Signature};
use tracing::info;

use crate::error::{BuildError, BuildResult};

/// Everything needed to write one commit.
#[derive(Clone, Debug)]
pub struct CommitRequest {
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl CommitRequest {
    /// A root commit where author and committer are the same identity.
    pub fn new(tree: ObjectId, author: Signature, message: impl Into<String>) -> Self {
        Self {
            tree,
            parent: None,
            committer: author.clone(),
            author,
            message: message.into(),
        }
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_committer(mut self, committer: Signature) -> Self {
        self.committer = committer;
        self
    }
}

/// Writes commits and keeps HEAD pointing at the newest one.
pub struct CommitBuilder<'a> {
    store: &'a dyn ObjectStore,
    refs: &'a dyn RefStore,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(store: &'a dyn ObjectStore, refs: &'a dyn RefStore) -> Self {
        Self { store, refs }
    }

    /// Commit `tree` on top of `parent`, stamped with the current time.
    pub fn commit(
        &self,
        tree: ObjectId,
        parent: Option<ObjectId>,
        author_name: &str,
        author_email: &str,
        message: &str,
    ) -> BuildResult<ObjectId> {
        let author = Signature::now(author_name, author_email);
        let mut request = CommitRequest::new(tree, author, message);
        request.parent = parent;
        self.commit_with(request)
    }

    /// Write a commit with explicit signatures and advance HEAD to it.
    ///
    /// The tree (and parent, if any) must already be stored with the right
    /// kind.
    pub fn commit_with(&self, request: CommitRequest) -> BuildResult<ObjectId> {
        self.require(&request.tree, ObjectKind::Tree)?;
        if let Some(parent) = &request.parent {
            self.require(parent, ObjectKind::Commit)?;
        }

        let commit = Commit {
            tree: request.tree,
            parent: request.parent,
            author: request.author,
            committer: request.committer,
            message: request.message,
        };
        let id = self.store.write_object(&Object::Commit(commit))?;
        self.refs.update_head(&id)?;
        info!(commit = %id, tree = %request.tree, "commit written");
        Ok(id)
    }

    /// Canonical bytes of the commit HEAD resolves to.
    pub fn show(&self) -> BuildResult<Vec<u8>> {
        let head = self.refs.resolve_head()?.ok_or(BuildError::NoCommits)?;
        Ok(self.store.get(&head)?)
    }

    fn require(&self, id: &ObjectId, expected: ObjectKind) -> BuildResult<()> {
        let bytes = self.store.get(id)?;
        let (actual, _) = split_header(&bytes).map_err(|e| e.for_object(id))?;
        if actual != expected {
            return Err(StoreError::KindMismatch { expected, actual }.into());
        }
        Ok(())
    }
}
