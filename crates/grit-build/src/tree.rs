//! Recursive directory → tree snapshotting.

use std::path::Path;

use grit_store::codec::validate_entry_name;
use grit_store::{Blob, EntryMode, Object, ObjectStore, Tree, TreeEntry};
use grit_types::ObjectId;
use tracing::{debug, warn};

use crate::error::{BuildError, BuildResult};
use crate::source::{DirSource, EntryKind};

/// Entry names skipped by default.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git"];

/// Builds tree objects from a directory hierarchy.
///
/// Files become blobs with mode `100644`; subdirectories become nested trees
/// with mode `40000`, including empty ones. Every blob and tree is written to
/// the store (skipped when already present) and the root tree id returned.
///
/// Entries are put in git's canonical order, so the result does not depend
/// on how the source enumerates a directory. The first read failure aborts
/// the build; objects written before it stay in the store.
pub struct TreeBuilder<'a> {
    store: &'a dyn ObjectStore,
    source: &'a dyn DirSource,
    excludes: Vec<String>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(store: &'a dyn ObjectStore, source: &'a dyn DirSource) -> Self {
        Self {
            store,
            source,
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the exclusion list.
    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|e| e == name)
    }

    /// Snapshot the directory at `root` and return its tree id.
    pub fn build(&self, root: &Path) -> BuildResult<ObjectId> {
        let is_dir = self
            .source
            .is_directory(root)
            .map_err(|e| BuildError::read_failed(root, e))?;
        if !is_dir {
            return Err(BuildError::NotADirectory(root.to_path_buf()));
        }
        let id = self.build_dir(root)?;
        debug!(root = %root.display(), tree = %id, "tree built");
        Ok(id)
    }

    fn build_dir(&self, dir: &Path) -> BuildResult<ObjectId> {
        let listing = self
            .source
            .list_entries(dir)
            .map_err(|e| BuildError::read_failed(dir, e))?;

        let mut entries = Vec::with_capacity(listing.len());
        for child in listing {
            if self.is_excluded(&child.name) {
                continue;
            }
            let path = dir.join(&child.name);
            validate_entry_name(&child.name)
                .map_err(|reason| BuildError::InvalidName { path: path.clone(), reason })?;

            let entry = match child.kind {
                EntryKind::File => {
                    let data = self
                        .source
                        .read_file(&path)
                        .map_err(|e| BuildError::read_failed(&path, e))?;
                    let id = self.store.write_object(&Object::Blob(Blob::new(data)))?;
                    TreeEntry::new(EntryMode::Regular, child.name, id)
                }
                EntryKind::Directory => {
                    let id = self.build_dir(&path)?;
                    TreeEntry::new(EntryMode::Directory, child.name, id)
                }
                EntryKind::Other => {
                    warn!(
                        path = %path.display(),
                        "skipping entry that is neither file nor directory"
                    );
                    continue;
                }
            };
            entries.push(entry);
        }

        let tree = Tree::new(entries);
        let count = tree.len();
        let id = self.store.write_object(&Object::Tree(tree))?;
        debug!(dir = %dir.display(), entries = count, tree = %id, "wrote tree");
        Ok(id)
    }
}
