//! Directory sources the [`TreeBuilder`](crate::TreeBuilder) walks.
//!
//! A [`DirSource`] is the only way the builder touches a directory
//! hierarchy, so snapshots can be taken from the filesystem
//! ([`DiskSource`]) or from an in-memory fixture ([`MemorySource`]).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// What kind of node a directory entry is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, devices. Not representable in a tree.
    Other,
}

/// One child of a listed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl SourceEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Read access to a directory hierarchy.
pub trait DirSource {
    /// List the direct children of `dir`, in whatever order the source
    /// enumerates them.
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;

    /// Read the full contents of a regular file.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Whether `path` names a directory.
    fn is_directory(&self, path: &Path) -> io::Result<bool>;
}

// ---------------------------------------------------------------------------
// DiskSource
// ---------------------------------------------------------------------------

/// A [`DirSource`] over the local filesystem.
///
/// Symlinks are reported as [`EntryKind::Other`] and never followed.
/// Entries whose names are not valid UTF-8 cannot be stored in a tree and
/// are left out of the listing with a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskSource;

impl DirSource for DiskSource {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir = %dir.display(), name = ?raw, "skipping entry with non-UTF-8 name");
                    continue;
                }
            };
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(SourceEntry { name, kind });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn is_directory(&self, path: &Path) -> io::Result<bool> {
        Ok(fs::metadata(path)?.is_dir())
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Node {
    Dir(Vec<String>),
    File(Vec<u8>),
    Unreadable,
    Other,
}

/// An in-memory [`DirSource`] fixture.
///
/// Directories list their children in insertion order. Parent directories
/// are created implicitly.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    nodes: HashMap<PathBuf, Node>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an (initially empty) directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        if !matches!(self.nodes.get(path), Some(Node::Dir(_))) {
            self.insert(path, Node::Dir(Vec::new()));
        }
        self
    }

    /// Add a regular file, replacing any previous node at `path`.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> &mut Self {
        self.insert(path.as_ref(), Node::File(contents.into()));
        self
    }

    /// Add a node that is neither a file nor a directory (e.g. a symlink).
    pub fn add_special(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), Node::Other);
        self
    }

    /// Add a file whose reads fail with `PermissionDenied`.
    pub fn add_unreadable(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), Node::Unreadable);
        self
    }

    fn insert(&mut self, path: &Path, node: Node) {
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if !parent.as_os_str().is_empty() {
                self.add_dir(parent);
                let name = name.to_string_lossy().into_owned();
                if let Some(Node::Dir(children)) = self.nodes.get_mut(parent) {
                    if !children.contains(&name) {
                        children.push(name);
                    }
                }
            }
        }
        self.nodes.insert(path.to_path_buf(), node);
    }

    fn node(&self, path: &Path) -> io::Result<&Node> {
        self.nodes.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such entry: {}", path.display()),
            )
        })
    }
}

impl DirSource for MemorySource {
    fn list_entries(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        let Node::Dir(children) = self.node(dir)? else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", dir.display()),
            ));
        };
        children
            .iter()
            .map(|name| {
                let kind = match self.node(&dir.join(name))? {
                    Node::Dir(_) => EntryKind::Directory,
                    Node::File(_) | Node::Unreadable => EntryKind::File,
                    Node::Other => EntryKind::Other,
                };
                Ok(SourceEntry::new(name.clone(), kind))
            })
            .collect()
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.node(path)? {
            Node::File(data) => Ok(data.clone()),
            Node::Unreadable => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            )),
            Node::Dir(_) | Node::Other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )),
        }
    }

    fn is_directory(&self, path: &Path) -> io::Result<bool> {
        Ok(matches!(self.node(path)?, Node::Dir(_)))
    }
}
