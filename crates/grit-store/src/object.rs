use std::cmp::Ordering;

use grit_types::{ObjectId, Signature};

use crate::codec;
use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot checkpoint: root tree, optional parent, identities, message.
    Commit,
}

impl ObjectKind {
    /// The type tag written in the canonical header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a header type tag.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(Self::Blob),
            b"tree" => Some(Self::Tree),
            b"commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry. Only regular files and directories are
/// modeled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Directory => 0o040000,
        }
    }

    /// The textual code written into tree payloads. Directories carry no
    /// leading zero.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Directory => "40000",
        }
    }

    /// Parse a textual mode code as found in a tree payload.
    ///
    /// Accepts `40000` and the zero-padded `040000` for directories.
    pub fn from_code(code: &[u8]) -> Option<Self> {
        match code {
            b"100644" => Some(Self::Regular),
            b"40000" | b"040000" => Some(Self::Directory),
            _ => None,
        }
    }

    /// The kind of object an entry with this mode references.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Regular => ObjectKind::Blob,
            Self::Directory => ObjectKind::Tree,
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode (regular or directory).
    pub mode: EntryMode,
    /// Entry name (a single path segment).
    pub name: String,
    /// Content-addressed ID of the referenced object.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// Bytes compared when ordering entries: the name, plus a trailing `/`
    /// for directories.
    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let suffix = match self.mode {
            EntryMode::Directory => Some(b'/'),
            EntryMode::Regular => None,
        };
        self.name.bytes().chain(suffix)
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical tree order: byte-wise by name, directories compared as if
/// their name ended in `/`.
impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(other.sort_key())
            .then_with(|| self.object_id.cmp(&other.object_id))
    }
}

/// Directory listing object.
///
/// The encoding follows `entries` in iteration order, so two trees holding
/// the same entries in different orders hash differently. [`Tree::new`]
/// normalizes to canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries, sorted into canonical
    /// order.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns `true` if the entries are in canonical order.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0] <= w[1])
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Historical checkpoint referencing a root tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: ObjectId,
    /// Previous commit, absent for a root commit.
    pub parent: Option<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    /// Free-form message, stored verbatim.
    pub message: String,
}

impl Commit {
    /// Returns `true` if this commit has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Any object that can live in the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Canonical encoding, header included.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        codec::encode(self)
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> StoreResult<ObjectId> {
        codec::digest_of(self)
    }

    /// Decode canonical bytes.
    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        codec::decode(bytes)
    }

    pub fn into_blob(self) -> StoreResult<Blob> {
        match self {
            Self::Blob(blob) => Ok(blob),
            other => Err(kind_mismatch(ObjectKind::Blob, other.kind())),
        }
    }

    pub fn into_tree(self) -> StoreResult<Tree> {
        match self {
            Self::Tree(tree) => Ok(tree),
            other => Err(kind_mismatch(ObjectKind::Tree, other.kind())),
        }
    }

    pub fn into_commit(self) -> StoreResult<Commit> {
        match self {
            Self::Commit(commit) => Ok(commit),
            other => Err(kind_mismatch(ObjectKind::Commit, other.kind())),
        }
    }
}

fn kind_mismatch(expected: ObjectKind, actual: ObjectKind) -> StoreError {
    StoreError::KindMismatch { expected, actual }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for Object {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}
