//! Canonical encoding of objects.
//!
//! Every object is framed as `"<type> <len>\0<payload>"`; the SHA-1 of the
//! framed bytes is the object's id. Payloads:
//!
//! ```text
//! blob    raw content
//! tree    ("<mode> <name>\0" <20 raw id bytes>)*
//! commit  tree <hex>\n
//!         [parent <hex>\n]
//!         author <signature>\n
//!         committer <signature>\n
//!         \n
//!         <message>
//! ```
//!
//! This module does no I/O.

use std::collections::HashSet;

use grit_types::{ObjectId, Signature, ID_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, EntryMode, Object, ObjectKind, Tree, TreeEntry};

/// Encode an object to its canonical bytes, header included.
pub fn encode(object: &Object) -> StoreResult<Vec<u8>> {
    let payload = encode_payload(object)?;
    Ok(frame(object.kind(), &payload))
}

/// Prefix a payload with its `"<type> <len>\0"` header.
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, payload.len());
    let mut out = Vec::with_capacity(header.len() + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// The SHA-1 of an object's canonical encoding.
pub fn digest_of(object: &Object) -> StoreResult<ObjectId> {
    Ok(ObjectId::hash(&encode(object)?))
}

/// Encode only the payload part of an object.
pub fn encode_payload(object: &Object) -> StoreResult<Vec<u8>> {
    match object {
        Object::Blob(blob) => Ok(blob.data.clone()),
        Object::Tree(tree) => encode_tree(tree),
        Object::Commit(commit) => encode_commit(commit),
    }
}

/// Check that a name is usable as a single tree entry.
pub fn validate_entry_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("tree entry name must not be empty".into());
    }
    if name.contains('/') {
        return Err(format!("tree entry name contains a path separator: {name:?}"));
    }
    if name.contains('\0') {
        return Err(format!("tree entry name contains a NUL byte: {name:?}"));
    }
    Ok(())
}

fn encode_tree(tree: &Tree) -> StoreResult<Vec<u8>> {
    let mut seen = HashSet::with_capacity(tree.entries.len());
    let mut out = Vec::new();
    for entry in &tree.entries {
        validate_entry_name(&entry.name).map_err(StoreError::Encoding)?;
        if !seen.insert(entry.name.as_str()) {
            return Err(StoreError::Encoding(format!(
                "duplicate tree entry name: {:?}",
                entry.name
            )));
        }
        out.extend_from_slice(entry.mode.code().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.object_id.as_bytes());
    }
    Ok(out)
}

fn encode_commit(commit: &Commit) -> StoreResult<Vec<u8>> {
    if commit.tree.is_null() {
        return Err(StoreError::Encoding("commit is missing its tree".into()));
    }
    if commit.parent.is_some_and(|p| p.is_null()) {
        return Err(StoreError::Encoding("commit parent must not be null".into()));
    }
    for sig in [&commit.author, &commit.committer] {
        sig.validate()
            .map_err(|e| StoreError::Encoding(e.to_string()))?;
    }

    let mut text = format!("tree {}\n", commit.tree);
    if let Some(parent) = &commit.parent {
        text.push_str(&format!("parent {parent}\n"));
    }
    text.push_str(&format!("author {}\n", commit.author));
    text.push_str(&format!("committer {}\n", commit.committer));
    text.push('\n');
    text.push_str(&commit.message);
    Ok(text.into_bytes())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn corrupt(reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt(reason.into())
}

/// Validate the header of canonical bytes and return the kind and payload.
///
/// The payload itself is not parsed.
pub fn split_header(bytes: &[u8]) -> StoreResult<(ObjectKind, &[u8])> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| corrupt("missing header terminator"))?;
    let (header, payload) = (&bytes[..nul], &bytes[nul + 1..]);

    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| corrupt("malformed header"))?;
    let (tag, len) = (&header[..space], &header[space + 1..]);

    let kind = ObjectKind::from_tag(tag).ok_or_else(|| {
        corrupt(format!(
            "unknown object type {:?}",
            String::from_utf8_lossy(tag)
        ))
    })?;

    if len.is_empty() || !len.iter().all(u8::is_ascii_digit) {
        return Err(corrupt("malformed length in header"));
    }
    let declared: usize = std::str::from_utf8(len)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| corrupt("length in header out of range"))?;

    if declared != payload.len() {
        return Err(corrupt(format!(
            "length mismatch: header declares {declared}, payload has {}",
            payload.len()
        )));
    }
    Ok((kind, payload))
}

/// Decode canonical bytes into an object.
pub fn decode(bytes: &[u8]) -> StoreResult<Object> {
    let (kind, payload) = split_header(bytes)?;
    decode_payload(kind, payload)
}

/// Decode a payload of a known kind.
pub fn decode_payload(kind: ObjectKind, payload: &[u8]) -> StoreResult<Object> {
    match kind {
        ObjectKind::Blob => Ok(Object::Blob(Blob::new(payload))),
        ObjectKind::Tree => decode_tree(payload).map(Object::Tree),
        ObjectKind::Commit => decode_commit(payload).map(Object::Commit),
    }
}

fn decode_tree(payload: &[u8]) -> StoreResult<Tree> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut rest = payload;

    while !rest.is_empty() {
        let space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| corrupt("tree entry missing mode terminator"))?;
        let mode = EntryMode::from_code(&rest[..space]).ok_or_else(|| {
            corrupt(format!(
                "unsupported tree entry mode {:?}",
                String::from_utf8_lossy(&rest[..space])
            ))
        })?;
        rest = &rest[space + 1..];

        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt("tree entry missing name terminator"))?;
        let name = std::str::from_utf8(&rest[..nul])
            .map_err(|_| corrupt("tree entry name is not valid UTF-8"))?;
        validate_entry_name(name).map_err(corrupt)?;
        if !seen.insert(name) {
            return Err(corrupt(format!("duplicate tree entry name: {name:?}")));
        }
        rest = &rest[nul + 1..];

        if rest.len() < ID_LEN {
            return Err(corrupt(format!(
                "tree entry {name:?} truncated: {} of {ID_LEN} id bytes",
                rest.len()
            )));
        }
        let (raw, tail) = rest.split_at(ID_LEN);
        let object_id = ObjectId::from_slice(raw).map_err(|e| corrupt(e.to_string()))?;
        entries.push(TreeEntry::new(mode, name, object_id));
        rest = tail;
    }

    Ok(Tree { entries })
}

fn decode_commit(payload: &[u8]) -> StoreResult<Commit> {
    let text =
        std::str::from_utf8(payload).map_err(|_| corrupt("commit is not valid UTF-8"))?;
    let (headers, message) = text
        .split_once("\n\n")
        .ok_or_else(|| corrupt("commit is missing the blank line before its message"))?;

    let mut tree = None;
    let mut parent = None;
    let mut author = None;
    let mut committer = None;

    for line in headers.split('\n') {
        let (key, value) = line
            .split_once(' ')
            .ok_or_else(|| corrupt(format!("malformed commit header line {line:?}")))?;
        let slot_taken = match key {
            "tree" => tree.replace(parse_id(value)?).is_some(),
            "parent" => parent.replace(parse_id(value)?).is_some(),
            "author" => author.replace(parse_signature(value)?).is_some(),
            "committer" => committer.replace(parse_signature(value)?).is_some(),
            other => return Err(corrupt(format!("unknown commit header {other:?}"))),
        };
        if slot_taken {
            return Err(corrupt(format!("duplicate commit header {key:?}")));
        }
    }

    Ok(Commit {
        tree: tree.ok_or_else(|| corrupt("commit is missing its tree"))?,
        parent,
        author: author.ok_or_else(|| corrupt("commit is missing its author"))?,
        committer: committer.ok_or_else(|| corrupt("commit is missing its committer"))?,
        message: message.to_string(),
    })
}

fn parse_id(value: &str) -> StoreResult<ObjectId> {
    ObjectId::from_hex(value).map_err(|e| corrupt(format!("bad object id {value:?}: {e}")))
}

fn parse_signature(value: &str) -> StoreResult<Signature> {
    value.parse().map_err(|e: grit_types::TypeError| corrupt(e.to_string()))
}
