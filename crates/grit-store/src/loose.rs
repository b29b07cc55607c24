use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use grit_types::{ObjectId, TypeError, HEX_LEN};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Shortest abbreviated id accepted by [`LooseObjectStore::resolve_prefix`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Filesystem object store using git's loose object layout.
///
/// Each object lives at `objects/<2 hex>/<38 hex>` as the zlib-compressed
/// canonical encoding. Writes go to a temp file in the shard directory and
/// are renamed into place, so a crash never leaves a partial object under
/// its final name.
#[derive(Debug, Clone)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compression: Compression,
}

impl LooseObjectStore {
    /// Create a store rooted at an `objects` directory.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects_dir: objects_dir.into(),
            compression: Compression::default(),
        }
    }

    /// Set the zlib compression level (0-9).
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// The root `objects` directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (shard, file) = id.shard();
        self.objects_dir.join(shard).join(file)
    }

    /// Resolve a full or abbreviated hex id to a stored object.
    pub fn resolve(&self, spec: &str) -> StoreResult<ObjectId> {
        if spec.len() == HEX_LEN {
            return Ok(ObjectId::from_hex(spec)?);
        }
        self.resolve_prefix(spec)
    }

    /// Resolve an abbreviated hex id by scanning its shard directory.
    ///
    /// Fails with `NoMatch` if nothing matches and `AmbiguousPrefix` if
    /// several objects do.
    pub fn resolve_prefix(&self, prefix: &str) -> StoreResult<ObjectId> {
        if prefix.len() < MIN_PREFIX_LEN
            || prefix.len() > HEX_LEN
            || !prefix.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(TypeError::InvalidHex(prefix.to_string()).into());
        }
        let prefix = prefix.to_ascii_lowercase();
        let (shard, rest) = prefix.split_at(2);
        let shard_dir = self.objects_dir.join(shard);

        let entries = match fs::read_dir(&shard_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NoMatch(prefix));
            }
            Err(e) => return Err(StoreError::io(&shard_dir, e)),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&shard_dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.len() == HEX_LEN - 2 && name.starts_with(rest) {
                matches.push(format!("{shard}{name}"));
            }
        }

        match matches.as_slice() {
            [] => Err(StoreError::NoMatch(prefix)),
            [only] => Ok(ObjectId::from_hex(only)?),
            _ => Err(StoreError::AmbiguousPrefix(prefix)),
        }
    }
}

impl ObjectStore for LooseObjectStore {
    fn put(&self, id: &ObjectId, canonical: &[u8]) -> StoreResult<()> {
        let path = self.object_path(id);
        if path.is_file() {
            debug!(id = %id, "object already present; skipping write");
            return Ok(());
        }

        let shard_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.objects_dir.clone());
        fs::create_dir_all(&shard_dir).map_err(|e| StoreError::io(&shard_dir, e))?;

        let mut tmp =
            NamedTempFile::new_in(&shard_dir).map_err(|e| StoreError::io(&shard_dir, e))?;
        compress_into(tmp.as_file_mut(), canonical, self.compression)
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        // Loose objects are read-only, as git writes them.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o444))
                .map_err(|e| StoreError::io(tmp.path(), e))?;
        }
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;

        debug!(id = %id, len = canonical.len(), "wrote loose object");
        Ok(())
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(*id)),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let mut canonical = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut canonical)
            .map_err(|e| StoreError::CorruptObject {
                id: *id,
                reason: format!("decompression failed: {e}"),
            })?;

        let actual = ObjectId::hash(&canonical);
        if actual != *id {
            return Err(StoreError::CorruptObject {
                id: *id,
                reason: format!("content hashes to {actual}"),
            });
        }
        Ok(canonical)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let path = self.object_path(id);
        path.try_exists()
            .map(|found| found && path.is_file())
            .map_err(|e| StoreError::io(&path, e))
    }
}

fn compress_into(file: &mut File, data: &[u8], level: Compression) -> io::Result<()> {
    let mut encoder = ZlibEncoder::new(&mut *file, level);
    encoder.write_all(data)?;
    encoder.finish()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Object};

    fn temp_store() -> (tempfile::TempDir, LooseObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path().join("objects"));
        (dir, store)
    }

    fn blob(content: &[u8]) -> Object {
        Object::Blob(Blob::new(content))
    }

    #[test]
    fn object_path_is_sharded() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_hex("ce013625030ba8dba906f756967f9e9ca394464a").unwrap();
        let path = store.object_path(&id);
        assert!(path.ends_with("objects/ce/013625030ba8dba906f756967f9e9ca394464a"));
    }

    #[test]
    fn write_read_roundtrip() {
        let (_dir, store) = temp_store();
        let obj = blob(b"hello\n");
        let id = store.write_object(&obj).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(store.object_path(&id).is_file());
        assert_eq!(store.get(&id).unwrap(), b"blob 6\0hello\n");
        assert_eq!(store.read_object(&id).unwrap(), obj);
    }

    #[test]
    fn file_contents_are_zlib_of_canonical_bytes() {
        let (_dir, store) = temp_store();
        let id = store.write_object(&blob(b"hello\n")).unwrap();
        let raw = fs::read(store.object_path(&id)).unwrap();
        let mut inflated = Vec::new();
        ZlibDecoder::new(raw.as_slice()).read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, b"blob 6\0hello\n");
    }

    #[test]
    fn put_twice_is_idempotent() {
        let (_dir, store) = temp_store();
        let canonical = blob(b"again").encode().unwrap();
        let id = ObjectId::hash(&canonical);
        store.put(&id, &canonical).unwrap();
        let first = fs::read(store.object_path(&id)).unwrap();
        store.put(&id, &canonical).unwrap();
        let second = fs::read(store.object_path(&id)).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(&id).unwrap(), canonical);

        let shard = store.object_path(&id).parent().unwrap().to_path_buf();
        assert_eq!(fs::read_dir(shard).unwrap().count(), 1, "no stray temp files");
    }

    #[test]
    fn missing_object_is_not_found() {
        let (_dir, store) = temp_store();
        let id = ObjectId::hash(b"nothing here");
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(_))));
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn tampered_object_is_corrupt() {
        let (_dir, store) = temp_store();
        let content: Vec<u8> = (0u8..=255).rev().collect();
        let id = store.write_object(&blob(&content)).unwrap();

        let path = store.object_path(&id);
        let mut raw = fs::read(&path).unwrap();
        let mid = raw.len() / 2;
        raw[mid] ^= 0x10;
        fs::remove_file(&path).unwrap();
        fs::write(&path, &raw).unwrap();

        let err = store.get(&id).unwrap_err();
        assert!(
            matches!(err, StoreError::CorruptObject { id: bad, .. } if bad == id),
            "got {err}"
        );
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let (_dir, store) = temp_store();
        let id = ObjectId::hash(b"whatever");
        let path = store.object_path(&id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"definitely not zlib").unwrap();
        assert!(store.get(&id).unwrap_err().is_corrupt());
    }

    #[test]
    fn valid_zlib_with_wrong_content_is_corrupt() {
        let (_dir, store) = temp_store();
        let real = blob(b"real").encode().unwrap();
        let id = ObjectId::hash(&real);
        let other = blob(b"fake").encode().unwrap();
        // Stash the wrong object's bytes under the real id.
        let path = store.object_path(&id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&other).unwrap();
        fs::write(&path, enc.finish().unwrap()).unwrap();

        assert!(store.get(&id).unwrap_err().is_corrupt());
    }

    #[cfg(unix)]
    #[test]
    fn objects_are_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        let id = store.write_object(&blob(b"frozen")).unwrap();
        let mode = fs::metadata(store.object_path(&id)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
        // a second write of the same object is still a no-op
        assert_eq!(store.write_object(&blob(b"frozen")).unwrap(), id);
    }

    #[test]
    fn compression_level_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let store = LooseObjectStore::new(dir.path()).with_compression_level(0);
        let content = vec![b'a'; 4096];
        let id = store.write_object(&blob(&content)).unwrap();
        let raw = fs::read(store.object_path(&id)).unwrap();
        assert!(raw.len() > content.len(), "level 0 stores uncompressed");
        assert_eq!(store.read_object(&id).unwrap(), blob(&content));
    }

    #[test]
    fn resolve_prefix_finds_unique_object() {
        let (_dir, store) = temp_store();
        let id = store.write_object(&blob(b"hello\n")).unwrap();
        assert_eq!(store.resolve_prefix("ce0136").unwrap(), id);
        assert_eq!(store.resolve_prefix("CE0136").unwrap(), id);
        assert_eq!(store.resolve(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn resolve_prefix_errors() {
        let (_dir, store) = temp_store();
        store.write_object(&blob(b"hello\n")).unwrap();
        assert!(matches!(store.resolve_prefix("ce0"), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.resolve_prefix("xyz1"), Err(StoreError::InvalidId(_))));
        assert!(matches!(store.resolve_prefix("ce99"), Err(StoreError::NoMatch(_))));
        assert!(matches!(store.resolve_prefix("0000"), Err(StoreError::NoMatch(_))));
    }

    #[test]
    fn resolve_prefix_ambiguous() {
        let (_dir, store) = temp_store();
        let shard = store.objects_dir().join("ab");
        fs::create_dir_all(&shard).unwrap();
        fs::write(shard.join(format!("cd{}", "0".repeat(36))), b"").unwrap();
        fs::write(shard.join(format!("cd{}", "1".repeat(36))), b"").unwrap();
        assert!(matches!(
            store.resolve_prefix("abcd"),
            Err(StoreError::AmbiguousPrefix(_))
        ));
    }
}
