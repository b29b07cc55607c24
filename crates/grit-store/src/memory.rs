use std::collections::HashMap;
use std::sync::RwLock;

use grit_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Canonical bytes are held uncompressed
/// behind a `RwLock`.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, id: &ObjectId, canonical: &[u8]) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(*id).or_insert_with(|| canonical.to_vec());
        Ok(())
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::object::*;

    fn make_blob(content: &[u8]) -> Object {
        Object::Blob(Blob::new(content))
    }

    #[test]
    fn write_and_read_object() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello");
        let id = store.write_object(&obj).unwrap();
        assert_eq!(store.read_object(&id).unwrap(), obj);
        assert!(store.exists(&id).unwrap());
    }

    #[test]
    fn get_returns_canonical_bytes() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello\n");
        let id = store.write_object(&obj).unwrap();
        assert_eq!(store.get(&id).unwrap(), b"blob 6\0hello\n");
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::hash(b"missing");
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(m)) if m == id));
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn idempotent_write() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"same");
        let id1 = store.write_object(&obj).unwrap();
        let id2 = store.write_object(&obj).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_twice_keeps_one_copy() {
        let store = InMemoryObjectStore::new();
        let bytes = codec::encode(&make_blob(b"twice")).unwrap();
        let id = ObjectId::hash(&bytes);
        store.put(&id, &bytes).unwrap();
        store.put(&id, &bytes).unwrap();
        assert_eq!(store.all_ids(), vec![id]);
        assert_eq!(store.get(&id).unwrap(), bytes);
    }

    #[test]
    fn read_object_reports_corrupt_with_id() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::hash(b"bogus");
        store.put(&id, b"blob 9\0short").unwrap();
        let err = store.read_object(&id).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { id: bad, .. } if bad == id));
    }

    #[test]
    fn debug_shows_count() {
        let store = InMemoryObjectStore::new();
        store.write_object(&make_blob(b"a")).unwrap();
        assert!(format!("{store:?}").contains("object_count: 1"));
        assert!(!store.is_empty());
    }
}
