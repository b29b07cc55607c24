use grit_types::ObjectId;

use crate::codec;
use crate::error::StoreResult;
use crate::object::Object;

/// Content-addressed object store.
///
/// The store holds canonical bytes keyed by their SHA-1. All implementations
/// must satisfy these invariants:
/// - Objects are immutable once written. The same id always maps to the same
///   bytes, so a repeated `put` is a no-op.
/// - `get` returns exactly the bytes given to `put`, or an error. It never
///   returns content that does not hash to the requested id.
/// - The store never interprets object contents; decoding is the codec's job.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Persist canonical bytes under `id`.
    ///
    /// The caller is responsible for `id` being the hash of `canonical`.
    fn put(&self, id: &ObjectId, canonical: &[u8]) -> StoreResult<()>;

    /// Read the canonical bytes stored under `id`.
    ///
    /// Returns `StoreError::NotFound` if the object does not exist.
    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Encode, hash, and store an object, returning its id.
    ///
    /// Skips the write if the object is already present.
    fn write_object(&self, object: &Object) -> StoreResult<ObjectId> {
        let canonical = codec::encode(object)?;
        let id = ObjectId::hash(&canonical);
        if !self.exists(&id)? {
            self.put(&id, &canonical)?;
        }
        Ok(id)
    }

    /// Read and decode an object.
    fn read_object(&self, id: &ObjectId) -> StoreResult<Object> {
        let canonical = self.get(id)?;
        codec::decode(&canonical).map_err(|e| e.for_object(id))
    }
}
