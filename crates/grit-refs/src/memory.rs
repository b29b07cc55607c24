//! In-memory reference store for testing and ephemeral use.

use std::collections::HashMap;
use std::sync::RwLock;

use grit_types::ObjectId;

use crate::error::Result;
use crate::names::{validate_branch_name, validate_ref_name};
use crate::traits::RefStore;
use crate::types::Head;

/// An in-memory implementation of [`RefStore`].
///
/// All data lives in a `HashMap` behind a `RwLock`. Data is lost when the
/// store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<HashMap<String, ObjectId>>,
    head: RwLock<Option<Head>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose HEAD already names `branch`.
    pub fn with_branch(branch: &str) -> Result<Self> {
        let store = Self::new();
        store.set_head(branch)?;
        Ok(store)
    }

    /// All refs, sorted by name.
    pub fn list(&self) -> Vec<(String, ObjectId)> {
        let refs = self.refs.read().expect("lock poisoned");
        let mut all: Vec<_> = refs.iter().map(|(k, v)| (k.clone(), *v)).collect();
        all.sort();
        all
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        let refs = self.refs.read().expect("lock poisoned");
        Ok(refs.get(name).copied())
    }

    fn write_ref(&self, name: &str, target: &ObjectId) -> Result<()> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().expect("lock poisoned");
        refs.insert(name.to_string(), *target);
        Ok(())
    }

    fn head(&self) -> Result<Option<Head>> {
        Ok(self.head.read().expect("lock poisoned").clone())
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;
        *self.head.write().expect("lock poisoned") = Some(Head::Symbolic(branch.to_string()));
        Ok(())
    }

    fn set_head_detached(&self, target: &ObjectId) -> Result<()> {
        *self.head.write().expect("lock poisoned") = Some(Head::Detached(*target));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefError;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_raw([n; 20])
    }

    #[test]
    fn empty_store_has_no_head() {
        let store = InMemoryRefStore::new();
        assert_eq!(store.head().unwrap(), None);
        assert_eq!(store.resolve_head().unwrap(), None);
    }

    #[test]
    fn write_and_read_ref() {
        let store = InMemoryRefStore::new();
        store.write_ref("refs/heads/main", &id(1)).unwrap();
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(id(1)));
        assert_eq!(store.read_ref("refs/heads/other").unwrap(), None);
    }

    #[test]
    fn write_ref_rejects_bad_name() {
        let store = InMemoryRefStore::new();
        let err = store.write_ref("heads/main", &id(1)).unwrap_err();
        assert!(matches!(err, RefError::InvalidName { .. }));
    }

    #[test]
    fn unborn_branch_resolves_to_none() {
        let store = InMemoryRefStore::with_branch("main").unwrap();
        assert_eq!(store.head().unwrap(), Some(Head::Symbolic("main".into())));
        assert_eq!(store.resolve_head().unwrap(), None);
    }

    #[test]
    fn update_head_advances_branch() {
        let store = InMemoryRefStore::with_branch("main").unwrap();
        store.update_head(&id(1)).unwrap();
        store.update_head(&id(2)).unwrap();
        assert_eq!(store.read_ref("refs/heads/main").unwrap(), Some(id(2)));
        assert_eq!(store.resolve_head().unwrap(), Some(id(2)));
        // HEAD stays symbolic
        assert_eq!(store.head().unwrap().unwrap().branch(), Some("main"));
    }

    #[test]
    fn update_head_when_detached_moves_head() {
        let store = InMemoryRefStore::new();
        store.set_head_detached(&id(1)).unwrap();
        store.update_head(&id(3)).unwrap();
        assert_eq!(store.head().unwrap(), Some(Head::Detached(id(3))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn set_head_rejects_bad_branch() {
        let store = InMemoryRefStore::new();
        assert!(store.set_head("bad..name").is_err());
    }
}
