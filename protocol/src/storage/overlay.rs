//! Per-invocation view of the store.
//!
//! Writes go into a [`ChangeSet`] and are visible to later reads of the same
//! invocation. The backend is untouched until the runtime commits the change
//! set; dropping the context discards every write.

use super::{namespaced_key, ChangeSet, StorageResult, Store};

pub struct StorageContext<'a> {
    store: &'a dyn Store,
    pending: ChangeSet,
}

impl<'a> StorageContext<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            pending: ChangeSet::new(),
        }
    }

    pub fn get(&self, namespace: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let physical = namespaced_key(namespace, key)?;
        match self.pending.get(&physical) {
            Some(pending) => Ok(pending.map(<[u8]>::to_vec)),
            None => self.store.get(&physical),
        }
    }

    pub fn contains(&self, namespace: &str, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(namespace, key)?.is_some())
    }

    pub fn put(&mut self, namespace: &str, key: &[u8], value: Vec<u8>) -> StorageResult<()> {
        self.pending.put(namespaced_key(namespace, key)?, value);
        Ok(())
    }

    pub fn delete(&mut self, namespace: &str, key: &[u8]) -> StorageResult<()> {
        self.pending.delete(namespaced_key(namespace, key)?);
        Ok(())
    }

    /// Number of keys touched so far.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    pub fn into_changes(self) -> ChangeSet {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn reads_see_own_pending_writes() {
        let store = MemoryStore::new();
        let mut ctx = StorageContext::new(&store);

        assert_eq!(ctx.get("ns", b"k").unwrap(), None);
        ctx.put("ns", b"k", b"v".to_vec()).unwrap();
        assert_eq!(ctx.get("ns", b"k").unwrap(), Some(b"v".to_vec()));

        // Nothing reached the backend yet.
        assert!(store.is_empty());
    }

    #[test]
    fn pending_delete_hides_committed_value() {
        let store = MemoryStore::new();
        let mut seed = StorageContext::new(&store);
        seed.put("ns", b"k", b"v".to_vec()).unwrap();
        store.commit(seed.into_changes()).unwrap();

        let mut ctx = StorageContext::new(&store);
        assert!(ctx.contains("ns", b"k").unwrap());
        ctx.delete("ns", b"k").unwrap();
        assert!(!ctx.contains("ns", b"k").unwrap());
        assert!(store.get(&namespaced_key("ns", b"k").unwrap()).unwrap().is_some());

        store.commit(ctx.into_changes()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn dropped_context_discards_writes() {
        let store = MemoryStore::new();
        {
            let mut ctx = StorageContext::new(&store);
            ctx.put("ns", b"k", b"v".to_vec()).unwrap();
            assert_eq!(ctx.pending_writes(), 1);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn same_key_in_different_namespaces_is_independent() {
        let store = MemoryStore::new();
        let mut ctx = StorageContext::new(&store);
        ctx.put("goodToken", b"gold", b"record".to_vec()).unwrap();
        assert_eq!(ctx.get("account", b"gold").unwrap(), None);
    }
}
