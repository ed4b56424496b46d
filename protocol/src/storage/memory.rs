//! In-memory [`Store`] backed by a `BTreeMap`.
//!
//! Same commit semantics as the sled backend, without a filesystem. Used by
//! every unit test and by hosts that embed the ledger without persistence.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{ChangeSet, StorageResult, Store};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical keys across all namespaces.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn commit(&self, changes: ChangeSet) -> StorageResult<()> {
        // Single write lock for the whole set: readers see all or nothing.
        let mut entries = self.entries.write();
        for (key, value) in changes {
            match value {
                Some(v) => {
                    entries.insert(key, v);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::namespaced_key;

    #[test]
    fn commit_applies_puts_and_deletes() {
        let store = MemoryStore::new();

        let mut changes = ChangeSet::new();
        changes.put(b"a".to_vec(), b"1".to_vec());
        changes.put(b"b".to_vec(), b"2".to_vec());
        store.commit(changes).unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.len(), 2);

        let mut changes = ChangeSet::new();
        changes.delete(b"a".to_vec());
        store.commit(changes).unwrap();
        assert_eq!(store.get(b"a").unwrap(), None);
        assert!(!store.contains(b"a").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn scan_namespace_strips_prefix_and_stays_in_namespace() {
        let store = MemoryStore::new();
        let mut changes = ChangeSet::new();
        changes.put(namespaced_key("goodBalance", b"x1").unwrap(), b"1".to_vec());
        changes.put(namespaced_key("goodBalance", b"x2").unwrap(), b"2".to_vec());
        changes.put(namespaced_key("goodToken", b"x3").unwrap(), b"3".to_vec());
        store.commit(changes).unwrap();

        let scanned = store.scan_namespace("goodBalance").unwrap();
        assert_eq!(
            scanned,
            vec![
                (b"x1".to_vec(), b"1".to_vec()),
                (b"x2".to_vec(), b"2".to_vec())
            ]
        );
    }
}
