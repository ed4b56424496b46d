//! # SledStore: Persistent Storage Engine
//!
//! On-disk backend built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree    | Key                           | Value                 |
//! |---------|-------------------------------|-----------------------|
//! | `state` | `len(ns) \|\| ns \|\| key`    | raw bytes (contract-defined) |
//!
//! Every namespace lives in the single `state` tree so that one sled `Batch`
//! covers an entire invocation. Cross-tree batches are not atomic in sled;
//! a single tree is.
//!
//! ## Atomicity
//!
//! `commit` turns the change set into one `Batch` and applies it, then
//! flushes. Either every write of the invocation lands on disk or none does.

use sled::{Batch, Db, Tree};
use std::path::Path;

use super::{ChangeSet, StorageResult, Store};

/// Name of the sled tree holding all contract and system state.
const STATE_TREE: &str = "state";

/// Persistent [`Store`] over sled.
///
/// Cheap to clone; clones share the same database handle.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    state: Tree,
}

impl SledStore {
    /// Open or create a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A database that lives in a temporary location and is removed on drop.
    pub fn open_temporary() -> StorageResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StorageResult<Self> {
        let state = db.open_tree(STATE_TREE)?;
        Ok(Self { db, state })
    }

    /// Number of physical keys across all namespaces.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl Store for SledStore {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.state.get(key)?.map(|v| v.to_vec()))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut out = Vec::new();
        for entry in self.state.scan_prefix(prefix) {
            let (key, value) = entry?;
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }

    fn commit(&self, changes: ChangeSet) -> StorageResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let writes = changes.len();
        let mut batch = Batch::default();
        for (key, value) in changes {
            match value {
                Some(v) => batch.insert(key, v),
                None => batch.remove(key),
            }
        }
        self.state.apply_batch(batch)?;
        self.db.flush()?;
        tracing::trace!(writes, "committed change set to sled");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::namespaced_key;

    fn changes(pairs: &[(&str, Option<&str>)]) -> ChangeSet {
        let mut set = ChangeSet::new();
        for (k, v) in pairs {
            match v {
                Some(v) => set.put(k.as_bytes().to_vec(), v.as_bytes().to_vec()),
                None => set.delete(k.as_bytes().to_vec()),
            }
        }
        set
    }

    #[test]
    fn open_temporary_database() {
        let store = SledStore::open_temporary().expect("should create temp db");
        assert!(store.is_empty());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SledStore::open(dir.path()).expect("should open db");
            store.commit(changes(&[("gold", Some("1000"))])).unwrap();
        }

        let reopened = SledStore::open(dir.path()).expect("should reopen db");
        assert_eq!(reopened.get(b"gold").unwrap(), Some(b"1000".to_vec()));
    }

    #[test]
    fn commit_applies_puts_and_deletes_together() {
        let store = SledStore::open_temporary().unwrap();
        store
            .commit(changes(&[("a", Some("1")), ("b", Some("2"))]))
            .unwrap();
        store
            .commit(changes(&[("a", None), ("c", Some("3"))]))
            .unwrap();

        assert_eq!(store.get(b"a").unwrap(), None);
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get(b"c").unwrap(), Some(b"3".to_vec()));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn empty_commit_is_a_no_op() {
        let store = SledStore::open_temporary().unwrap();
        store.commit(ChangeSet::new()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn scan_prefix_returns_namespace_in_order() {
        let store = SledStore::open_temporary().unwrap();
        let k1 = namespaced_key("goodBalance", b"gold-b").unwrap();
        let k2 = namespaced_key("goodBalance", b"gold-a").unwrap();
        let other = namespaced_key("account", b"gold-a").unwrap();
        let mut set = ChangeSet::new();
        set.put(k1, b"2".to_vec());
        set.put(k2, b"1".to_vec());
        set.put(other, b"x".to_vec());
        store.commit(set).unwrap();

        let scanned = store.scan_namespace("goodBalance").unwrap();
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].0, b"gold-a".to_vec());
        assert_eq!(scanned[1].0, b"gold-b".to_vec());
    }

    #[test]
    fn concurrent_reads_do_not_block() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(SledStore::open_temporary().unwrap());
        let mut set = ChangeSet::new();
        for i in 0..10u8 {
            set.put(vec![i], vec![i; 4]);
        }
        store.commit(set).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..10u8 {
                        assert_eq!(store.get(&[i]).unwrap(), Some(vec![i; 4]));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("reader thread should not panic");
        }
    }
}
