//! # Storage Module
//!
//! The host key-value engine the ledger persists into, and the per-invocation
//! overlay that makes every call all-or-nothing.
//!
//! ## Architecture
//!
//! ```text
//! overlay.rs: StorageContext: namespaced get/put/delete with a write buffer
//! memory.rs : MemoryStore: BTreeMap backend for tests and embedding
//! db.rs     : SledStore: on-disk backend, one tree, atomic batch commits
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! contract ──get/put/delete(ns, key)──▶ StorageContext ──commit(ChangeSet)──▶ Store
//!                                          (pending)                      (memory | sled)
//! ```
//!
//! ## Design Decisions
//!
//! 1. **Namespaces are key prefixes.** A physical key is
//!    `len(ns) || ns || key`. The length byte keeps `"ab" + "c"` and
//!    `"a" + "bc"` apart, so namespaces never alias.
//!
//! 2. **One atomic commit per invocation.** Backends only ever see a full
//!    [`ChangeSet`]; there is no partial write path.
//!
//! 3. **Deletes are real.** A `None` in the change set removes the key, so
//!    "absent" and "deleted" are indistinguishable afterwards.

pub mod db;
pub mod memory;
pub mod overlay;

use std::collections::BTreeMap;

pub use db::SledStore;
pub use memory::MemoryStore;
pub use overlay::StorageContext;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("namespace name too long: {0} bytes")]
    NamespaceTooLong(usize),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Physical key for `key` inside `namespace`.
pub fn namespaced_key(namespace: &str, key: &[u8]) -> StorageResult<Vec<u8>> {
    let ns = namespace.as_bytes();
    let len = u8::try_from(ns.len()).map_err(|_| StorageError::NamespaceTooLong(ns.len()))?;
    let mut out = Vec::with_capacity(1 + ns.len() + key.len());
    out.push(len);
    out.extend_from_slice(ns);
    out.extend_from_slice(key);
    Ok(out)
}

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// Buffered writes of one invocation. `None` marks a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.writes.insert(key, None);
    }

    /// `Some(None)` if the key is pending deletion, `None` if untouched.
    pub fn get(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.writes.get(key).map(|v| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Option<Vec<u8>>)> {
        self.writes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = (Vec<u8>, Option<Vec<u8>>);
    type IntoIter = std::collections::btree_map::IntoIter<Vec<u8>, Option<Vec<u8>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// A persistent key-value backend.
///
/// Implementations must apply a [`ChangeSet`] atomically: after `commit`
/// returns `Ok`, every write is visible; after it returns `Err`, none is.
pub trait Store: Send + Sync {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    fn commit(&self, changes: ChangeSet) -> StorageResult<()>;

    fn contains(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Entries of one namespace with the namespace prefix stripped.
    fn scan_namespace(&self, namespace: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = namespaced_key(namespace, &[])?;
        Ok(self
            .scan_prefix(&prefix)?
            .into_iter()
            .map(|(k, v)| (k[prefix.len()..].to_vec(), v))
            .collect())
    }
}
