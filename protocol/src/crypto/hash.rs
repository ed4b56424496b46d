//! # Hashing Utilities
//!
//! BLAKE3 is the only hash in the ledger. Script hashes (and therefore
//! account addresses and contract identities) are the first
//! [`SCRIPT_HASH_LENGTH`] bytes of a BLAKE3 digest.

use crate::account::Address;
use crate::config::SCRIPT_HASH_LENGTH;

/// Full 32-byte BLAKE3 digest.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// BLAKE3 over several byte slices, without concatenating them first.
pub fn blake3_hash_many(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Script hash of arbitrary script or contract code bytes.
pub fn script_hash(script: &[u8]) -> Address {
    let digest = blake3_hash(script);
    let mut out = [0u8; SCRIPT_HASH_LENGTH];
    out.copy_from_slice(&digest[..SCRIPT_HASH_LENGTH]);
    Address::new(out)
}
