//! # Verification Scripts & Witnesses
//!
//! An account is the script hash of a [`VerificationScript`]: either a single
//! public key, or an `m`-of-`n` set of keys. A [`Witness`] pairs a script with
//! signatures over the invocation's signing message; when it verifies, the
//! caller is treated as authorized for that script's address.
//!
//! ## Canonical script bytes
//!
//! ```text
//! single:   0x01 || pubkey (32)
//! multisig: 0x02 || m (1) || n (1) || pubkey_1 .. pubkey_n (sorted, unique)
//! ```
//!
//! Keys in a multisig are sorted and de-duplicated at construction, so the
//! same committee always hashes to the same address regardless of the order
//! its members were listed in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hash::script_hash;
use super::keys::{PublicKey, Signature, PUBLIC_KEY_LENGTH};
use crate::account::Address;

const SINGLE_TAG: u8 = 0x01;
const MULTISIG_TAG: u8 = 0x02;

/// Upper bound on multisig participants, so `n` fits the one-byte field.
pub const MAX_MULTISIG_KEYS: usize = u8::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WitnessError {
    #[error("multisig threshold {threshold} is not within 1..={keys}")]
    InvalidThreshold { threshold: usize, keys: usize },

    #[error("multisig supports at most 255 keys, got {0}")]
    TooManyKeys(usize),
}

/// The rule an account's signatures must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationScript {
    Single(PublicKey),
    Multisig { threshold: u8, keys: Vec<PublicKey> },
}

impl VerificationScript {
    pub fn single(key: PublicKey) -> Self {
        Self::Single(key)
    }

    /// Build an `m`-of-`n` script. Duplicate keys count once.
    pub fn multisig(threshold: usize, mut keys: Vec<PublicKey>) -> Result<Self, WitnessError> {
        keys.sort();
        keys.dedup();
        if keys.len() > MAX_MULTISIG_KEYS {
            return Err(WitnessError::TooManyKeys(keys.len()));
        }
        if threshold == 0 || threshold > keys.len() {
            return Err(WitnessError::InvalidThreshold {
                threshold,
                keys: keys.len(),
            });
        }
        Ok(Self::Multisig {
            threshold: threshold as u8,
            keys,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Single(key) => {
                let mut out = Vec::with_capacity(1 + PUBLIC_KEY_LENGTH);
                out.push(SINGLE_TAG);
                out.extend_from_slice(key.as_bytes());
                out
            }
            Self::Multisig { threshold, keys } => {
                let mut out = Vec::with_capacity(3 + keys.len() * PUBLIC_KEY_LENGTH);
                out.push(MULTISIG_TAG);
                out.push(*threshold);
                out.push(keys.len() as u8);
                for key in keys {
                    out.extend_from_slice(key.as_bytes());
                }
                out
            }
        }
    }

    /// The account address this script controls.
    pub fn script_hash(&self) -> Address {
        script_hash(&self.to_bytes())
    }
}

/// Signatures offered for one verification script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub script: VerificationScript,
    pub signatures: Vec<Signature>,
}

impl Witness {
    pub fn new(script: VerificationScript, signatures: Vec<Signature>) -> Self {
        Self { script, signatures }
    }

    pub fn address(&self) -> Address {
        self.script.script_hash()
    }

    /// Check the signatures against `message`.
    ///
    /// A multisig witness needs valid signatures from at least `threshold`
    /// distinct keys; a key that signed twice still counts once.
    pub fn verify(&self, message: &[u8]) -> bool {
        match &self.script {
            VerificationScript::Single(key) => {
                self.signatures.iter().any(|sig| key.verify(message, sig))
            }
            VerificationScript::Multisig { threshold, keys } => {
                let mut used = vec![false; keys.len()];
                let mut satisfied = 0usize;
                for sig in &self.signatures {
                    let hit = keys
                        .iter()
                        .enumerate()
                        .find(|(i, key)| !used[*i] && key.verify(message, sig));
                    if let Some((i, _)) = hit {
                        used[i] = true;
                        satisfied += 1;
                        if satisfied >= *threshold as usize {
                            return true;
                        }
                    }
                }
                false
            }
        }
    }
}
