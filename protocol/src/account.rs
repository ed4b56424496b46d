//! # Account Identifiers
//!
//! An [`Address`] is the 20-byte script hash of a verification script. It is
//! the only identity the ledger understands: balances, the admin slot and
//! named bindings all key on it.
//!
//! The type can only be built through validating constructors, so any code
//! holding an `Address` knows the length invariant already holds. Raw byte
//! slices coming from callers go through [`Address::from_slice`].
//!
//! ## Text form
//!
//! Addresses print as base58check over `ADDRESS_VERSION || script_hash`.
//! Parsing also accepts 40 hex characters, which is what most tooling dumps.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, ADDRESS_VERSION};

/// Errors from parsing or validating an account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("account identifier must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid hex account identifier")]
    InvalidHex,

    #[error("invalid base58check account identifier")]
    InvalidBase58,

    #[error("unknown address version byte 0x{0:02x}")]
    UnknownVersion(u8),
}

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wrap an already-sized script hash.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Validate an untrusted byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LENGTH] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength {
                expected: ADDRESS_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s).map_err(|_| AddressError::InvalidHex)?;
        Self::from_slice(&bytes)
    }

    /// Decode the base58check text form and strip the version byte.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let payload = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|_| AddressError::InvalidBase58)?;
        match payload.split_first() {
            Some((&ADDRESS_VERSION, hash)) => Self::from_slice(hash),
            Some((&other, _)) => Err(AddressError::UnknownVersion(other)),
            None => Err(AddressError::InvalidBase58),
        }
    }

    pub fn to_base58(&self) -> String {
        let mut payload = Vec::with_capacity(ADDRESS_LENGTH + 1);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.0);
        bs58::encode(payload).with_check().into_string()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts base58check or 40 hex characters (optionally `0x`-prefixed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex_body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_body.len() == ADDRESS_LENGTH * 2 && hex_body.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Self::from_hex(hex_body);
        }
        Self::from_base58(trimmed)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
        }
    }
}
