//! Errors that abort a goods invocation.
//!
//! Anything returned as `Err` here rolls back every write of the call.
//! Refusals the caller is expected to handle are `Ok(false)` instead and
//! never appear in this enum.

use goods_protocol::account::Address;
use goods_protocol::params::ArgumentError;
use goods_protocol::runtime::HostError;
use num_bigint::BigInt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoodsError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("{field} must be a 20-byte address, got {actual} bytes")]
    InvalidAddress { field: &'static str, actual: usize },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: BigInt },

    #[error("good `{0}` already exists")]
    AlreadyExists(String),

    #[error("good `{0}` does not exist")]
    UnknownGood(String),

    #[error("minting the supply of `{0}` failed")]
    MintFailed(String),

    #[error("corrupt record: {0}")]
    Codec(String),
}

pub type GoodsResult<T> = Result<T, GoodsError>;

/// Validate a caller-supplied account identifier.
pub(crate) fn parse_address(field: &'static str, bytes: &[u8]) -> GoodsResult<Address> {
    Address::from_slice(bytes).map_err(|_| GoodsError::InvalidAddress {
        field,
        actual: bytes.len(),
    })
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> GoodsResult<()> {
    if value.is_empty() {
        return Err(GoodsError::Empty(field));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: &BigInt) -> GoodsResult<()> {
    if !goods_protocol::params::is_positive(value) {
        return Err(GoodsError::NotPositive {
            field,
            value: value.clone(),
        });
    }
    Ok(())
}
