//! Named account bindings: string key to 20-byte address.
//!
//! One namespace holds both the admin slot and any other caller-chosen
//! names. Bindings are overwritten, never deleted. Access rules live in
//! [`access`](super::access); this module only reads and writes.

use goods_protocol::account::Address;
use goods_protocol::runtime::Invocation;

use super::error::{GoodsError, GoodsResult};

pub const ACCOUNT_NAMESPACE: &str = "account";

pub fn get(inv: &Invocation<'_>, key: &str) -> GoodsResult<Option<Address>> {
    match inv.get(ACCOUNT_NAMESPACE, key.as_bytes())? {
        Some(bytes) => Address::from_slice(&bytes)
            .map(Some)
            .map_err(|e| GoodsError::Codec(format!("account binding `{key}`: {e}"))),
        None => Ok(None),
    }
}

pub fn put(inv: &mut Invocation<'_>, key: &str, address: &Address) -> GoodsResult<()> {
    inv.put(ACCOUNT_NAMESPACE, key.as_bytes(), address.to_vec())?;
    Ok(())
}
