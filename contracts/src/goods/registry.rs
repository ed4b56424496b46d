//! # Asset Registry
//!
//! Creation and description of goods. A good is created exactly once by
//! [`initialize`], which mints the entire supply to its owner in the same
//! invocation; its record is never modified or deleted afterwards.
//!
//! The per-field accessors are lenient: an unknown good reads as zero or
//! the empty string. [`get_info`] is the strict form.

use goods_protocol::runtime::Invocation;
use num_bigint::BigInt;
use num_traits::Zero;

use super::error::{
    parse_address, require_non_empty, require_positive, GoodsError, GoodsResult,
};
use super::events::GoodsEvent;
use super::ledger;
use super::types::{Good, GOOD_DECIMALS};

pub const GOOD_NAMESPACE: &str = "goodToken";

fn load(inv: &Invocation<'_>, name: &str) -> GoodsResult<Option<Good>> {
    inv.get(GOOD_NAMESPACE, name.as_bytes())?
        .map(|bytes| Good::decode(&bytes))
        .transpose()
}

pub fn exists(inv: &Invocation<'_>, name: &str) -> GoodsResult<bool> {
    Ok(inv.get(GOOD_NAMESPACE, name.as_bytes())?.is_some())
}

/// Create good `name` with `total_supply` units, all owned by `owner`.
///
/// Malformed input and a duplicate name abort the call. A caller that has
/// not signed as `owner` gets `Ok(false)`.
pub fn initialize(
    inv: &mut Invocation<'_>,
    name: &str,
    symbol: &str,
    total_supply: &BigInt,
    owner: &[u8],
    desc: &str,
) -> GoodsResult<bool> {
    let owner = parse_address("owner", owner)?;
    require_non_empty("name", name)?;
    require_positive("totalSupply", total_supply)?;

    if exists(inv, name)? {
        return Err(GoodsError::AlreadyExists(name.to_string()));
    }

    if !inv.check_witness(&owner) {
        tracing::warn!(good = name, owner = %owner, "init not authorized by owner");
        return Ok(false);
    }

    if !ledger::transfer(inv, name, None, Some(&owner), total_supply)? {
        return Err(GoodsError::MintFailed(name.to_string()));
    }

    let good = Good {
        owner,
        name: name.to_string(),
        total_supply: total_supply.clone(),
        symbol: symbol.to_string(),
        decimals: GOOD_DECIMALS,
        desc: desc.to_string(),
    };
    inv.put(GOOD_NAMESPACE, name.as_bytes(), good.encode()?)?;

    GoodsEvent::Init {
        owner,
        name: good.name.clone(),
        symbol: good.symbol.clone(),
        desc: good.desc.clone(),
        total_supply: good.total_supply.clone(),
    }
    .emit(inv);

    tracing::info!(good = name, symbol, owner = %owner, supply = %total_supply, "good initialized");
    Ok(true)
}

/// The full record, or `None` for an unknown good.
pub fn get_info(inv: &Invocation<'_>, name: &str) -> GoodsResult<Option<Good>> {
    require_non_empty("name", name)?;
    load(inv, name)
}

pub fn total_supply(inv: &Invocation<'_>, name: &str) -> GoodsResult<BigInt> {
    Ok(load(inv, name)?.map_or_else(BigInt::zero, |g| g.total_supply))
}

pub fn name(inv: &Invocation<'_>, name: &str) -> GoodsResult<String> {
    Ok(load(inv, name)?.map(|g| g.name).unwrap_or_default())
}

pub fn symbol(inv: &Invocation<'_>, name: &str) -> GoodsResult<String> {
    Ok(load(inv, name)?.map(|g| g.symbol).unwrap_or_default())
}

pub fn decimals(inv: &Invocation<'_>, name: &str) -> GoodsResult<u8> {
    Ok(load(inv, name)?.map(|g| g.decimals).unwrap_or_default())
}

pub fn description(inv: &Invocation<'_>, name: &str) -> GoodsResult<String> {
    Ok(load(inv, name)?.map(|g| g.desc).unwrap_or_default())
}
