//! # Balance Ledger
//!
//! Per-good, per-account balances under the key `name ++ address`.
//!
//! ## Invariants
//!
//! - A stored balance is always positive. A debit that reaches exactly zero
//!   deletes the entry, so an absent entry and a zero balance read the same.
//! - A transfer either moves the full amount or changes nothing.
//! - The sum of all balances of a good equals its total supply. The only
//!   credit without a matching debit is the mint inside initialization.

use goods_protocol::account::Address;
use goods_protocol::params::{integer_from_bytes, integer_to_bytes};
use goods_protocol::runtime::Invocation;
use num_bigint::BigInt;
use num_traits::Zero;

use super::error::{parse_address, require_non_empty, require_positive, GoodsError, GoodsResult};
use super::events::GoodsEvent;
use super::registry;

pub const BALANCE_NAMESPACE: &str = "goodBalance";

fn balance_key(name: &str, account: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(name.len() + account.as_bytes().len());
    key.extend_from_slice(name.as_bytes());
    key.extend_from_slice(account.as_bytes());
    key
}

fn read_balance(inv: &Invocation<'_>, name: &str, account: &Address) -> GoodsResult<BigInt> {
    Ok(inv
        .get(BALANCE_NAMESPACE, &balance_key(name, account))?
        .map(|bytes| integer_from_bytes(&bytes))
        .unwrap_or_else(BigInt::zero))
}

fn write_balance(
    inv: &mut Invocation<'_>,
    name: &str,
    account: &Address,
    amount: &BigInt,
) -> GoodsResult<()> {
    let key = balance_key(name, account);
    if amount.is_zero() {
        inv.delete(BALANCE_NAMESPACE, &key)?;
    } else {
        inv.put(BALANCE_NAMESPACE, &key, integer_to_bytes(amount))?;
    }
    Ok(())
}

/// Balance of `account` in good `name`; zero when nothing is held.
pub fn balance_of(inv: &Invocation<'_>, name: &str, account: &[u8]) -> GoodsResult<BigInt> {
    let account = parse_address("address", account)?;
    require_non_empty("name", name)?;
    read_balance(inv, name, &account)
}

/// Whether a balance entry is physically stored. Lets tests observe
/// compaction, which `balance_of` deliberately hides.
pub fn has_entry(inv: &Invocation<'_>, name: &str, account: &Address) -> GoodsResult<bool> {
    Ok(inv.get(BALANCE_NAMESPACE, &balance_key(name, account))?.is_some())
}

/// Move `amount` of `name` from `from` to `to`.
///
/// `None` on either side skips that side: no origin is a mint, no
/// destination a burn. The caller has already checked that the good exists
/// and that the move is authorized.
///
/// Returns `Ok(false)` with nothing changed when `from` holds less than
/// `amount`. `from == to` succeeds without touching storage or emitting.
pub fn transfer(
    inv: &mut Invocation<'_>,
    name: &str,
    from: Option<&Address>,
    to: Option<&Address>,
    amount: &BigInt,
) -> GoodsResult<bool> {
    require_positive("amount", amount)?;

    if from == to {
        return Ok(true);
    }

    if let Some(from) = from {
        let current = read_balance(inv, name, from)?;
        if current < *amount {
            tracing::debug!(good = name, from = %from, balance = %current, amount = %amount, "insufficient balance");
            return Ok(false);
        }
        write_balance(inv, name, from, &(current - amount))?;
    }

    if let Some(to) = to {
        let current = read_balance(inv, name, to)?;
        write_balance(inv, name, to, &(current + amount))?;
    }

    GoodsEvent::Transfer {
        name: name.to_string(),
        from: from.copied(),
        to: to.copied(),
        amount: amount.clone(),
    }
    .emit(inv);
    Ok(true)
}

/// The public `transfer` operation.
///
/// Both sides must be full addresses, so burning is not reachable from
/// outside. The caller must have signed as `from`, or be the contract whose
/// script hash is `from`.
pub fn transfer_public(
    inv: &mut Invocation<'_>,
    name: &str,
    from: &[u8],
    to: &[u8],
    amount: &BigInt,
) -> GoodsResult<bool> {
    let from = parse_address("from", from)?;
    let to = parse_address("to", to)?;
    require_positive("amount", amount)?;

    let authorized = inv.check_witness(&from) || inv.calling_contract() == Some(&from);
    if !authorized {
        tracing::warn!(good = name, from = %from, "transfer not authorized by sender");
        return Ok(false);
    }

    if !registry::exists(inv, name)? {
        return Err(GoodsError::UnknownGood(name.to_string()));
    }

    let moved = transfer(inv, name, Some(&from), Some(&to), amount)?;
    if moved {
        tracing::info!(good = name, from = %from, to = %to, amount = %amount, "transfer");
    }
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::events::TRANSFER_EVENT;
    use crate::goods::test_support::{TestHost, ALICE, BOB};

    fn funded_host() -> TestHost {
        let host = TestHost::new();
        host.run_unsigned(|inv| transfer(inv, "gold", None, Some(&ALICE), &BigInt::from(1000)));
        host.sink.take();
        host
    }

    #[test]
    fn mint_credits_without_debit() {
        let host = funded_host();
        host.run_unsigned(|inv| {
            assert_eq!(read_balance(inv, "gold", &ALICE)?, BigInt::from(1000));
            Ok(())
        });
    }

    #[test]
    fn debit_and_credit() {
        let host = funded_host();
        assert!(host.run_unsigned(|inv| {
            transfer(inv, "gold", Some(&ALICE), Some(&BOB), &BigInt::from(300))
        }));
        host.run_unsigned(|inv| {
            assert_eq!(read_balance(inv, "gold", &ALICE)?, BigInt::from(700));
            assert_eq!(read_balance(inv, "gold", &BOB)?, BigInt::from(300));
            Ok(())
        });
        assert_eq!(host.sink.take()[0].event, TRANSFER_EVENT);
    }

    #[test]
    fn exact_debit_removes_entry() {
        let host = funded_host();
        assert!(host.run_unsigned(|inv| {
            transfer(inv, "gold", Some(&ALICE), Some(&BOB), &BigInt::from(1000))
        }));
        host.run_unsigned(|inv| {
            assert!(!has_entry(inv, "gold", &ALICE)?);
            assert!(read_balance(inv, "gold", &ALICE)?.is_zero());
            assert!(has_entry(inv, "gold", &BOB)?);
            Ok(())
        });
    }

    #[test]
    fn insufficient_balance_changes_nothing() {
        let host = funded_host();
        let moved = host.run_unsigned(|inv| {
            transfer(inv, "gold", Some(&ALICE), Some(&BOB), &BigInt::from(1001))
        });
        assert!(!moved);
        assert!(host.sink.is_empty());
        host.run_unsigned(|inv| {
            assert_eq!(read_balance(inv, "gold", &ALICE)?, BigInt::from(1000));
            assert!(!has_entry(inv, "gold", &BOB)?);
            Ok(())
        });
    }

    #[test]
    fn self_transfer_is_a_silent_no_op() {
        let host = funded_host();
        assert!(host.run_unsigned(|inv| {
            transfer(inv, "gold", Some(&ALICE), Some(&ALICE), &BigInt::from(5000))
        }));
        assert!(host.sink.is_empty());
        host.run_unsigned(|inv| {
            assert_eq!(read_balance(inv, "gold", &ALICE)?, BigInt::from(1000));
            Ok(())
        });
    }

    #[test]
    fn burn_debits_without_credit() {
        let host = funded_host();
        assert!(host.run_unsigned(|inv| {
            transfer(inv, "gold", Some(&ALICE), None, &BigInt::from(400))
        }));
        host.run_unsigned(|inv| {
            assert_eq!(read_balance(inv, "gold", &ALICE)?, BigInt::from(600));
            Ok(())
        });
    }

    #[test]
    fn non_positive_amount_raises() {
        let host = funded_host();
        let zero = host.try_run_unsigned(|inv| {
            transfer(inv, "gold", Some(&ALICE), Some(&BOB), &BigInt::zero())
        });
        assert!(matches!(zero, Err(GoodsError::NotPositive { .. })));
    }

    #[test]
    fn balances_are_per_good() {
        let host = funded_host();
        host.run_unsigned(|inv| {
            assert!(read_balance(inv, "silver", &ALICE)?.is_zero());
            Ok(())
        });
    }

    #[test]
    fn balance_of_validates_inputs() {
        let host = funded_host();
        let short = host.try_run_unsigned(|inv| balance_of(inv, "gold", &[1u8; 19]));
        assert!(matches!(short, Err(GoodsError::InvalidAddress { .. })));
        let unnamed = host.try_run_unsigned(|inv| balance_of(inv, "", ALICE.as_bytes()));
        assert!(matches!(unnamed, Err(GoodsError::Empty("name"))));
    }
}
