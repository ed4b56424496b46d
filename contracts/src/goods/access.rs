//! # Access Control
//!
//! Privileged actions (account registration, upgrades) belong to one admin
//! account. The admin is whatever is bound under [`ADMIN_ACCOUNT_KEY`] in the
//! account store; until something is bound there, the deployment's
//! configured fallback admin holds the role.
//!
//! Rotation is an ordinary `set_account` on the admin key, authorized by the
//! current admin. Once rotated, the fallback no longer has any rights.

use goods_protocol::account::Address;
use goods_protocol::runtime::Invocation;

use super::account_store;
use super::error::{parse_address, require_non_empty, GoodsResult};

/// Reserved account-store key naming the current admin.
pub const ADMIN_ACCOUNT_KEY: &str = "admin_account";

/// The account currently holding admin rights.
pub fn resolve_admin(inv: &Invocation<'_>) -> GoodsResult<Address> {
    Ok(account_store::get(inv, ADMIN_ACCOUNT_KEY)?.unwrap_or(inv.config().fallback_admin))
}

/// Has the caller authorized as the current admin?
pub fn check_admin(inv: &Invocation<'_>) -> GoodsResult<bool> {
    let admin = resolve_admin(inv)?;
    let authorized = inv.check_witness(&admin);
    if !authorized {
        tracing::warn!(admin = %admin, "caller lacks admin authorization");
    }
    Ok(authorized)
}

/// Bind `key` to `address`. Admin only.
pub fn set_account(inv: &mut Invocation<'_>, key: &str, address: &[u8]) -> GoodsResult<bool> {
    require_non_empty("key", key)?;
    let address = parse_address("address", address)?;

    if !check_admin(inv)? {
        return Ok(false);
    }

    account_store::put(inv, key, &address)?;
    if key == ADMIN_ACCOUNT_KEY {
        tracing::info!(admin = %address, "admin rotated");
    } else {
        tracing::info!(key, address = %address, "account binding set");
    }
    Ok(true)
}

/// Unauthenticated read of a binding.
pub fn get_account(inv: &Invocation<'_>, key: &str) -> GoodsResult<Option<Address>> {
    account_store::get(inv, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::error::GoodsError;
    use crate::goods::test_support::{TestHost, FALLBACK_ADMIN};

    #[test]
    fn fallback_admin_until_one_is_set() {
        let host = TestHost::new();
        host.run_unsigned(|inv| {
            assert_eq!(resolve_admin(inv)?, FALLBACK_ADMIN);
            assert!(!check_admin(inv)?);
            Ok(())
        });
        host.run(&[FALLBACK_ADMIN], |inv| {
            assert!(check_admin(inv)?);
            Ok(())
        });
    }

    #[test]
    fn rotation_moves_admin_rights() {
        let host = TestHost::new();
        let next = Address::new([0x42; 20]);

        let rotated = host.run(&[FALLBACK_ADMIN], |inv| {
            set_account(inv, ADMIN_ACCOUNT_KEY, next.as_bytes())
        });
        assert!(rotated);

        host.run(&[FALLBACK_ADMIN], |inv| {
            assert_eq!(resolve_admin(inv)?, next);
            assert!(!check_admin(inv)?);
            Ok(())
        });
        host.run(&[next], |inv| {
            assert!(check_admin(inv)?);
            Ok(())
        });
    }

    #[test]
    fn non_admin_cannot_bind() {
        let host = TestHost::new();
        let stranger = Address::new([7u8; 20]);
        let bound = host.run(&[stranger], |inv| {
            set_account(inv, "treasury", stranger.as_bytes())
        });
        assert!(!bound);
        host.run_unsigned(|inv| {
            assert_eq!(get_account(inv, "treasury")?, None);
            Ok(())
        });
    }

    #[test]
    fn validation_precedes_authorization() {
        let host = TestHost::new();
        let empty_key = host.try_run_unsigned(|inv| set_account(inv, "", &[1u8; 20]));
        assert!(matches!(empty_key, Err(GoodsError::Empty("key"))));

        let short = host.try_run_unsigned(|inv| set_account(inv, "treasury", &[1u8; 5]));
        assert!(matches!(
            short,
            Err(GoodsError::InvalidAddress { actual: 5, .. })
        ));
    }

    #[test]
    fn admin_binds_arbitrary_keys() {
        let host = TestHost::new();
        let treasury = Address::new([9u8; 20]);
        assert!(host.run(&[FALLBACK_ADMIN], |inv| {
            set_account(inv, "treasury", treasury.as_bytes())
        }));
        host.run_unsigned(|inv| {
            assert_eq!(get_account(inv, "treasury")?, Some(treasury));
            // Binding another key leaves the admin untouched.
            assert_eq!(resolve_admin(inv)?, FALLBACK_ADMIN);
            Ok(())
        });
    }
}
