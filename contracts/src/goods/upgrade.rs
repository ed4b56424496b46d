//! Admin-gated code replacement.
//!
//! An upgrade is accepted in two shapes: code only, or code plus the eight
//! manifest fields in the order of [`ContractManifest`]. Code-only upgrades
//! take the deployment's configured default manifest. Replacing the code
//! with identical bytes is refused. Storage is kept as is.

use goods_protocol::config::UPGRADE_METADATA_FIELDS;
use goods_protocol::deployment::{ContractManifest, DeployedContract};
use goods_protocol::params::Args;
use goods_protocol::runtime::Invocation;

use super::access::check_admin;
use super::error::{GoodsError, GoodsResult};

/// The `upgrade` operation: admin check, then call shape, then replacement.
///
/// Arguments are the new code, optionally followed by the eight manifest
/// fields. Any other count returns `false`.
pub fn upgrade(inv: &mut Invocation<'_>, args: &Args<'_>) -> GoodsResult<bool> {
    if !check_admin(inv)? {
        return Ok(false);
    }
    let manifest = match args.len() {
        1 => None,
        n if n == 1 + UPGRADE_METADATA_FIELDS => Some(ContractManifest {
            parameter_list: args.bytes(1)?,
            return_type: args.byte(2)?,
            need_storage: args.boolean(3)?,
            name: args.string(4)?,
            version: args.string(5)?,
            author: args.string(6)?,
            email: args.string(7)?,
            description: args.string(8)?,
        }),
        n => {
            tracing::debug!(args = n, "upgrade called with unsupported argument count");
            return Ok(false);
        }
    };
    replace(inv, args.bytes(0)?, manifest)
}

fn replace(
    inv: &mut Invocation<'_>,
    code: Vec<u8>,
    manifest: Option<ContractManifest>,
) -> GoodsResult<bool> {
    if code.is_empty() {
        return Err(GoodsError::Empty("code"));
    }
    let current = inv.deployed_contract()?;
    if current.code == code {
        tracing::debug!("upgrade refused: code unchanged");
        return Ok(false);
    }

    let manifest = manifest.unwrap_or_else(|| inv.config().upgrade_defaults.clone());
    let replacement = DeployedContract::new(code, manifest);
    let next = replacement.script_hash();
    inv.migrate(replacement)?;

    tracing::info!(from = %current.script_hash(), to = %next, "contract upgraded");
    Ok(true)
}
