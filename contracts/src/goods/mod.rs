//! # Goods Contract
//!
//! [`GoodsContract::main`] is the entry point the host calls. It resolves the
//! operation name and hands the arguments to the component that owns it:
//!
//! ```text
//! main ──▶ registry      totalSupply name symbol decimals desc getGoodInfo init
//!      ──▶ ledger        balanceOf transfer
//!      ──▶ access        setAccount getAccount
//!      ──▶ upgrade       upgrade
//! ```
//!
//! ## Call Shapes
//!
//! - `transfer` takes exactly 4 arguments and `init` exactly 5; any other
//!   count returns `false`.
//! - `upgrade` takes 1 or 9, checked after the admin check.
//! - Other operations raise on a missing argument and ignore extras.
//! - Unknown operation names return `false`.
//! - Under the verification trigger every call returns `false`, so the
//!   contract's own account can never be spent by signature.

pub mod access;
pub mod account_store;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod ledger;
pub mod registry;
pub mod types;
pub mod upgrade;

use goods_protocol::deployment::{ContractManifest, DeployedContract};
use goods_protocol::params::{Args, Argument, InvocationRequest};
use goods_protocol::runtime::{CallContext, Invocation, Runtime, Trigger};
use goods_protocol::storage::Store;
use num_bigint::BigInt;

use dispatch::{InvokeResult, Operation};
use error::GoodsResult;

const TRANSFER_ARITY: usize = 4;
const INIT_ARITY: usize = 5;

/// The goods ledger contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodsContract;

impl GoodsContract {
    /// Code bytes identifying this build. Their script hash is the
    /// contract's address once deployed.
    pub fn code() -> Vec<u8> {
        format!("goods-contracts/{}", env!("CARGO_PKG_VERSION")).into_bytes()
    }

    /// Initial deployment record for this build.
    pub fn deployment() -> DeployedContract {
        DeployedContract::new(
            Self::code(),
            ContractManifest {
                name: "goods".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: "goods ledger".to_string(),
                ..ContractManifest::default()
            },
        )
    }

    /// Run one call inside an already open invocation.
    pub fn main(
        inv: &mut Invocation<'_>,
        operation: &str,
        args: &[Argument],
    ) -> GoodsResult<InvokeResult> {
        if inv.trigger() == Trigger::Verification {
            tracing::debug!(operation, "verification trigger refused");
            return Ok(InvokeResult::Boolean(false));
        }

        let Some(op) = Operation::parse(operation) else {
            tracing::debug!(operation, "unknown operation");
            return Ok(InvokeResult::Boolean(false));
        };
        tracing::debug!(operation, args = args.len(), "dispatch");

        let a = Args::new(operation, args);
        let result = match op {
            Operation::TotalSupply => {
                InvokeResult::Integer(registry::total_supply(inv, &a.string(0)?)?)
            }
            Operation::Name => InvokeResult::String(registry::name(inv, &a.string(0)?)?),
            Operation::Symbol => InvokeResult::String(registry::symbol(inv, &a.string(0)?)?),
            Operation::Desc => InvokeResult::String(registry::description(inv, &a.string(0)?)?),
            Operation::Decimals => {
                InvokeResult::Integer(BigInt::from(registry::decimals(inv, &a.string(0)?)?))
            }
            Operation::GetGoodInfo => InvokeResult::Good(registry::get_info(inv, &a.string(0)?)?),
            Operation::BalanceOf => {
                InvokeResult::Integer(ledger::balance_of(inv, &a.string(0)?, &a.bytes(1)?)?)
            }
            Operation::Transfer if a.len() != TRANSFER_ARITY => InvokeResult::Boolean(false),
            Operation::Transfer => InvokeResult::Boolean(ledger::transfer_public(
                inv,
                &a.string(0)?,
                &a.bytes(1)?,
                &a.bytes(2)?,
                &a.integer(3)?,
            )?),
            Operation::Init if a.len() != INIT_ARITY => InvokeResult::Boolean(false),
            Operation::Init => InvokeResult::Boolean(registry::initialize(
                inv,
                &a.string(0)?,
                &a.string(1)?,
                &a.integer(2)?,
                &a.bytes(3)?,
                &a.string(4)?,
            )?),
            Operation::SetAccount => {
                InvokeResult::Boolean(access::set_account(inv, &a.string(0)?, &a.bytes(1)?)?)
            }
            Operation::GetAccount => InvokeResult::Bytes(
                access::get_account(inv, &a.string(0)?)?
                    .map(|addr| addr.to_vec())
                    .unwrap_or_default(),
            ),
            Operation::Upgrade => InvokeResult::Boolean(upgrade::upgrade(inv, &a)?),
        };
        Ok(result)
    }

    /// Run `request` as its own atomic invocation on `runtime`.
    pub fn invoke<S: Store>(
        runtime: &Runtime<S>,
        ctx: CallContext<'_>,
        request: &InvocationRequest,
    ) -> GoodsResult<InvokeResult> {
        runtime.invoke(ctx, |inv| Self::main(inv, &request.operation, &request.args))
    }
}
