//! # Goods Contracts
//!
//! The goods ledger: a registry of named fungible goods, each minted once
//! with a fixed total supply and afterwards only moved between accounts.
//!
//! - **Account store**: named bindings from string keys to addresses,
//!   including the admin slot.
//! - **Access control**: who may perform privileged actions.
//! - **Asset registry**: creation and description of goods.
//! - **Balance ledger**: per-good, per-account balances and transfers.
//! - **Upgrade gate**: admin-gated code replacement.
//!
//! ## Design Principles
//!
//! 1. Amounts are arbitrary precision. Supply is caller-chosen and unbounded.
//! 2. Malformed input aborts the call (`Err`); expected refusals such as a
//!    missing signature or insufficient funds are `Ok(false)`.
//! 3. A zero balance is never stored. Absent and zero read the same.
//! 4. Per good, the sum of all balances equals the total supply.

pub mod goods;

pub use goods::dispatch::{InvokeResult, Operation};
pub use goods::error::{GoodsError, GoodsResult};
pub use goods::events::GoodsEvent;
pub use goods::types::Good;
pub use goods::GoodsContract;
