//! # CLI Interface
//!
//! Defines the command-line argument structure for `goods-node` using
//! `clap` derive. Subcommands: `keygen`, `address`, `deploy`, `invoke`,
//! `status` and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use goods_protocol::account::Address;
use goods_protocol::params::Argument;

/// Goods ledger host.
///
/// Runs the goods contract against a local sled database. Each `invoke` is
/// one atomic call: its writes commit together or not at all.
#[derive(Parser, Debug)]
#[command(
    name = "goods-node",
    about = "Goods ledger host",
    version,
    propagate_version = true
)]
pub struct GoodsNodeCli {
    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "GOODS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the goods node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an Ed25519 keypair and print its address.
    Keygen(KeygenArgs),
    /// Print the address of a single-key or multisig verification script.
    Address(AddressArgs),
    /// Deploy the goods contract into the data directory.
    Deploy(DeployArgs),
    /// Run one contract operation.
    Invoke(InvokeArgs),
    /// Show the deployed contract and current admin.
    Status(StoreArgs),
    /// Print version information and exit.
    Version,
}

/// Where state lives.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Data directory holding the sled database.
    ///
    /// Created on first use if it does not exist.
    #[arg(long, short = 'd', env = "GOODS_DATA_DIR", default_value = "./goods-data")]
    pub data_dir: PathBuf,
}

/// Arguments for the `deploy` subcommand.
///
/// The configuration is stored with the contract; later commands read it
/// from the database and cannot override it.
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Deployment configuration file (JSON).
    #[arg(long, short = 'c', env = "GOODS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Account holding admin rights until one is registered. Overrides the
    /// config file. Base58 or hex.
    #[arg(long, env = "GOODS_FALLBACK_ADMIN")]
    pub fallback_admin: Option<Address>,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the hex secret key to this file instead of printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Arguments for the `address` subcommand.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Hex Ed25519 public keys. One key without `--threshold` is a
    /// single-key account; otherwise a multisig.
    #[arg(required = true)]
    pub public_keys: Vec<String>,

    /// Signatures required for a multisig. Defaults to all keys.
    #[arg(long, short = 'm')]
    pub threshold: Option<usize>,
}

/// Arguments for the `invoke` subcommand.
#[derive(Args, Debug)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Operation name, e.g. `init`, `transfer`, `balanceOf`.
    pub operation: String,

    /// Typed arguments: `str:gold`, `int:1000`, `hex:0a0b`, `addr:<address>`,
    /// `bool:true`.
    #[arg(value_parser = <Argument as std::str::FromStr>::from_str)]
    pub args: Vec<Argument>,

    /// Secret key file to sign with. Repeat for several signers.
    #[arg(long = "key-file", short = 'k')]
    pub key_files: Vec<PathBuf>,

    /// Also sign as the multisig account of these hex public keys, using
    /// the key files' signatures. Repeat once per member.
    #[arg(long = "multisig-key")]
    pub multisig_keys: Vec<String>,

    /// Signatures the multisig account requires. Defaults to all members.
    #[arg(long, requires = "multisig_keys")]
    pub multisig_threshold: Option<usize>,

    /// Nonce bound into the signed message. Random when omitted.
    #[arg(long)]
    pub nonce: Option<u64>,

    /// Script hash of a calling contract, for contract-to-contract calls.
    #[arg(long)]
    pub calling_contract: Option<Address>,

    /// Run under the verification trigger instead of application.
    #[arg(long)]
    pub verification: bool,
}
