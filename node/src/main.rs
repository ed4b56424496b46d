// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Goods Node
//!
//! Entry point for the `goods-node` binary. Parses CLI arguments,
//! initializes logging, opens the sled-backed runtime and runs one command:
//!
//! - `keygen`: generate a keypair
//! - `address`: derive an account address from public keys
//! - `deploy`: install the goods contract and fix its configuration
//! - `invoke`: sign and run one operation
//! - `status`: show the deployment and current admin
//! - `version`: print build version information
//!
//! Results go to stdout as JSON; logs go to stderr.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use goods_contracts::goods::access;
use goods_contracts::{GoodsContract, InvokeResult};
use goods_protocol::auth::WitnessSet;
use goods_protocol::config::DeploymentConfig;
use goods_protocol::crypto::{Keypair, PublicKey, VerificationScript, Witness};
use goods_protocol::events::{EventSink, MemorySink, Notification, TracingSink};
use goods_protocol::params::InvocationRequest;
use goods_protocol::runtime::{CallContext, Runtime};
use goods_protocol::storage::SledStore;

use cli::{AddressArgs, Commands, DeployArgs, GoodsNodeCli, InvokeArgs, KeygenArgs, StoreArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = GoodsNodeCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Address(args) => address(args),
        Commands::Deploy(args) => deploy(args),
        Commands::Invoke(args) => invoke(args),
        Commands::Status(args) => status(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Deployment configuration from the optional file, with the CLI fallback
/// admin applied on top. Only `deploy` reads it.
fn load_config(args: &DeployArgs) -> Result<DeploymentConfig> {
    let mut config = match &args.config {
        Some(path) => DeploymentConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DeploymentConfig::default(),
    };
    if let Some(admin) = args.fallback_admin {
        config.fallback_admin = admin;
    }
    Ok(config)
}

fn open_runtime(args: &StoreArgs, sink: Arc<dyn EventSink>) -> Result<Runtime<SledStore>> {
    let db_path = args.data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;

    let store = SledStore::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "database opened");

    Ok(Runtime::new(store, sink))
}

fn keygen(args: KeygenArgs) -> Result<()> {
    let keypair = Keypair::generate();
    let address = keypair.address();

    match &args.out {
        Some(path) => {
            write_secret(path, &keypair.secret_key_hex())?;
            tracing::info!(address = %address, key_path = %path.display(), "keypair generated");
            println!("Address    : {}", address);
            println!("Public key : {}", keypair.public_key().to_hex());
            println!("Key file   : {}", path.display());
        }
        None => {
            println!("Address    : {}", address);
            println!("Public key : {}", keypair.public_key().to_hex());
            println!("Secret key : {}", keypair.secret_key_hex());
        }
    }
    Ok(())
}

fn write_secret(path: &Path, secret_hex: &str) -> Result<()> {
    std::fs::write(path, secret_hex)
        .with_context(|| format!("failed to write key to {}", path.display()))?;

    // Restrict permissions on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

fn read_keypair(path: &Path) -> Result<Keypair> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    Keypair::from_hex(&raw).with_context(|| format!("invalid key in {}", path.display()))
}

fn parse_public_keys(hex_keys: &[String]) -> Result<Vec<PublicKey>> {
    hex_keys
        .iter()
        .map(|k| PublicKey::from_hex(k).with_context(|| format!("invalid public key `{k}`")))
        .collect()
}

fn address(args: AddressArgs) -> Result<()> {
    let keys = parse_public_keys(&args.public_keys)?;

    let script = match args.threshold {
        None if keys.len() == 1 => VerificationScript::single(keys[0]),
        threshold => VerificationScript::multisig(threshold.unwrap_or(keys.len()), keys)?,
    };
    let hash = script.script_hash();
    println!("Address     : {}", hash);
    println!("Script hash : {}", hash.to_hex());
    Ok(())
}

fn deploy(args: DeployArgs) -> Result<()> {
    let config = load_config(&args)?;
    let runtime = open_runtime(&args.store, Arc::new(TracingSink))?;
    let hash = runtime
        .deploy(GoodsContract::deployment(), &config)
        .context("deployment failed")?;
    println!("Contract deployed: {}", hash);
    println!("Fallback admin   : {}", config.fallback_admin);
    Ok(())
}

/// One single-key witness per key file, plus a multisig witness when
/// `--multisig-key` names the members.
fn build_witnesses(args: &InvokeArgs, message: &[u8]) -> Result<Vec<Witness>> {
    let keypairs = args
        .key_files
        .iter()
        .map(|path| read_keypair(path))
        .collect::<Result<Vec<_>>>()?;

    let mut witnesses: Vec<Witness> = keypairs
        .iter()
        .map(|keypair| {
            Witness::new(
                VerificationScript::single(keypair.public_key()),
                vec![keypair.sign(message)],
            )
        })
        .collect();

    if !args.multisig_keys.is_empty() {
        let members = parse_public_keys(&args.multisig_keys)?;
        let threshold = args.multisig_threshold.unwrap_or(members.len());
        let script = VerificationScript::multisig(threshold, members)?;
        tracing::debug!(account = %script.script_hash(), threshold, "signing as multisig");
        let signatures = keypairs.iter().map(|keypair| keypair.sign(message)).collect();
        witnesses.push(Witness::new(script, signatures));
    }
    Ok(witnesses)
}

#[derive(Serialize)]
struct InvokeOutput<'a> {
    operation: &'a str,
    result: &'a InvokeResult,
    notifications: &'a [Notification],
}

fn invoke(args: InvokeArgs) -> Result<()> {
    let sink = Arc::new(MemorySink::new());
    let runtime = open_runtime(&args.store, sink.clone())?;
    let contract = match runtime.deployed()? {
        Some(deployed) => deployed.script_hash(),
        None => bail!("no contract deployed; run `goods-node deploy` first"),
    };

    let request = InvocationRequest::new(args.operation.clone(), args.args.clone());
    let request = match args.nonce {
        Some(nonce) => request.with_nonce(nonce),
        None => request.with_random_nonce(),
    };
    let message = request.signing_message(&contract);
    let witnesses = build_witnesses(&args, &message)?;
    let auth = WitnessSet::from_witnesses(&message, &witnesses);

    let mut ctx = if args.verification {
        CallContext::verification(&auth)
    } else {
        CallContext::application(&auth)
    };
    if let Some(caller) = args.calling_contract {
        ctx = ctx.with_calling_contract(caller);
    }

    tracing::info!(
        operation = %request.operation,
        args = request.args.len(),
        nonce = request.nonce,
        signers = auth.len(),
        "invoking"
    );
    let result = GoodsContract::invoke(&runtime, ctx, &request)
        .with_context(|| format!("operation `{}` aborted", request.operation))?;

    let notifications = sink.take();
    for notification in &notifications {
        TracingSink.publish(notification);
    }

    let output = InvokeOutput {
        operation: &request.operation,
        result: &result,
        notifications: &notifications,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn status(args: StoreArgs) -> Result<()> {
    let runtime = open_runtime(&args, Arc::new(TracingSink))?;
    let (Some(deployed), Some(config)) = (runtime.deployed()?, runtime.deployment_config()?) else {
        println!("{}", serde_json::json!({ "deployed": false }));
        return Ok(());
    };

    let nobody = WitnessSet::empty();
    let admin = runtime
        .invoke(CallContext::application(&nobody), |inv| access::resolve_admin(inv))
        .context("failed to resolve admin")?;

    let report = serde_json::json!({
        "deployed": true,
        "contract": deployed.script_hash(),
        "manifest": deployed.manifest,
        "admin": admin,
        "fallback_admin": config.fallback_admin,
        "entries": runtime.store().len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("goods-node      {}", env!("CARGO_PKG_VERSION"));
    println!("contract code   {}", String::from_utf8_lossy(&GoodsContract::code()));
    println!("contract hash   {}", GoodsContract::deployment().script_hash());
}

#[cfg(test)]
mod tests {
    use super::*;
    use goods_protocol::account::Address;
    use goods_protocol::auth::Authenticator;
    use std::io::Write;

    fn store_args(dir: &Path) -> StoreArgs {
        StoreArgs {
            data_dir: dir.to_path_buf(),
        }
    }

    fn deploy_args(dir: &Path) -> DeployArgs {
        DeployArgs {
            store: store_args(dir),
            config: None,
            fallback_admin: None,
        }
    }

    fn invoke_args(dir: &Path, key_files: Vec<std::path::PathBuf>) -> InvokeArgs {
        InvokeArgs {
            store: store_args(dir),
            operation: "getAccount".to_string(),
            args: vec!["admin_account".into()],
            key_files,
            multisig_keys: Vec::new(),
            multisig_threshold: None,
            nonce: None,
            calling_contract: None,
            verification: false,
        }
    }

    #[test]
    fn cli_fallback_admin_overrides_config_file() {
        let file_admin = Address::new([1u8; 20]);
        let flag_admin = Address::new([2u8; 20]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"fallback_admin\": \"{}\"}}", file_admin).unwrap();

        let mut args = deploy_args(Path::new("."));
        args.config = Some(file.path().to_path_buf());
        assert_eq!(load_config(&args).unwrap().fallback_admin, file_admin);

        args.fallback_admin = Some(flag_admin);
        assert_eq!(load_config(&args).unwrap().fallback_admin, flag_admin);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let mut args = deploy_args(Path::new("."));
        args.config = Some("/definitely/not/here.json".into());
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn deploy_fixes_the_fallback_admin() {
        let dir = tempfile::tempdir().unwrap();
        let admin = Address::new([5u8; 20]);
        let mut args = deploy_args(dir.path());
        args.fallback_admin = Some(admin);
        deploy(args).unwrap();
        assert!(dir.path().join("db").exists());

        let runtime = open_runtime(&store_args(dir.path()), Arc::new(MemorySink::new())).unwrap();
        assert_eq!(
            runtime.deployed().unwrap().unwrap().script_hash(),
            GoodsContract::deployment().script_hash()
        );
        assert_eq!(
            runtime.deployment_config().unwrap().unwrap().fallback_admin,
            admin
        );
    }

    #[test]
    fn multisig_members_sign_as_the_committee() {
        let dir = tempfile::tempdir().unwrap();
        let members: Vec<Keypair> = (1..=3u8).map(|i| Keypair::from_seed(&[i; 32])).collect();
        let key_files: Vec<_> = members[..2]
            .iter()
            .enumerate()
            .map(|(i, keypair)| {
                let path = dir.path().join(format!("m{i}.key"));
                write_secret(&path, &keypair.secret_key_hex()).unwrap();
                path
            })
            .collect();

        let mut args = invoke_args(dir.path(), key_files);
        args.multisig_keys = members.iter().map(|k| k.public_key().to_hex()).collect();
        args.multisig_threshold = Some(2);

        let committee = VerificationScript::multisig(
            2,
            members.iter().map(Keypair::public_key).collect(),
        )
        .unwrap()
        .script_hash();

        let message = [9u8; 32];
        let witnesses = build_witnesses(&args, &message).unwrap();
        assert_eq!(witnesses.len(), 3);

        let auth = WitnessSet::from_witnesses(&message, &witnesses);
        assert!(auth.is_authorized_as(&committee));
        assert!(auth.is_authorized_as(&members[0].address()));
        assert!(!auth.is_authorized_as(&members[2].address()));
    }

    #[test]
    fn multisig_below_threshold_does_not_authorize() {
        let dir = tempfile::tempdir().unwrap();
        let members: Vec<Keypair> = (1..=3u8).map(|i| Keypair::from_seed(&[i; 32])).collect();
        let path = dir.path().join("m0.key");
        write_secret(&path, &members[0].secret_key_hex()).unwrap();

        let mut args = invoke_args(dir.path(), vec![path]);
        args.multisig_keys = members.iter().map(|k| k.public_key().to_hex()).collect();

        let committee = VerificationScript::multisig(
            3,
            members.iter().map(Keypair::public_key).collect(),
        )
        .unwrap()
        .script_hash();

        let message = [1u8; 32];
        let auth = WitnessSet::from_witnesses(&message, &build_witnesses(&args, &message).unwrap());
        assert!(!auth.is_authorized_as(&committee));
    }

    #[test]
    fn key_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.key");
        let keypair = Keypair::from_seed(&[3u8; 32]);
        write_secret(&path, &keypair.secret_key_hex()).unwrap();
        assert_eq!(read_keypair(&path).unwrap().address(), keypair.address());
    }
}
