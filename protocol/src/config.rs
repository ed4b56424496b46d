//! # Protocol Configuration & Constants
//!
//! Every fixed number the ledger relies on lives here, together with the
//! per-deployment settings that are allowed to differ between environments
//! (the fallback admin account and the default upgrade manifest).
//!
//! Constants are consensus-relevant: an address of the wrong length, a
//! different version byte or a renamed namespace changes what every node
//! reads from storage. Treat edits here as a migration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::account::Address;
use crate::deployment::ContractManifest;

// ---------------------------------------------------------------------------
// Account Identifiers
// ---------------------------------------------------------------------------

/// Account identifiers are script hashes of exactly this many bytes.
/// Anything else is rejected wherever an identifier is accepted.
pub const ADDRESS_LENGTH: usize = 20;

/// Version byte prefixed to a script hash before base58check encoding.
pub const ADDRESS_VERSION: u8 = 0x17;

/// Length of the script hash digest taken from the BLAKE3 output.
pub const SCRIPT_HASH_LENGTH: usize = ADDRESS_LENGTH;

// ---------------------------------------------------------------------------
// Fallback Admin
// ---------------------------------------------------------------------------

/// Text form of the multi-party committee account that holds admin rights
/// until an admin is explicitly registered.
pub const COMMITTEE_ADDRESS: &str = "AZ77FiX7i9mRUPF2RyuJD2L8kS6UDnQ9Y7";

/// Decoded script hash of [`COMMITTEE_ADDRESS`]. Kept as bytes so the
/// default configuration can be built without a fallible decode.
pub const COMMITTEE_SCRIPT_HASH: [u8; ADDRESS_LENGTH] = [
    0xbe, 0x1d, 0x66, 0x7b, 0xda, 0xe1, 0x36, 0x68, 0xfa, 0x28, 0x66, 0xcd, 0x39, 0xce, 0xe0, 0x62,
    0x8d, 0x81, 0xc7, 0x81,
];

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Namespace reserved for host-owned records (the deployed contract).
/// Contracts must not write here directly.
pub const SYSTEM_NAMESPACE: &str = "system";

/// Key of the deployed contract record inside [`SYSTEM_NAMESPACE`].
pub const DEPLOYED_CONTRACT_KEY: &[u8] = b"contract";

/// Key of the [`DeploymentConfig`] fixed when the contract was deployed.
pub const DEPLOYMENT_CONFIG_KEY: &[u8] = b"config";

/// Prefix of consumed signing-message digests inside [`SYSTEM_NAMESPACE`].
pub const CONSUMED_MESSAGE_PREFIX: &[u8] = b"consumed/";

// ---------------------------------------------------------------------------
// Upgrade Metadata
// ---------------------------------------------------------------------------

/// Number of metadata fields that may accompany replacement code.
pub const UPGRADE_METADATA_FIELDS: usize = 8;

/// Placeholder manifest values used when an upgrade supplies code only.
/// None of these carry meaning beyond "something was filled in".
pub const DEFAULT_PARAMETER_LIST: [u8; 2] = [0x07, 0x10];
pub const DEFAULT_RETURN_TYPE: u8 = 0x05;
pub const DEFAULT_NEED_STORAGE: bool = true;
pub const DEFAULT_CONTRACT_NAME: &str = "business";
pub const DEFAULT_CONTRACT_VERSION: &str = "1";
pub const DEFAULT_CONTRACT_AUTHOR: &str = "alchemint";
pub const DEFAULT_CONTRACT_EMAIL: &str = "0";
pub const DEFAULT_CONTRACT_DESCRIPTION: &str = "alchemint";

// ---------------------------------------------------------------------------
// Deployment Configuration
// ---------------------------------------------------------------------------

/// Errors loading a deployment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings supplied once per deployment.
///
/// The fallback admin is configuration rather than a literal in control flow
/// so test and production environments can point at different committees.
/// It is stored alongside the contract at deploy time and read back from
/// there on every call; later runs cannot change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Account that may perform privileged actions while no admin is
    /// registered under the reserved admin key.
    pub fallback_admin: Address,
    /// Manifest applied when an upgrade carries replacement code only.
    pub upgrade_defaults: ContractManifest,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            fallback_admin: Address::new(COMMITTEE_SCRIPT_HASH),
            upgrade_defaults: ContractManifest::default(),
        }
    }
}

impl DeploymentConfig {
    /// Configuration with a different fallback admin and default manifest.
    pub fn with_fallback_admin(fallback_admin: Address) -> Self {
        Self {
            fallback_admin,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults, so `{}` is a valid (committee-administered) config.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
