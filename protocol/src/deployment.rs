//! # Contract Deployment
//!
//! The host keeps one record describing the deployed contract: its code and
//! the manifest that accompanied it. The code's script hash is the contract's
//! on-ledger identity (the "executing contract" of every invocation).
//!
//! The record lives in the reserved [`SYSTEM_NAMESPACE`] of the same store as
//! contract state, so a migration staged during an invocation commits or
//! rolls back together with everything else that invocation wrote.
//!
//! The [`DeploymentConfig`] chosen at deploy time sits next to it and is
//! never rewritten.

use serde::{Deserialize, Serialize};

use crate::account::Address;
use crate::config::{
    DeploymentConfig, DEFAULT_CONTRACT_AUTHOR, DEFAULT_CONTRACT_DESCRIPTION, DEFAULT_CONTRACT_EMAIL,
    DEFAULT_CONTRACT_NAME, DEFAULT_CONTRACT_VERSION, DEFAULT_NEED_STORAGE,
    DEFAULT_PARAMETER_LIST, DEFAULT_RETURN_TYPE, DEPLOYED_CONTRACT_KEY, DEPLOYMENT_CONFIG_KEY,
    SYSTEM_NAMESPACE,
};
use crate::crypto::hash::script_hash;
use crate::storage::{StorageContext, StorageError, StorageResult};

/// Metadata supplied alongside contract code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractManifest {
    pub parameter_list: Vec<u8>,
    pub return_type: u8,
    pub need_storage: bool,
    pub name: String,
    pub version: String,
    pub author: String,
    pub email: String,
    pub description: String,
}

impl Default for ContractManifest {
    fn default() -> Self {
        Self {
            parameter_list: DEFAULT_PARAMETER_LIST.to_vec(),
            return_type: DEFAULT_RETURN_TYPE,
            need_storage: DEFAULT_NEED_STORAGE,
            name: DEFAULT_CONTRACT_NAME.to_string(),
            version: DEFAULT_CONTRACT_VERSION.to_string(),
            author: DEFAULT_CONTRACT_AUTHOR.to_string(),
            email: DEFAULT_CONTRACT_EMAIL.to_string(),
            description: DEFAULT_CONTRACT_DESCRIPTION.to_string(),
        }
    }
}

/// The currently deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub code: Vec<u8>,
    pub manifest: ContractManifest,
}

impl DeployedContract {
    pub fn new(code: Vec<u8>, manifest: ContractManifest) -> Self {
        Self { code, manifest }
    }

    /// The contract's identity.
    pub fn script_hash(&self) -> Address {
        script_hash(&self.code)
    }

    /// Read the deployment record through an invocation's storage view.
    pub fn load(storage: &StorageContext<'_>) -> StorageResult<Option<Self>> {
        match storage.get(SYSTEM_NAMESPACE, DEPLOYED_CONTRACT_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Stage this record as the deployed contract.
    pub fn store(&self, storage: &mut StorageContext<'_>) -> StorageResult<()> {
        let bytes =
            bincode::serialize(self).map_err(|e| StorageError::Serialization(e.to_string()))?;
        storage.put(SYSTEM_NAMESPACE, DEPLOYED_CONTRACT_KEY, bytes)
    }
}

/// Read the configuration fixed at deploy time.
pub fn load_config(storage: &StorageContext<'_>) -> StorageResult<Option<DeploymentConfig>> {
    match storage.get(SYSTEM_NAMESPACE, DEPLOYMENT_CONFIG_KEY)? {
        Some(bytes) => bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

/// Stage the deployment configuration.
pub fn store_config(
    storage: &mut StorageContext<'_>,
    config: &DeploymentConfig,
) -> StorageResult<()> {
    let bytes =
        bincode::serialize(config).map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.put(SYSTEM_NAMESPACE, DEPLOYMENT_CONFIG_KEY, bytes)
}
