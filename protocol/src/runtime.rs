//! # Contract Runtime
//!
//! [`Runtime`] owns the store and the notification sink, and runs each
//! contract call as one all-or-nothing [`Invocation`]:
//!
//! 1. A fresh [`StorageContext`] overlays the store, and the deployment
//!    record and configuration are read from it.
//! 2. A signed call stages its message digest as consumed. A digest that is
//!    already recorded fails the call with [`HostError::Replayed`].
//! 3. The contract reads and stages writes through the invocation, raising
//!    notifications as it goes.
//! 4. `Ok` commits the staged writes as one batch and then publishes the
//!    notifications. `Err` drops both, including the consumed digest.
//!
//! Invocations are serialized by an internal lock so that two calls never
//! interleave their read-modify-write sequences.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

use crate::account::Address;
use crate::auth::Authenticator;
use crate::config::{DeploymentConfig, CONSUMED_MESSAGE_PREFIX, SYSTEM_NAMESPACE};
use crate::crypto::hash::blake3_hash;
use crate::deployment::{self, DeployedContract};
use crate::events::{EventSink, Notification, NotifyArg};
use crate::storage::{StorageContext, StorageError, Store};

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no contract is deployed")]
    NotDeployed,

    #[error("a contract is already deployed as {0}")]
    AlreadyDeployed(Address),

    #[error("contract code must not be empty")]
    EmptyCode,

    #[error("signed message {0} was already used")]
    Replayed(String),
}

/// Why the contract is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A normal call that may change state.
    Application,
    /// A spend-authorization query against the contract's own account.
    Verification,
}

/// Caller-supplied facts about one call.
#[derive(Clone, Copy)]
pub struct CallContext<'a> {
    pub trigger: Trigger,
    pub authenticator: &'a dyn Authenticator,
    /// Script hash of the contract that made this call, if any.
    pub calling_contract: Option<Address>,
}

impl<'a> CallContext<'a> {
    pub fn application(authenticator: &'a dyn Authenticator) -> Self {
        Self {
            trigger: Trigger::Application,
            authenticator,
            calling_contract: None,
        }
    }

    pub fn verification(authenticator: &'a dyn Authenticator) -> Self {
        Self {
            trigger: Trigger::Verification,
            authenticator,
            calling_contract: None,
        }
    }

    pub fn with_calling_contract(mut self, caller: Address) -> Self {
        self.calling_contract = Some(caller);
        self
    }
}

/// Everything a contract can see and do during one call.
pub struct Invocation<'a> {
    trigger: Trigger,
    storage: StorageContext<'a>,
    authenticator: &'a dyn Authenticator,
    calling_contract: Option<Address>,
    executing_contract: Address,
    config: DeploymentConfig,
    notifications: Vec<Notification>,
}

impl<'a> Invocation<'a> {
    /// Open a call on `store`. Fails when nothing is deployed.
    fn open(store: &'a dyn Store, ctx: CallContext<'a>) -> Result<Self, HostError> {
        let storage = StorageContext::new(store);
        let executing_contract = DeployedContract::load(&storage)?
            .ok_or(HostError::NotDeployed)?
            .script_hash();
        let config = deployment::load_config(&storage)?.ok_or(HostError::NotDeployed)?;
        Ok(Self {
            trigger: ctx.trigger,
            storage,
            authenticator: ctx.authenticator,
            calling_contract: ctx.calling_contract,
            executing_contract,
            config,
            notifications: Vec::new(),
        })
    }

    /// Record the authenticator's signed message as used.
    fn consume_signed_message(&mut self) -> Result<(), HostError> {
        let digest = match self.authenticator.signed_message() {
            Some(message) => blake3_hash(message),
            None => return Ok(()),
        };
        let mut key = CONSUMED_MESSAGE_PREFIX.to_vec();
        key.extend_from_slice(&digest);

        if self.storage.get(SYSTEM_NAMESPACE, &key)?.is_some() {
            let digest = hex::encode(digest);
            tracing::warn!(contract = %self.executing_contract, %digest, "replayed signed message refused");
            return Err(HostError::Replayed(digest));
        }
        self.storage.put(SYSTEM_NAMESPACE, &key, vec![1])?;
        Ok(())
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Has the caller authorized as `account`?
    pub fn check_witness(&self, account: &Address) -> bool {
        self.authenticator.is_authorized_as(account)
    }

    pub fn calling_contract(&self) -> Option<&Address> {
        self.calling_contract.as_ref()
    }

    /// Script hash of the contract as deployed when the call started.
    pub fn executing_contract(&self) -> &Address {
        &self.executing_contract
    }

    /// Configuration fixed when the contract was deployed.
    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn get(&self, namespace: &str, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.storage.get(namespace, key)?)
    }

    pub fn put(&mut self, namespace: &str, key: &[u8], value: Vec<u8>) -> Result<(), HostError> {
        Ok(self.storage.put(namespace, key, value)?)
    }

    pub fn delete(&mut self, namespace: &str, key: &[u8]) -> Result<(), HostError> {
        Ok(self.storage.delete(namespace, key)?)
    }

    /// Queue a notification. It is published only if the call commits.
    pub fn notify(&mut self, event: impl Into<String>, state: Vec<NotifyArg>) {
        self.notifications.push(Notification {
            contract: self.executing_contract,
            event: event.into(),
            state,
        });
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// The deployment record as seen by this call, including a migration
    /// staged earlier in it.
    pub fn deployed_contract(&self) -> Result<DeployedContract, HostError> {
        DeployedContract::load(&self.storage)?.ok_or(HostError::NotDeployed)
    }

    /// Stage replacement of the deployed contract. Storage is kept as is.
    pub fn migrate(&mut self, replacement: DeployedContract) -> Result<(), HostError> {
        if replacement.code.is_empty() {
            return Err(HostError::EmptyCode);
        }
        replacement.store(&mut self.storage)?;
        Ok(())
    }
}

/// Host for a single deployed contract.
pub struct Runtime<S: Store> {
    store: S,
    sink: Arc<dyn EventSink>,
    exec_lock: Mutex<()>,
}

impl<S: Store> Runtime<S> {
    pub fn new(store: S, sink: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            sink,
            exec_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Install the first contract together with its configuration. Returns
    /// the contract's script hash.
    pub fn deploy(
        &self,
        contract: DeployedContract,
        config: &DeploymentConfig,
    ) -> Result<Address, HostError> {
        if contract.code.is_empty() {
            return Err(HostError::EmptyCode);
        }
        let _guard = self.exec_lock.lock();
        let mut storage = StorageContext::new(&self.store);
        if let Some(existing) = DeployedContract::load(&storage)? {
            return Err(HostError::AlreadyDeployed(existing.script_hash()));
        }
        contract.store(&mut storage)?;
        deployment::store_config(&mut storage, config)?;
        self.store.commit(storage.into_changes())?;

        let hash = contract.script_hash();
        tracing::info!(
            contract = %hash,
            name = %contract.manifest.name,
            fallback_admin = %config.fallback_admin,
            "contract deployed"
        );
        Ok(hash)
    }

    pub fn deployed(&self) -> Result<Option<DeployedContract>, HostError> {
        Ok(DeployedContract::load(&StorageContext::new(&self.store))?)
    }

    /// Configuration stored by [`Runtime::deploy`].
    pub fn deployment_config(&self) -> Result<Option<DeploymentConfig>, HostError> {
        Ok(deployment::load_config(&StorageContext::new(&self.store))?)
    }

    /// Run `call` as one atomic invocation of the deployed contract.
    pub fn invoke<T, E, F>(&self, ctx: CallContext<'_>, call: F) -> Result<T, E>
    where
        F: FnOnce(&mut Invocation<'_>) -> Result<T, E>,
        E: From<HostError>,
    {
        let _guard = self.exec_lock.lock();
        let mut invocation = Invocation::open(&self.store, ctx)?;
        let executing = invocation.executing_contract;
        invocation.consume_signed_message()?;
        let outcome = call(&mut invocation);

        let Invocation {
            storage,
            notifications,
            ..
        } = invocation;

        match outcome {
            Ok(value) => {
                let writes = storage.pending_writes();
                self.store
                    .commit(storage.into_changes())
                    .map_err(HostError::from)?;
                for notification in &notifications {
                    self.sink.publish(notification);
                }
                tracing::debug!(
                    contract = %executing,
                    writes,
                    notifications = notifications.len(),
                    "invocation committed"
                );
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(
                    contract = %executing,
                    discarded = storage.pending_writes(),
                    "invocation aborted, writes discarded"
                );
                Err(e)
            }
        }
    }
}
