// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Goods Protocol: Host Library
//!
//! Everything a ledger contract needs from the chain it runs on, and nothing
//! about any particular contract:
//!
//! - **account**: 20-byte script-hash addresses and their text forms.
//! - **crypto**: Ed25519 keys, BLAKE3 script hashes, verification scripts
//!   and witnesses.
//! - **auth**: The "did the caller sign as X?" capability.
//! - **storage**: Namespaced key-value storage with per-call overlays over
//!   memory or sled backends.
//! - **events**: Notifications and the sinks that receive them.
//! - **deployment**: The deployed contract record and its manifest.
//! - **params**: Invocation arguments and signing messages.
//! - **runtime**: Runs one call as one atomic invocation.
//! - **config**: Fixed constants and per-deployment settings.
//!
//! ## Guarantees
//!
//! 1. A call either commits every write it staged or none of them.
//! 2. Notifications leave the runtime only after their writes committed.
//! 3. Identifiers are exactly 20 bytes everywhere they are accepted.
//! 4. A signed message authorizes at most one committed call.

pub mod account;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod deployment;
pub mod events;
pub mod params;
pub mod runtime;
pub mod storage;

pub use account::Address;
pub use auth::{Authenticator, WitnessSet};
pub use config::DeploymentConfig;
pub use deployment::{ContractManifest, DeployedContract};
pub use events::{EventSink, MemorySink, Notification, NotifyArg, TracingSink};
pub use params::{Args, Argument, ArgumentError, InvocationRequest};
pub use runtime::{CallContext, HostError, Invocation, Runtime, Trigger};
pub use storage::{MemoryStore, SledStore, StorageContext, StorageError, Store};
