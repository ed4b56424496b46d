//! # Cryptographic Primitives
//!
//! Everything the host needs to answer "has this caller signed as X":
//!
//! - **Ed25519** keys and signatures (`ed25519-dalek`).
//! - **BLAKE3** for script hashes and signing messages.
//! - **Verification scripts and witnesses** for single-key and multi-party
//!   accounts.
//!
//! The ledger itself never touches these types. It only sees the
//! [`Authenticator`](crate::auth::Authenticator) answer.

pub mod hash;
pub mod keys;
pub mod witness;

pub use hash::{blake3_hash, script_hash};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
pub use witness::{VerificationScript, Witness, WitnessError};
