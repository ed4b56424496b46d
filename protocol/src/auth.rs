//! # Caller Authentication
//!
//! The ledger asks exactly one question of the host: "has the caller signed
//! as this account?" [`Authenticator`] is that question. The concrete answer
//! here, [`WitnessSet`], is the set of addresses whose witnesses verified
//! against the invocation's signing message before the call started.
//!
//! An authenticator built from real signatures also reports the message they
//! covered. The runtime records that message as consumed when the call
//! commits, so the same witnesses cannot authorize a second call.

use std::collections::BTreeSet;

use crate::account::Address;
use crate::crypto::witness::Witness;

/// Host capability reporting which accounts authorized the current call.
pub trait Authenticator {
    fn is_authorized_as(&self, account: &Address) -> bool;

    /// The message the accepted signatures cover, if authorization came from
    /// signatures at all.
    fn signed_message(&self) -> Option<&[u8]> {
        None
    }
}

impl<T: Authenticator + ?Sized> Authenticator for &T {
    fn is_authorized_as(&self, account: &Address) -> bool {
        (**self).is_authorized_as(account)
    }

    fn signed_message(&self) -> Option<&[u8]> {
        (**self).signed_message()
    }
}

/// Accounts that have authorized the current call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessSet {
    accounts: BTreeSet<Address>,
    message: Option<Vec<u8>>,
}

impl WitnessSet {
    /// A caller that has signed as nobody.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Trust the given accounts without checking signatures. For hosts that
    /// verified authorization elsewhere, and for tests.
    pub fn trusted<I: IntoIterator<Item = Address>>(accounts: I) -> Self {
        Self {
            accounts: accounts.into_iter().collect(),
            message: None,
        }
    }

    /// Verify every witness against `message` and keep the ones that pass.
    /// A failing witness is dropped, not an error: the call then simply
    /// lacks that account's authorization. The message is kept only when at
    /// least one witness passed.
    pub fn from_witnesses(message: &[u8], witnesses: &[Witness]) -> Self {
        let mut accounts = BTreeSet::new();
        for witness in witnesses {
            let address = witness.address();
            if witness.verify(message) {
                accounts.insert(address);
            } else {
                tracing::warn!(account = %address, "witness failed verification, ignoring");
            }
        }
        let message = (!accounts.is_empty()).then(|| message.to_vec());
        Self { accounts, message }
    }

    pub fn insert(&mut self, account: Address) {
        self.accounts.insert(account);
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Address> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Authenticator for WitnessSet {
    fn is_authorized_as(&self, account: &Address) -> bool {
        self.accounts.contains(account)
    }

    fn signed_message(&self) -> Option<&[u8]> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;
    use crate::crypto::witness::VerificationScript;

    #[test]
    fn empty_set_authorizes_nobody() {
        let set = WitnessSet::empty();
        assert!(!set.is_authorized_as(&Address::new([1u8; 20])));
        assert!(set.is_empty());
    }

    #[test]
    fn trusted_set_authorizes_listed_accounts_only() {
        let a = Address::new([1u8; 20]);
        let b = Address::new([2u8; 20]);
        let set = WitnessSet::trusted([a]);
        assert!(set.is_authorized_as(&a));
        assert!(!set.is_authorized_as(&b));
    }

    #[test]
    fn only_verified_witnesses_are_kept() {
        let alice = Keypair::from_seed(&[1u8; 32]);
        let mallory = Keypair::from_seed(&[2u8; 32]);
        let message = b"invocation";

        let good = Witness::new(
            VerificationScript::single(alice.public_key()),
            vec![alice.sign(message)],
        );
        // Mallory claims alice's script with her own signature.
        let forged = Witness::new(
            VerificationScript::single(alice.public_key()),
            vec![mallory.sign(message)],
        );
        let wrong_message = Witness::new(
            VerificationScript::single(mallory.public_key()),
            vec![mallory.sign(b"something else")],
        );

        let set = WitnessSet::from_witnesses(message, &[forged, wrong_message]);
        assert!(set.is_empty());
        assert_eq!(set.signed_message(), None);

        let set = WitnessSet::from_witnesses(message, &[good]);
        assert!(set.is_authorized_as(&alice.address()));
        assert!(!set.is_authorized_as(&mallory.address()));
        assert_eq!(set.signed_message(), Some(&message[..]));
    }

    #[test]
    fn trusted_set_carries_no_message() {
        let set = WitnessSet::trusted([Address::new([1u8; 20])]);
        assert_eq!(set.signed_message(), None);
    }

    #[test]
    fn authenticator_works_through_references() {
        let a = Address::new([5u8; 20]);
        let set = WitnessSet::trusted([a]);
        let as_dyn: &dyn Authenticator = &set;
        assert!((&as_dyn).is_authorized_as(&a));
    }
}
