//! # Notifications
//!
//! Contracts raise notifications while they run; the runtime hands them to an
//! [`EventSink`] only after the invocation's writes have committed. An aborted
//! invocation therefore never announces anything.
//!
//! The payload is deliberately untyped (`bytes` or `integer` per argument) so
//! the transport does not need to know any contract's event schema.

use num_bigint::BigInt;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::account::Address;

/// One positional argument of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NotifyArg {
    Bytes(#[serde(serialize_with = "serialize_hex")] Vec<u8>),
    Integer(#[serde(serialize_with = "serialize_decimal")] BigInt),
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn serialize_decimal<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

impl NotifyArg {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(i) => Some(i),
            Self::Bytes(_) => None,
        }
    }
}

impl From<Vec<u8>> for NotifyArg {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<BigInt> for NotifyArg {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

/// A named event raised by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Script hash of the contract that raised it.
    pub contract: Address,
    pub event: String,
    pub state: Vec<NotifyArg>,
}

/// Receiver of committed notifications.
pub trait EventSink: Send + Sync {
    fn publish(&self, notification: &Notification);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, notification: &Notification) {
        (**self).publish(notification)
    }
}

/// Writes each notification to the log at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, notification: &Notification) {
        let state = serde_json::to_string(&notification.state).unwrap_or_default();
        tracing::info!(
            contract = %notification.contract,
            event = %notification.event,
            state = %state,
            "notification"
        );
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    notifications: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }

    pub fn len(&self) -> usize {
        self.notifications.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
    }
}
