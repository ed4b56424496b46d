//! Typed goods events and their notification encoding.
//!
//! | event           | state                                             |
//! |-----------------|---------------------------------------------------|
//! | `goodsInit`     | owner, name, symbol, desc, total supply           |
//! | `goodsTransfer` | name, from, to, amount                            |
//!
//! Names and texts are UTF-8 bytes. An absent `from` (mint) or `to` is the
//! empty byte string.

use goods_protocol::account::Address;
use goods_protocol::events::{Notification, NotifyArg};
use goods_protocol::runtime::Invocation;
use num_bigint::BigInt;

pub const INIT_EVENT: &str = "goodsInit";
pub const TRANSFER_EVENT: &str = "goodsTransfer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoodsEvent {
    Init {
        owner: Address,
        name: String,
        symbol: String,
        desc: String,
        total_supply: BigInt,
    },
    Transfer {
        name: String,
        from: Option<Address>,
        to: Option<Address>,
        amount: BigInt,
    },
}

impl GoodsEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Init { .. } => INIT_EVENT,
            Self::Transfer { .. } => TRANSFER_EVENT,
        }
    }

    pub fn to_state(&self) -> Vec<NotifyArg> {
        match self {
            Self::Init {
                owner,
                name,
                symbol,
                desc,
                total_supply,
            } => vec![
                NotifyArg::Bytes(owner.to_vec()),
                NotifyArg::Bytes(name.as_bytes().to_vec()),
                NotifyArg::Bytes(symbol.as_bytes().to_vec()),
                NotifyArg::Bytes(desc.as_bytes().to_vec()),
                NotifyArg::Integer(total_supply.clone()),
            ],
            Self::Transfer {
                name,
                from,
                to,
                amount,
            } => vec![
                NotifyArg::Bytes(name.as_bytes().to_vec()),
                NotifyArg::Bytes(optional_address(from)),
                NotifyArg::Bytes(optional_address(to)),
                NotifyArg::Integer(amount.clone()),
            ],
        }
    }

    /// Queue this event on the running invocation.
    pub fn emit(&self, inv: &mut Invocation<'_>) {
        inv.notify(self.event_name(), self.to_state());
    }

    /// Decode a published notification. `None` for other events or for a
    /// payload that does not have this contract's shape.
    pub fn from_notification(notification: &Notification) -> Option<Self> {
        let state = &notification.state;
        match (notification.event.as_str(), state.as_slice()) {
            (INIT_EVENT, [owner, name, symbol, desc, supply]) => Some(Self::Init {
                owner: Address::from_slice(owner.as_bytes()?).ok()?,
                name: text(name)?,
                symbol: text(symbol)?,
                desc: text(desc)?,
                total_supply: supply.as_integer()?.clone(),
            }),
            (TRANSFER_EVENT, [name, from, to, amount]) => Some(Self::Transfer {
                name: text(name)?,
                from: decode_optional_address(from)?,
                to: decode_optional_address(to)?,
                amount: amount.as_integer()?.clone(),
            }),
            _ => None,
        }
    }
}

fn optional_address(address: &Option<Address>) -> Vec<u8> {
    address.map(|a| a.to_vec()).unwrap_or_default()
}

fn text(arg: &NotifyArg) -> Option<String> {
    String::from_utf8(arg.as_bytes()?.to_vec()).ok()
}

/// Empty bytes decode to `Some(None)`; a malformed address to `None`.
fn decode_optional_address(arg: &NotifyArg) -> Option<Option<Address>> {
    let bytes = arg.as_bytes()?;
    if bytes.is_empty() {
        return Some(None);
    }
    Address::from_slice(bytes).ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(event: GoodsEvent) -> Notification {
        Notification {
            contract: Address::new([0xcc; 20]),
            event: event.event_name().to_string(),
            state: event.to_state(),
        }
    }

    #[test]
    fn mint_transfer_has_empty_origin() {
        let event = GoodsEvent::Transfer {
            name: "gold".into(),
            from: None,
            to: Some(Address::new([1u8; 20])),
            amount: BigInt::from(1000),
        };
        let state = event.to_state();
        assert_eq!(state[0], NotifyArg::Bytes(b"gold".to_vec()));
        assert_eq!(state[1], NotifyArg::Bytes(Vec::new()));
        assert_eq!(state[2], NotifyArg::Bytes(vec![1u8; 20]));

        assert_eq!(GoodsEvent::from_notification(&notification(event.clone())), Some(event));
    }

    #[test]
    fn init_event_decodes() {
        let event = GoodsEvent::Init {
            owner: Address::new([5u8; 20]),
            name: "gold".into(),
            symbol: "GLD".into(),
            desc: "bullion".into(),
            total_supply: BigInt::from(1000),
        };
        assert_eq!(event.event_name(), "goodsInit");
        assert_eq!(GoodsEvent::from_notification(&notification(event.clone())), Some(event));
    }

    #[test]
    fn foreign_or_malformed_notifications_are_ignored() {
        let foreign = Notification {
            contract: Address::new([0; 20]),
            event: "somethingElse".into(),
            state: vec![],
        };
        assert_eq!(GoodsEvent::from_notification(&foreign), None);

        let truncated = Notification {
            contract: Address::new([0; 20]),
            event: TRANSFER_EVENT.into(),
            state: vec![NotifyArg::Bytes(b"gold".to_vec())],
        };
        assert_eq!(GoodsEvent::from_notification(&truncated), None);

        let bad_address = Notification {
            contract: Address::new([0; 20]),
            event: TRANSFER_EVENT.into(),
            state: vec![
                NotifyArg::Bytes(b"gold".to_vec()),
                NotifyArg::Bytes(vec![1, 2, 3]),
                NotifyArg::Bytes(Vec::new()),
                NotifyArg::Integer(BigInt::from(1)),
            ],
        };
        assert_eq!(GoodsEvent::from_notification(&bad_address), None);
    }
}
