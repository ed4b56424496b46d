//! # Good Records
//!
//! A [`Good`] is written once, at initialization, and never changes. Its
//! stored form is a one-byte format version followed by the bincode body:
//!
//! ```text
//! [GOOD_RECORD_VERSION] ++ bincode(Good)
//! ```
//!
//! `total_supply` travels as little-endian two's-complement bytes in binary
//! formats and as a decimal string in JSON, so no precision is lost in
//! either.

use goods_protocol::account::Address;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use super::error::{GoodsError, GoodsResult};

/// Current on-disk layout of a [`Good`] record.
pub const GOOD_RECORD_VERSION: u8 = 1;

/// Every good is indivisible.
pub const GOOD_DECIMALS: u8 = 0;

/// One registered good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Good {
    /// Account that received the initial mint. Informational only.
    pub owner: Address,
    pub name: String,
    #[serde(with = "amount")]
    pub total_supply: BigInt,
    pub symbol: String,
    pub decimals: u8,
    pub desc: String,
}

impl Good {
    pub fn encode(&self) -> GoodsResult<Vec<u8>> {
        let body = bincode::serialize(self).map_err(|e| GoodsError::Codec(e.to_string()))?;
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(GOOD_RECORD_VERSION);
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> GoodsResult<Self> {
        match bytes.split_first() {
            Some((&GOOD_RECORD_VERSION, body)) => {
                bincode::deserialize(body).map_err(|e| GoodsError::Codec(e.to_string()))
            }
            Some((version, _)) => Err(GoodsError::Codec(format!(
                "unsupported good record version {version}"
            ))),
            None => Err(GoodsError::Codec("empty good record".to_string())),
        }
    }
}

/// Serde adapter for arbitrary-precision amounts.
pub(crate) mod amount {
    use goods_protocol::params::{integer_from_bytes, integer_to_bytes};
    use num_bigint::BigInt;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&value.to_string())
        } else {
            serializer.serialize_bytes(&integer_to_bytes(value))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            BigInt::from_str(&text).map_err(D::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Ok(integer_from_bytes(&bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold() -> Good {
        Good {
            owner: Address::new([0xaa; 20]),
            name: "gold".to_string(),
            total_supply: BigInt::from(1000),
            symbol: "GLD".to_string(),
            decimals: GOOD_DECIMALS,
            desc: "bullion".to_string(),
        }
    }

    #[test]
    fn record_roundtrip() {
        let good = gold();
        let bytes = good.encode().unwrap();
        assert_eq!(bytes[0], GOOD_RECORD_VERSION);
        assert_eq!(Good::decode(&bytes).unwrap(), good);
    }

    #[test]
    fn supply_beyond_u128_survives() {
        let mut good = gold();
        good.total_supply = BigInt::from(u128::MAX) * BigInt::from(u128::MAX);
        let decoded = Good::decode(&good.encode().unwrap()).unwrap();
        assert_eq!(decoded.total_supply, good.total_supply);
    }

    #[test]
    fn decode_failures_are_errors() {
        assert!(matches!(Good::decode(&[]), Err(GoodsError::Codec(_))));
        assert!(matches!(Good::decode(&[9, 1, 2]), Err(GoodsError::Codec(_))));
        assert!(matches!(
            Good::decode(&[GOOD_RECORD_VERSION, 0xff]),
            Err(GoodsError::Codec(_))
        ));
    }

    #[test]
    fn json_uses_base58_owner_and_decimal_supply() {
        let json = serde_json::to_value(gold()).unwrap();
        assert_eq!(json["total_supply"], "1000");
        assert_eq!(json["owner"], Address::new([0xaa; 20]).to_base58());

        let back: Good = serde_json::from_value(json).unwrap();
        assert_eq!(back, gold());
    }
}
