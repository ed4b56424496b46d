//! Operation names and call results.

use num_bigint::BigInt;
use serde::{Serialize, Serializer};
use std::fmt;

use super::types::Good;

/// Every operation the contract answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    TotalSupply,
    Name,
    Symbol,
    Decimals,
    Desc,
    BalanceOf,
    GetGoodInfo,
    Transfer,
    Init,
    SetAccount,
    GetAccount,
    Upgrade,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Self::TotalSupply,
        Self::Name,
        Self::Symbol,
        Self::Decimals,
        Self::Desc,
        Self::BalanceOf,
        Self::GetGoodInfo,
        Self::Transfer,
        Self::Init,
        Self::SetAccount,
        Self::GetAccount,
        Self::Upgrade,
    ];

    /// Case-sensitive lookup by wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalSupply => "totalSupply",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Decimals => "decimals",
            Self::Desc => "desc",
            Self::BalanceOf => "balanceOf",
            Self::GetGoodInfo => "getGoodInfo",
            Self::Transfer => "transfer",
            Self::Init => "init",
            Self::SetAccount => "setAccount",
            Self::GetAccount => "getAccount",
            Self::Upgrade => "upgrade",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an operation returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum InvokeResult {
    Boolean(bool),
    Integer(#[serde(serialize_with = "decimal")] BigInt),
    String(String),
    Bytes(#[serde(serialize_with = "hex_string")] Vec<u8>),
    /// `getGoodInfo`; `None` when the good is unknown.
    Good(Option<Good>),
}

impl InvokeResult {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Self::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_good(&self) -> Option<Option<&Good>> {
        match self {
            Self::Good(g) => Some(g.as_ref()),
            _ => None,
        }
    }
}

fn decimal<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn hex_string<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}
