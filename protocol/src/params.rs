//! # Invocation Parameters
//!
//! Callers reach a contract with an operation name and a list of loosely
//! typed [`Argument`]s. Contracts read them back through [`Args`], which
//! applies the usual stack-item coercions:
//!
//! | wanted  | accepts                                                    |
//! |---------|------------------------------------------------------------|
//! | string  | string, UTF-8 bytes                                        |
//! | bytes   | bytes, string (UTF-8), integer (LE two's complement), bool |
//! | integer | integer, bytes (LE two's complement), bool                 |
//! | boolean | boolean, integer (non-zero), bytes (any non-zero byte)     |
//!
//! Anything else is an [`ArgumentError`], which contracts surface as a
//! raised failure.

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::account::Address;
use crate::crypto::hash::blake3_hash;

/// Domain separator for invocation signing messages.
const SIGNING_DOMAIN: &[u8] = b"goods-invocation-v1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("operation `{operation}` is missing argument {index}")]
    Missing { operation: String, index: usize },

    #[error("argument {index}: expected {expected}, got {found}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("argument {index}: bytes are not valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("argument {index}: integer {value} does not fit a {expected}")]
    OutOfRange {
        index: usize,
        value: BigInt,
        expected: &'static str,
    },

    #[error("cannot parse argument `{0}`: use str:, int:, hex:, addr: or bool:")]
    Unparseable(String),
}

/// One positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    String(String),
    Bytes(Vec<u8>),
    Integer(BigInt),
    Boolean(bool),
}

impl Argument {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::String(_) => 0x01,
            Self::Bytes(_) => 0x02,
            Self::Integer(_) => 0x03,
            Self::Boolean(_) => 0x04,
        }
    }

    /// Canonical bytes used in the signing message.
    fn payload(&self) -> Vec<u8> {
        match self {
            Self::String(s) => s.as_bytes().to_vec(),
            Self::Bytes(b) => b.clone(),
            Self::Integer(i) => integer_to_bytes(i),
            Self::Boolean(b) => vec![u8::from(*b)],
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Argument {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Address> for Argument {
    fn from(a: Address) -> Self {
        Self::Bytes(a.to_vec())
    }
}

impl From<BigInt> for Argument {
    fn from(i: BigInt) -> Self {
        Self::Integer(i)
    }
}

impl From<i64> for Argument {
    fn from(i: i64) -> Self {
        Self::Integer(BigInt::from(i))
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl FromStr for Argument {
    type Err = ArgumentError;

    /// Typed text form used on the command line: `str:gold`, `int:1000`,
    /// `hex:0a0b`, `addr:<base58 or hex>`, `bool:true`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || ArgumentError::Unparseable(s.to_string());
        let (kind, value) = s.split_once(':').ok_or_else(unparseable)?;
        match kind {
            "str" | "string" => Ok(Self::String(value.to_string())),
            "int" | "integer" => BigInt::from_str(value)
                .map(Self::Integer)
                .map_err(|_| unparseable()),
            "hex" | "bytes" => hex::decode(value.strip_prefix("0x").unwrap_or(value))
                .map(Self::Bytes)
                .map_err(|_| unparseable()),
            "addr" | "address" => value
                .parse::<Address>()
                .map(Self::from)
                .map_err(|_| unparseable()),
            "bool" | "boolean" => value
                .parse::<bool>()
                .map(Self::Boolean)
                .map_err(|_| unparseable()),
            _ => Err(unparseable()),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "str:{s}"),
            Self::Bytes(b) => write!(f, "hex:{}", hex::encode(b)),
            Self::Integer(i) => write!(f, "int:{i}"),
            Self::Boolean(b) => write!(f, "bool:{b}"),
        }
    }
}

/// Little-endian two's-complement encoding; zero is the empty byte string.
pub fn integer_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_signed_bytes_le()
    }
}

/// Inverse of [`integer_to_bytes`]. Empty input reads as zero.
pub fn integer_from_bytes(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        BigInt::zero()
    } else {
        BigInt::from_signed_bytes_le(bytes)
    }
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

/// Positional accessor over an operation's arguments.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    operation: &'a str,
    args: &'a [Argument],
}

impl<'a> Args<'a> {
    pub fn new(operation: &'a str, args: &'a [Argument]) -> Self {
        Self { operation, args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    fn get(&self, index: usize) -> Result<&'a Argument, ArgumentError> {
        self.args.get(index).ok_or_else(|| ArgumentError::Missing {
            operation: self.operation.to_string(),
            index,
        })
    }

    pub fn string(&self, index: usize) -> Result<String, ArgumentError> {
        match self.get(index)? {
            Argument::String(s) => Ok(s.clone()),
            Argument::Bytes(b) => {
                String::from_utf8(b.clone()).map_err(|_| ArgumentError::InvalidUtf8 { index })
            }
            other => Err(mismatch(index, "string", other)),
        }
    }

    pub fn bytes(&self, index: usize) -> Result<Vec<u8>, ArgumentError> {
        match self.get(index)? {
            Argument::Boolean(false) => Ok(Vec::new()),
            other => Ok(other.payload()),
        }
    }

    pub fn integer(&self, index: usize) -> Result<BigInt, ArgumentError> {
        match self.get(index)? {
            Argument::Integer(i) => Ok(i.clone()),
            Argument::Bytes(b) => Ok(integer_from_bytes(b)),
            Argument::Boolean(b) => Ok(BigInt::from(u8::from(*b))),
            other => Err(mismatch(index, "integer", other)),
        }
    }

    pub fn boolean(&self, index: usize) -> Result<bool, ArgumentError> {
        match self.get(index)? {
            Argument::Boolean(b) => Ok(*b),
            Argument::Integer(i) => Ok(!i.is_zero()),
            Argument::Bytes(b) => Ok(b.iter().any(|&x| x != 0)),
            other => Err(mismatch(index, "boolean", other)),
        }
    }

    pub fn byte(&self, index: usize) -> Result<u8, ArgumentError> {
        let value = self.integer(index)?;
        value.to_u8().ok_or(ArgumentError::OutOfRange {
            index,
            value,
            expected: "byte",
        })
    }
}

fn mismatch(index: usize, expected: &'static str, found: &Argument) -> ArgumentError {
    ArgumentError::TypeMismatch {
        index,
        expected,
        found: found.kind(),
    }
}

// ---------------------------------------------------------------------------
// InvocationRequest
// ---------------------------------------------------------------------------

/// What a caller asks the contract to do.
///
/// `nonce` only makes otherwise identical requests sign differently. The
/// runtime refuses a signed message it has already committed, so a caller
/// repeating a request on purpose picks a new nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub operation: String,
    pub args: Vec<Argument>,
    pub nonce: u64,
}

impl InvocationRequest {
    pub fn new(operation: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            operation: operation.into(),
            args,
            nonce: 0,
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Same request under a random nonce.
    pub fn with_random_nonce(self) -> Self {
        self.with_nonce(rand::random())
    }

    pub fn args(&self) -> Args<'_> {
        Args::new(&self.operation, &self.args)
    }

    /// The 32-byte message witnesses sign for this request against
    /// `contract`. It covers the contract hash, the nonce, the operation and
    /// every argument.
    pub fn signing_message(&self, contract: &Address) -> [u8; 32] {
        let mut buf = Vec::new();
        buf.extend_from_slice(SIGNING_DOMAIN);
        buf.extend_from_slice(contract.as_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        push_len_prefixed(&mut buf, self.operation.as_bytes());
        buf.extend_from_slice(&(self.args.len() as u32).to_le_bytes());
        for arg in &self.args {
            buf.push(arg.tag());
            push_len_prefixed(&mut buf, &arg.payload());
        }
        blake3_hash(&buf)
    }
}

fn push_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Sign of a parsed integer, for callers that validate positivity.
pub fn is_positive(value: &BigInt) -> bool {
    value.sign() == Sign::Plus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_typed_cli_arguments() {
        assert_eq!(
            "str:gold".parse::<Argument>().unwrap(),
            Argument::String("gold".into())
        );
        assert_eq!(
            "int:-42".parse::<Argument>().unwrap(),
            Argument::Integer(BigInt::from(-42))
        );
        assert_eq!(
            "hex:0x0a0b".parse::<Argument>().unwrap(),
            Argument::Bytes(vec![0x0a, 0x0b])
        );
        assert_eq!(
            "bool:true".parse::<Argument>().unwrap(),
            Argument::Boolean(true)
        );

        let addr = Address::new([4u8; 20]);
        assert_eq!(
            format!("addr:{addr}").parse::<Argument>().unwrap(),
            Argument::Bytes(addr.to_vec())
        );
    }

    #[test]
    fn string_values_may_contain_colons() {
        assert_eq!(
            "str:a:b".parse::<Argument>().unwrap(),
            Argument::String("a:b".into())
        );
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert!("gold".parse::<Argument>().is_err());
        assert!("float:1.5".parse::<Argument>().is_err());
        assert!("int:abc".parse::<Argument>().is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for arg in [
            Argument::from("gold"),
            Argument::from(1000i64),
            Argument::from(vec![1u8, 2, 3]),
            Argument::from(false),
        ] {
            assert_eq!(arg.to_string().parse::<Argument>().unwrap(), arg);
        }
    }

    #[test]
    fn integer_bytes_encoding_is_little_endian_twos_complement() {
        assert!(integer_to_bytes(&BigInt::zero()).is_empty());
        assert_eq!(integer_to_bytes(&BigInt::from(1000)), vec![0xe8, 0x03]);
        assert_eq!(integer_to_bytes(&BigInt::from(-1)), vec![0xff]);
        assert_eq!(integer_to_bytes(&BigInt::from(128)), vec![0x80, 0x00]);
        assert_eq!(integer_from_bytes(&[]), BigInt::zero());
        assert_eq!(integer_from_bytes(&[0x80, 0x00]), BigInt::from(128));
    }

    #[test]
    fn coercions_follow_the_table() {
        let args = vec![
            Argument::Bytes(b"gold".to_vec()),
            Argument::String("GLD".into()),
            Argument::Bytes(vec![0xe8, 0x03]),
            Argument::Integer(BigInt::from(0)),
            Argument::Boolean(true),
        ];
        let a = Args::new("test", &args);

        assert_eq!(a.string(0).unwrap(), "gold");
        assert_eq!(a.bytes(1).unwrap(), b"GLD".to_vec());
        assert_eq!(a.integer(2).unwrap(), BigInt::from(1000));
        assert!(!a.boolean(3).unwrap());
        assert_eq!(a.integer(4).unwrap(), BigInt::from(1));
        assert_eq!(a.byte(3).unwrap(), 0);
    }

    #[test]
    fn missing_and_mismatched_arguments_are_errors() {
        let args = vec![Argument::String("x".into()), Argument::Integer(BigInt::from(300))];
        let a = Args::new("balanceOf", &args);

        assert!(matches!(
            a.string(2),
            Err(ArgumentError::Missing { index: 2, .. })
        ));
        assert!(matches!(
            a.integer(0),
            Err(ArgumentError::TypeMismatch { expected: "integer", .. })
        ));
        assert!(matches!(a.byte(1), Err(ArgumentError::OutOfRange { .. })));
        assert!(matches!(
            Args::new("x", &[Argument::Bytes(vec![0xff, 0xfe])]).string(0),
            Err(ArgumentError::InvalidUtf8 { index: 0 })
        ));
    }

    #[test]
    fn signing_message_binds_contract_nonce_operation_and_args() {
        let contract = Address::new([1u8; 20]);
        let other = Address::new([2u8; 20]);
        let req = InvocationRequest::new("transfer", vec![Argument::from("gold")]);

        let base = req.signing_message(&contract);
        assert_eq!(base, req.signing_message(&contract));
        assert_ne!(base, req.signing_message(&other));

        let renamed = InvocationRequest::new("init", vec![Argument::from("gold")]);
        assert_ne!(base, renamed.signing_message(&contract));

        // Same payload bytes, different type.
        let as_bytes = InvocationRequest::new("transfer", vec![Argument::from(b"gold".to_vec())]);
        assert_ne!(base, as_bytes.signing_message(&contract));

        let renonced = req.clone().with_nonce(1);
        assert_ne!(base, renonced.signing_message(&contract));
    }

    #[test]
    fn positivity_check() {
        assert!(is_positive(&BigInt::from(1)));
        assert!(!is_positive(&BigInt::from(0)));
        assert!(!is_positive(&BigInt::from(-1)));
    }
}
