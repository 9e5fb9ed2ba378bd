//! Fixed-width identity and hash types
//!
//! `Address` identifies owners, wallets and token contracts; `H256` carries
//! digests and signature scalars. Both order by their big-endian byte value,
//! which is the order the signature verifier compares signer identities in.

use crate::core::hex::{decode_hex, pad_left, to_hex, WORD_SIZE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address width in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Errors raised when parsing hex identities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseHexError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// A 20-byte account identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// The all-zero address
    pub const ZERO: Address = Address([0u8; ADDRESS_SIZE]);

    pub fn from_bytes(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice that must be exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseHexError> {
        if bytes.len() != ADDRESS_SIZE {
            return Err(ParseHexError::InvalidLength {
                expected: ADDRESS_SIZE,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Take the trailing 20 bytes of a 32-byte word
    pub fn from_word(word: &[u8; WORD_SIZE]) -> Self {
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(&word[WORD_SIZE - ADDRESS_SIZE..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Address left-padded to a 32-byte word
    pub fn to_word(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - ADDRESS_SIZE..].copy_from_slice(&self.0);
        word
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }
}

impl FromStr for Address {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s).map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 32-byte hash or signature scalar
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct H256([u8; WORD_SIZE]);

impl H256 {
    /// Zero sentinel (e.g. "no recovery pending")
    pub const ZERO: H256 = H256([0u8; WORD_SIZE]);

    pub fn from_bytes(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build from a slice of at most 32 bytes, left-padding shorter input
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseHexError> {
        pad_left(bytes).map(Self).ok_or(ParseHexError::InvalidLength {
            expected: WORD_SIZE,
            actual: bytes.len(),
        })
    }

    pub fn as_bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_SIZE]
    }
}

impl FromStr for H256 {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s).map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
        if bytes.len() != WORD_SIZE {
            return Err(ParseHexError::InvalidLength {
                expected: WORD_SIZE,
                actual: bytes.len(),
            });
        }
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".parse().unwrap();
        assert_eq!(addr.to_string(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");

        // Prefix is optional, case is not significant
        let upper: Address = "7E5F4552091A69125D5DFCB7B8C2659029395BDF".parse().unwrap();
        assert_eq!(addr, upper);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(ParseHexError::InvalidLength { expected: 20, actual: 2 })
        ));
        assert!(matches!(
            "0xnothex".parse::<Address>(),
            Err(ParseHexError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_address_word_padding() {
        let addr = Address::from_bytes([0x11; 20]);
        let word = addr.to_word();
        assert!(word[..12].iter().all(|&b| b == 0));
        assert!(word[12..].iter().all(|&b| b == 0x11));
        assert_eq!(Address::from_word(&word), addr);
    }

    #[test]
    fn test_address_ordering_is_numeric() {
        let mut low = [0u8; 20];
        low[19] = 0xff;
        let mut high = [0u8; 20];
        high[0] = 0x01;

        assert!(Address::from_bytes(low) < Address::from_bytes(high));
        assert!(Address::ZERO < Address::from_bytes(low));
    }

    #[test]
    fn test_h256_zero_sentinel() {
        assert!(H256::ZERO.is_zero());
        assert_eq!(
            H256::ZERO.to_string(),
            format!("0x{}", "0".repeat(64))
        );
        assert!(!H256::from_slice(&[1]).unwrap().is_zero());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let addr = Address::from_bytes([0xab; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        assert!(serde_json::from_str::<Address>("\"0x12\"").is_err());
    }
}
