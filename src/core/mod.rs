//! Shared primitives
//!
//! This module contains the building blocks every other layer speaks in:
//! - Fixed-width identities and hashes (`Address`, `H256`)
//! - Hex parsing and 32-byte word padding

pub mod hex;
pub mod types;

pub use self::hex::{
    decode_hex, pad_left, strip_hex, to_hex, u128_word, u64_word, word_to_u128, WORD_SIZE,
};
pub use types::{Address, ParseHexError, ADDRESS_SIZE, H256};
