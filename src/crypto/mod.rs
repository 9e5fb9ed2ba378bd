//! Cryptographic utilities for the wallet
//!
//! This module provides:
//! - Keccak-256 hashing
//! - ECDSA key management (secp256k1)
//! - Recoverable personal-message signatures

pub mod hash;
pub mod keys;
pub mod signature;

pub use hash::{keccak256, keccak256_concat, keccak256_hex};
pub use keys::{public_key_to_address, KeyError, KeyPair};
pub use signature::{
    personal_message_hash, recover_signer, sign_digest, Signature, PERSONAL_MESSAGE_PREFIX,
};
