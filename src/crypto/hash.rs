//! Keccak-256 hashing utilities
//!
//! Provides the digest used for message commitments, owner-list commitments,
//! address derivation and ABI method selectors.

use crate::core::H256;
use sha3::{Digest, Keccak256};

/// Computes Keccak-256 of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let hash = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    H256::from_bytes(out)
}

/// Computes Keccak-256 over several byte slices as if they were concatenated
pub fn keccak256_concat(parts: &[&[u8]]) -> H256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let hash = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    H256::from_bytes(out)
}

/// Computes Keccak-256 and returns it as a `0x`-prefixed hex string
pub fn keccak256_hex(data: &[u8]) -> String {
    keccak256(data).to_string()
}
