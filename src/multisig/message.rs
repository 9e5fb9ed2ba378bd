//! Canonical message encoding
//!
//! Layout of an action message:
//!
//! ```text
//! pad32(wallet) || pad32(nonce) || pad32(destination) || pad32(value) || payload
//! ```
//!
//! The ownership-transfer message replaces everything after the nonce with
//! the padded new owners. Every signer and the verifier must produce the
//! same bytes, so nothing here may depend on local state.

use crate::core::{u128_word, u64_word, Address, H256, WORD_SIZE};
use crate::crypto::keccak256;
use serde::{Deserialize, Serialize};

/// An action awaiting authorization for one nonce
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub nonce: u64,
    pub destination: Address,
    pub value: u128,
    pub payload: Vec<u8>,
}

impl PendingAction {
    pub fn new(nonce: u64, destination: Address, value: u128, payload: Vec<u8>) -> Self {
        Self {
            nonce,
            destination,
            value,
            payload,
        }
    }

    /// Canonical bytes of this action for the given wallet
    pub fn encode(&self, wallet: &Address) -> Vec<u8> {
        encode(wallet, self.nonce, &self.destination, self.value, &self.payload)
    }

    /// Digest every owner signs for this action
    pub fn digest(&self, wallet: &Address) -> H256 {
        digest(&self.encode(wallet))
    }
}

/// Encode an action message
pub fn encode(
    wallet: &Address,
    nonce: u64,
    destination: &Address,
    value: u128,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 * WORD_SIZE + payload.len());
    out.extend_from_slice(&wallet.to_word());
    out.extend_from_slice(&u64_word(nonce));
    out.extend_from_slice(&destination.to_word());
    out.extend_from_slice(&u128_word(value));
    out.extend_from_slice(payload);
    out
}

/// Encode an ownership-transfer message
pub fn encode_ownership(wallet: &Address, nonce: u64, new_owners: &[Address]) -> Vec<u8> {
    let mut out = Vec::with_capacity((2 + new_owners.len()) * WORD_SIZE);
    out.extend_from_slice(&wallet.to_word());
    out.extend_from_slice(&u64_word(nonce));
    out.extend_from_slice(&concat_owners(new_owners));
    out
}

/// Concatenate owners as 32-byte words
pub fn concat_owners(owners: &[Address]) -> Vec<u8> {
    owners.iter().flat_map(|owner| owner.to_word()).collect()
}

/// Commitment over an owner list, as stored by a pending recovery
pub fn hash_owners(owners: &[Address]) -> H256 {
    keccak256(&concat_owners(owners))
}

/// Digest of an encoded message
pub fn digest(encoded: &[u8]) -> H256 {
    keccak256(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn test_encode_layout() {
        let encoded = encode(&addr(0xaa), 7, &addr(0xbb), 500, &[0xde, 0xad, 0xbe]);

        assert_eq!(encoded.len(), 4 * 32 + 3);
        assert_eq!(&encoded[..32], &addr(0xaa).to_word());
        assert_eq!(&encoded[32..64], &u64_word(7));
        assert_eq!(&encoded[64..96], &addr(0xbb).to_word());
        assert_eq!(&encoded[96..128], &u128_word(500));
        // Payload is appended raw, no padding
        assert_eq!(&encoded[128..], &[0xde, 0xad, 0xbe]);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let action = PendingAction::new(3, addr(2), 10, vec![1, 2, 3]);
        assert_eq!(action.digest(&addr(1)), action.digest(&addr(1)));
        assert_eq!(
            action.digest(&addr(1)),
            PendingAction::new(3, addr(2), 10, vec![1, 2, 3]).digest(&addr(1))
        );
    }

    #[test]
    fn test_digest_sensitive_to_every_field() {
        let wallet = addr(1);
        let base = PendingAction::new(3, addr(2), 10, vec![1, 2, 3]);
        let base_digest = base.digest(&wallet);

        assert_ne!(base.digest(&addr(9)), base_digest);
        assert_ne!(PendingAction { nonce: 4, ..base.clone() }.digest(&wallet), base_digest);
        assert_ne!(
            PendingAction { destination: addr(3), ..base.clone() }.digest(&wallet),
            base_digest
        );
        assert_ne!(PendingAction { value: 11, ..base.clone() }.digest(&wallet), base_digest);
        assert_ne!(
            PendingAction { payload: vec![1, 2], ..base.clone() }.digest(&wallet),
            base_digest
        );
    }

    #[test]
    fn test_fixed_width_prevents_shifting() {
        let a = encode(&addr(1), 1, &addr(2), 0x100, &[]);
        let b = encode(&addr(1), 0x100, &addr(2), 1, &[]);
        assert_ne!(digest(&a), digest(&b));

        // Moving a byte from the value into the payload changes the digest
        let c = encode(&addr(1), 1, &addr(2), 0, &[0x01]);
        let d = encode(&addr(1), 1, &addr(2), 1, &[]);
        assert_ne!(digest(&c), digest(&d));
    }

    #[test]
    fn test_ownership_encoding() {
        let owners = [addr(5), addr(6)];
        let encoded = encode_ownership(&addr(1), 2, &owners);

        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(&encoded[64..96], &addr(5).to_word());
        assert_eq!(&encoded[96..], &addr(6).to_word());

        // Owner order is part of the message
        assert_ne!(
            digest(&encoded),
            digest(&encode_ownership(&addr(1), 2, &[addr(6), addr(5)]))
        );
    }

    #[test]
    fn test_hash_owners() {
        let owners = [addr(5), addr(6)];
        assert_eq!(hash_owners(&owners), keccak256(&concat_owners(&owners)));
        assert_ne!(hash_owners(&owners), hash_owners(&owners[..1]));
        assert!(!hash_owners(&owners).is_zero());
    }
}
