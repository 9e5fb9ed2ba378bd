//! Recoverable signatures over personal-message digests
//!
//! A digest is never signed raw. It is first wrapped with the standard
//! personal-message prefix (`"\x19Ethereum Signed Message:\n32"` followed by
//! the 32 digest bytes) and hashed again; the verifier applies the same wrap
//! before recovering the signer.

use crate::core::{Address, H256};
use crate::crypto::hash::keccak256_concat;
use crate::crypto::keys::{public_key_to_address, KeyError};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};

/// Prefix applied to a 32-byte digest before signing
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Offset added to the raw recovery id to form `v`
pub const V_OFFSET: u8 = 27;

/// A recoverable `{v, r, s}` signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub v: u8,
    pub r: H256,
    pub s: H256,
}

impl Signature {
    /// Recover the address that produced this signature over `digest`
    pub fn recover(&self, digest: &H256) -> Result<Address, KeyError> {
        recover_signer(digest, self)
    }

    /// 65-byte `r || s || v` serialization
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_bytes());
        out[32..64].copy_from_slice(self.s.as_bytes());
        out[64] = self.v;
        out
    }

    /// Parse a 65-byte `r || s || v` signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 65 {
            return Err(KeyError::InvalidSignature);
        }
        let r = H256::from_slice(&bytes[..32]).map_err(|_| KeyError::InvalidSignature)?;
        let s = H256::from_slice(&bytes[32..64]).map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { v: bytes[64], r, s })
    }
}

/// Wrap a digest as a personal message and hash it
pub fn personal_message_hash(digest: &H256) -> H256 {
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, digest.as_bytes()])
}

/// Sign a digest with a secret key using the personal-message scheme
pub fn sign_digest(secret_key: &SecretKey, digest: &H256) -> Result<Signature, KeyError> {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest_slice(personal_message_hash(digest).as_bytes())?;

    let recoverable = secp.sign_ecdsa_recoverable(&message, secret_key);
    let (recovery_id, compact) = recoverable.serialize_compact();

    let v = u8::try_from(recovery_id.to_i32())
        .map_err(|_| KeyError::InvalidSignature)?
        .checked_add(V_OFFSET)
        .ok_or(KeyError::InvalidSignature)?;

    Ok(Signature {
        v,
        r: H256::from_slice(&compact[..32]).map_err(|_| KeyError::InvalidSignature)?,
        s: H256::from_slice(&compact[32..]).map_err(|_| KeyError::InvalidSignature)?,
    })
}

/// Recover the signer address of a personal-message signature over `digest`
pub fn recover_signer(digest: &H256, signature: &Signature) -> Result<Address, KeyError> {
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest_slice(personal_message_hash(digest).as_bytes())?;

    let raw_id = signature
        .v
        .checked_sub(V_OFFSET)
        .ok_or(KeyError::InvalidRecoveryId(signature.v))?;
    let recovery_id = RecoveryId::from_i32(i32::from(raw_id))
        .map_err(|_| KeyError::InvalidRecoveryId(signature.v))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(signature.r.as_bytes());
    compact[32..].copy_from_slice(signature.s.as_bytes());

    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|_| KeyError::InvalidSignature)?;
    let public_key = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| KeyError::RecoveryFailed)?;

    Ok(public_key_to_address(&public_key))
}
