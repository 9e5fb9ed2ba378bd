//! Signature aggregation and verification
//!
//! Signatures are submitted as three parallel arrays `v[]`, `r[]`, `s[]`
//! ordered by the recovered signer address, strictly ascending. The verifier
//! only accepts strictly increasing owners, which is how it refuses a
//! signature counted twice.

use crate::core::{Address, H256};
use crate::crypto::Signature;
use crate::multisig::wallet::{MultisigError, OwnerSet};
use serde::{Deserialize, Serialize};

/// How many nonces back a rejected signature set is checked against
pub const STALE_NONCE_WINDOW: u64 = 16;

/// Signatures in the canonical submission form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedSignatures {
    pub v: Vec<u8>,
    pub r: Vec<H256>,
    pub s: Vec<H256>,
}

impl GroupedSignatures {
    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// Rebuild individual signatures, failing on ragged arrays
    pub fn signatures(&self) -> Result<Vec<Signature>, MultisigError> {
        if self.r.len() != self.v.len() || self.s.len() != self.v.len() {
            return Err(MultisigError::InvalidSignatureSet(format!(
                "array length mismatch: v={}, r={}, s={}",
                self.v.len(),
                self.r.len(),
                self.s.len()
            )));
        }
        Ok(self
            .v
            .iter()
            .zip(&self.r)
            .zip(&self.s)
            .map(|((&v, &r), &s)| Signature { v, r, s })
            .collect())
    }
}

/// Recover every signer and sort ascending by address.
///
/// # Errors
/// `InvalidSignatureSet` if a signature cannot be recovered or two
/// signatures recover to the same address
pub fn sort_by_signer(
    digest: &H256,
    signatures: &[Signature],
) -> Result<Vec<(Address, Signature)>, MultisigError> {
    let mut recovered = signatures
        .iter()
        .enumerate()
        .map(|(index, sig)| {
            sig.recover(digest).map(|signer| (signer, *sig)).map_err(|e| {
                MultisigError::InvalidSignatureSet(format!(
                    "signature {} is not recoverable: {}",
                    index, e
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    recovered.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(pair) = recovered.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(MultisigError::InvalidSignatureSet(format!(
            "duplicate signer {}",
            pair[0].0
        )));
    }

    Ok(recovered)
}

/// Group signatures for submission against the current owner set
pub fn group(
    digest: &H256,
    signatures: &[Signature],
    owners: &OwnerSet,
) -> Result<GroupedSignatures, MultisigError> {
    let sorted = sort_by_signer(digest, signatures)?;

    if let Some((stranger, _)) = sorted.iter().find(|(signer, _)| !owners.contains(signer)) {
        return Err(MultisigError::InvalidSignatureSet(format!(
            "signer {} is not an owner",
            stranger
        )));
    }

    if sorted.len() < owners.required_signatures() {
        return Err(MultisigError::InvalidSignatureSet(format!(
            "have {} signatures, need {}",
            sorted.len(),
            owners.required_signatures()
        )));
    }

    let mut grouped = GroupedSignatures::default();
    for (_, sig) in sorted {
        grouped.v.push(sig.v);
        grouped.r.push(sig.r);
        grouped.s.push(sig.s);
    }
    Ok(grouped)
}

/// Verify grouped signatures the way the wallet does before executing.
///
/// Returns the recovered signers in submission order.
pub fn verify_grouped(
    digest: &H256,
    grouped: &GroupedSignatures,
    owners: &OwnerSet,
) -> Result<Vec<Address>, MultisigError> {
    let signatures = grouped.signatures()?;

    if signatures.len() != owners.required_signatures() {
        return Err(MultisigError::InvalidSignatureSet(format!(
            "have {} signatures, need {}",
            signatures.len(),
            owners.required_signatures()
        )));
    }

    let mut signers = Vec::with_capacity(signatures.len());
    let mut last: Option<Address> = None;
    for (index, sig) in signatures.iter().enumerate() {
        let signer = sig.recover(digest).map_err(|e| {
            MultisigError::InvalidSignatureSet(format!(
                "signature {} is not recoverable: {}",
                index, e
            ))
        })?;

        if !owners.contains(&signer) {
            return Err(MultisigError::InvalidSignatureSet(format!(
                "signer {} is not an owner",
                signer
            )));
        }
        if last.map_or(false, |prev| signer <= prev) {
            return Err(MultisigError::InvalidSignatureSet(format!(
                "signer {} out of order",
                signer
            )));
        }

        last = Some(signer);
        signers.push(signer);
    }

    Ok(signers)
}

/// Find the most recent earlier nonce, within [`STALE_NONCE_WINDOW`], that
/// `accepts_at` accepts.
///
/// Used after signatures fail at `current` to tell a replay apart from a bad
/// signature set.
pub fn find_signed_nonce(current: u64, accepts_at: impl Fn(u64) -> bool) -> Option<u64> {
    (current.saturating_sub(STALE_NONCE_WINDOW)..current)
        .rev()
        .find(|&nonce| accepts_at(nonce))
}

/// Turn a rejection at `current` into `StaleNonce` when the signatures are
/// accepted at a recent earlier nonce
pub fn diagnose_rejection(
    err: MultisigError,
    current: u64,
    accepts_at: impl Fn(u64) -> bool,
) -> MultisigError {
    match find_signed_nonce(current, accepts_at) {
        Some(signed) => {
            log::warn!(
                "Rejected replay: signatures for nonce {}, wallet at {}",
                signed,
                current
            );
            MultisigError::StaleNonce { signed, current }
        }
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{keccak256, KeyPair};

    /// Fresh keys sorted ascending by address
    fn sorted_keys(n: usize) -> Vec<KeyPair> {
        let mut keys: Vec<KeyPair> = (0..n).map(|_| KeyPair::generate()).collect();
        keys.sort_by_key(|k| k.address());
        keys
    }

    fn owners_of(keys: &[KeyPair]) -> OwnerSet {
        OwnerSet::new(keys.iter().map(|k| k.address()).collect()).unwrap()
    }

    #[test]
    fn test_group_order_independent() {
        let keys = sorted_keys(3);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let sig_a = keys[0].sign_digest(&digest).unwrap();
        let sig_b = keys[1].sign_digest(&digest).unwrap();
        let sig_c = keys[2].sign_digest(&digest).unwrap();

        let shuffled = group(&digest, &[sig_c, sig_a, sig_b], &owners).unwrap();
        let ordered = group(&digest, &[sig_a, sig_b, sig_c], &owners).unwrap();

        assert_eq!(shuffled, ordered);
        assert_eq!(ordered.v, vec![sig_a.v, sig_b.v, sig_c.v]);
        assert_eq!(ordered.r, vec![sig_a.r, sig_b.r, sig_c.r]);
        assert_eq!(ordered.s, vec![sig_a.s, sig_b.s, sig_c.s]);
    }

    #[test]
    fn test_group_rejects_duplicate_signer() {
        let keys = sorted_keys(2);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let sig_a = keys[0].sign_digest(&digest).unwrap();
        let result = group(&digest, &[sig_a, sig_a], &owners);
        assert!(matches!(result, Err(MultisigError::InvalidSignatureSet(_))));
    }

    #[test]
    fn test_group_rejects_missing_owner() {
        let keys = sorted_keys(3);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let sigs: Vec<Signature> = keys[..2]
            .iter()
            .map(|k| k.sign_digest(&digest).unwrap())
            .collect();
        let result = group(&digest, &sigs, &owners);
        assert!(matches!(result, Err(MultisigError::InvalidSignatureSet(_))));
    }

    #[test]
    fn test_group_rejects_non_owner() {
        let keys = sorted_keys(2);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let mut sigs: Vec<Signature> = keys
            .iter()
            .map(|k| k.sign_digest(&digest).unwrap())
            .collect();
        sigs.push(KeyPair::generate().sign_digest(&digest).unwrap());

        let err = group(&digest, &sigs, &owners).unwrap_err();
        assert!(err.to_string().contains("not an owner"));
    }

    #[test]
    fn test_group_rejects_signature_over_other_digest() {
        let keys = sorted_keys(1);
        let owners = owners_of(&keys);
        let sig = keys[0].sign_digest(&keccak256(b"nonce 0")).unwrap();

        let result = group(&keccak256(b"nonce 1"), &[sig], &owners);
        assert!(matches!(result, Err(MultisigError::InvalidSignatureSet(_))));
    }

    #[test]
    fn test_verify_grouped_accepts_group_output() {
        let keys = sorted_keys(4);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let sigs: Vec<Signature> = keys
            .iter()
            .rev()
            .map(|k| k.sign_digest(&digest).unwrap())
            .collect();
        let grouped = group(&digest, &sigs, &owners).unwrap();

        let signers = verify_grouped(&digest, &grouped, &owners).unwrap();
        let expected: Vec<Address> = keys.iter().map(|k| k.address()).collect();
        assert_eq!(signers, expected);
    }

    #[test]
    fn test_verify_grouped_rejects_unsorted() {
        let keys = sorted_keys(2);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let sig_a = keys[0].sign_digest(&digest).unwrap();
        let sig_b = keys[1].sign_digest(&digest).unwrap();
        let unsorted = GroupedSignatures {
            v: vec![sig_b.v, sig_a.v],
            r: vec![sig_b.r, sig_a.r],
            s: vec![sig_b.s, sig_a.s],
        };

        let err = verify_grouped(&digest, &unsorted, &owners).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn test_verify_grouped_rejects_repeated_signature() {
        // One owner's signature twice must not pass for a 2-owner wallet
        let keys = sorted_keys(2);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");

        let sig_a = keys[0].sign_digest(&digest).unwrap();
        let doubled = GroupedSignatures {
            v: vec![sig_a.v, sig_a.v],
            r: vec![sig_a.r, sig_a.r],
            s: vec![sig_a.s, sig_a.s],
        };

        assert!(matches!(
            verify_grouped(&digest, &doubled, &owners),
            Err(MultisigError::InvalidSignatureSet(_))
        ));
    }

    #[test]
    fn test_verify_grouped_rejects_ragged_arrays() {
        let keys = sorted_keys(1);
        let owners = owners_of(&keys);
        let digest = keccak256(b"action");
        let sig = keys[0].sign_digest(&digest).unwrap();

        let ragged = GroupedSignatures {
            v: vec![sig.v],
            r: vec![sig.r],
            s: vec![],
        };
        let err = verify_grouped(&digest, &ragged, &owners).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn test_find_signed_nonce_window() {
        assert_eq!(find_signed_nonce(0, |_| true), None);
        assert_eq!(find_signed_nonce(5, |n| n == 2), Some(2));
        // Most recent match wins
        assert_eq!(find_signed_nonce(5, |n| n < 4), Some(3));

        let current = 100;
        let oldest = current - STALE_NONCE_WINDOW;
        assert_eq!(find_signed_nonce(current, |n| n == oldest), Some(oldest));
        assert_eq!(find_signed_nonce(current, |n| n == oldest - 1), None);
        assert_eq!(find_signed_nonce(current, |n| n == current), None);
    }

    #[test]
    fn test_diagnose_rejection() {
        let err = MultisigError::InvalidSignatureSet("bad".to_string());
        assert!(matches!(
            diagnose_rejection(err, 3, |n| n == 1),
            MultisigError::StaleNonce { signed: 1, current: 3 }
        ));

        let err = MultisigError::InvalidSignatureSet("bad".to_string());
        assert!(matches!(
            diagnose_rejection(err, 3, |_| false),
            MultisigError::InvalidSignatureSet(_)
        ));
    }
}
