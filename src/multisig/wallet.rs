//! Owner set and wallet-level errors
//!
//! Every wallet is controlled by an ordered, non-empty set of unique owners.
//! Authorization is N-of-N: an action needs a signature from every owner.

use crate::abi::AbiError;
use crate::core::Address;
use crate::crypto::KeyError;
use crate::ledger::token::TokenError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors related to multisig operations
#[derive(Error, Debug)]
pub enum MultisigError {
    #[error("Invalid owner set: {0}")]
    InvalidOwnerSet(String),
    #[error("Invalid signature set: {0}")]
    InvalidSignatureSet(String),
    #[error("Stale nonce: signatures are for nonce {signed}, wallet is at {current}")]
    StaleNonce { signed: u64, current: u64 },
    #[error("Caller is not an owner: {0}")]
    Unauthorized(Address),
    #[error("No recovery pending")]
    NoRecoveryPending,
    #[error("Recovery not matured: block {current_block}, matures at {matures_at}")]
    RecoveryNotMatured { current_block: u64, matures_at: u64 },
    #[error("Owner list does not match the pending recovery")]
    OwnerListMismatch,
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Crypto error: {0}")]
    Crypto(#[from] KeyError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] AbiError),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

/// An ordered, non-empty list of unique owner identities
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct OwnerSet {
    owners: Vec<Address>,
}

impl OwnerSet {
    /// Validate and wrap an owner list
    ///
    /// # Errors
    /// Returns `InvalidOwnerSet` if the list is empty, contains the zero
    /// address, or repeats an owner
    pub fn new(owners: Vec<Address>) -> Result<Self, MultisigError> {
        if owners.is_empty() {
            return Err(MultisigError::InvalidOwnerSet(
                "at least one owner is required".to_string(),
            ));
        }

        if owners.iter().any(Address::is_zero) {
            return Err(MultisigError::InvalidOwnerSet(
                "zero address cannot be an owner".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if !seen.insert(owner) {
                return Err(MultisigError::InvalidOwnerSet(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
        }

        Ok(Self { owners })
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.owners
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Never true for a validated set
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Signatures needed to authorize an action (every owner)
    pub fn required_signatures(&self) -> usize {
        self.owners.len()
    }

    /// Get description like "3-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required_signatures(), self.owners.len())
    }

    pub fn into_vec(self) -> Vec<Address> {
        self.owners
    }
}

impl TryFrom<Vec<Address>> for OwnerSet {
    type Error = MultisigError;

    fn try_from(owners: Vec<Address>) -> Result<Self, Self::Error> {
        Self::new(owners)
    }
}

impl From<OwnerSet> for Vec<Address> {
    fn from(set: OwnerSet) -> Self {
        set.owners
    }
}
