//! Authorization executor
//!
//! Builds the canonical message for an action, collects owner signatures
//! over it, and submits the grouped signatures to the ledger. Nothing is
//! cached: the nonce and owner list are read from the ledger on every
//! submission, and ledger failures are returned untouched. There are no
//! retries at this layer.

use crate::core::{Address, H256};
use crate::crypto::{KeyPair, Signature};
use crate::ledger::{ExecutionResult, Ledger};
use crate::multisig::aggregate::{diagnose_rejection, group};
use crate::multisig::message::PendingAction;
use crate::multisig::wallet::{MultisigError, OwnerSet};
use std::sync::Arc;

/// Submits authorized calls to one wallet on behalf of one owner
pub struct MultisigExecutor<L: Ledger> {
    ledger: Arc<L>,
    /// Owner account that sends the submission
    sender: Address,
}

impl<L: Ledger> MultisigExecutor<L> {
    pub fn new(ledger: Arc<L>, sender: Address) -> Self {
        Self { ledger, sender }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn wallet_address(&self) -> Address {
        self.ledger.wallet_address()
    }

    /// Digest owners sign for an action at `nonce`
    pub fn prepare(&self, nonce: u64, destination: &Address, value: u128, payload: &[u8]) -> H256 {
        PendingAction::new(nonce, *destination, value, payload.to_vec())
            .digest(&self.ledger.wallet_address())
    }

    /// Produce one owner's signature for an action
    pub fn request_signature(
        &self,
        key: &KeyPair,
        nonce: u64,
        destination: &Address,
        value: u128,
        payload: &[u8],
    ) -> Result<Signature, MultisigError> {
        let digest = self.prepare(nonce, destination, value, payload);
        Ok(key.sign_digest(&digest)?)
    }

    /// Group signatures against the ledger's current state and execute
    pub fn submit(
        &self,
        signatures: &[Signature],
        destination: &Address,
        value: u128,
        payload: &[u8],
    ) -> Result<ExecutionResult, MultisigError> {
        let nonce = self.ledger.current_nonce()?;
        let owners = self.current_owners()?;
        let digest = self.prepare(nonce, destination, value, payload);

        let grouped = group(&digest, signatures, &owners).map_err(|err| {
            diagnose_rejection(err, nonce, |past| {
                let digest = self.prepare(past, destination, value, payload);
                group(&digest, signatures, &owners).is_ok()
            })
        })?;

        log::debug!(
            "Submitting {} signatures for nonce {} to {}",
            grouped.len(),
            nonce,
            self.ledger.wallet_address()
        );
        self.ledger
            .execute(&self.sender, &grouped, destination, value, payload)
    }

    /// Owner set as the ledger reports it right now
    pub fn current_owners(&self) -> Result<OwnerSet, MultisigError> {
        OwnerSet::new(self.ledger.list_owners()?)
    }
}
