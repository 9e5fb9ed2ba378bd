//! Time-locked owner recovery
//!
//! Any single owner may propose a replacement owner list. The proposal is
//! stored only as a commitment (`hash_owners(new_owners)`) together with the
//! block it was made in. Once `recovery_block_offset` blocks have passed, any
//! owner may confirm by revealing the same list. Until then any owner may
//! cancel.
//!
//! `hash == ZERO` iff `block == 0`; both fields always move together.

use crate::core::{Address, H256};
use crate::multisig::message::hash_owners;
use crate::multisig::wallet::{MultisigError, OwnerSet};
use serde::{Deserialize, Serialize};

/// Observable state of the recovery record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryState {
    /// No proposal outstanding
    Idle,
    /// A proposal was started at `block`
    Pending { hash: H256, block: u64 },
}

/// Recovery fields owned by a wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    hash: H256,
    block: u64,
    block_offset: u64,
}

impl RecoveryRecord {
    /// Create an idle record with a fixed wait period
    pub fn new(block_offset: u64) -> Self {
        Self {
            hash: H256::ZERO,
            block: 0,
            block_offset,
        }
    }

    pub fn state(&self) -> RecoveryState {
        if self.hash.is_zero() {
            RecoveryState::Idle
        } else {
            RecoveryState::Pending {
                hash: self.hash,
                block: self.block,
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.hash.is_zero()
    }

    /// Commitment to the proposed owners, or zero
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Block the recovery was started in, or zero
    pub fn block(&self) -> u64 {
        self.block
    }

    pub fn block_offset(&self) -> u64 {
        self.block_offset
    }

    /// First block at which the pending recovery may be confirmed
    pub fn matures_at(&self) -> Option<u64> {
        self.is_pending()
            .then(|| self.block.saturating_add(self.block_offset))
    }

    /// Propose `new_owners`, replacing any outstanding proposal
    ///
    /// # Errors
    /// `InvalidOwnerSet` if the proposal is not a valid owner list, or
    /// `ExecutionFailed` at block zero, where the start block would collide
    /// with the idle sentinel
    pub fn start(&mut self, new_owners: &[Address], current_block: u64) -> Result<H256, MultisigError> {
        OwnerSet::new(new_owners.to_vec())?;
        if current_block == 0 {
            return Err(MultisigError::ExecutionFailed(
                "recovery cannot start at block 0".to_string(),
            ));
        }

        self.hash = hash_owners(new_owners);
        self.block = current_block;
        Ok(self.hash)
    }

    /// Drop the outstanding proposal
    pub fn cancel(&mut self) -> Result<(), MultisigError> {
        if !self.is_pending() {
            return Err(MultisigError::NoRecoveryPending);
        }
        self.reset();
        Ok(())
    }

    /// Check that `new_owners` may replace the owner set at `current_block`,
    /// then reset the record.
    ///
    /// Returns the validated owner set to install.
    pub fn confirm(
        &mut self,
        new_owners: &[Address],
        current_block: u64,
    ) -> Result<OwnerSet, MultisigError> {
        let owners = self.check_confirm(new_owners, current_block)?;
        self.reset();
        Ok(owners)
    }

    /// Validation half of [`confirm`](Self::confirm), without state change
    pub fn check_confirm(
        &self,
        new_owners: &[Address],
        current_block: u64,
    ) -> Result<OwnerSet, MultisigError> {
        let matures_at = self.matures_at().ok_or(MultisigError::NoRecoveryPending)?;

        if current_block < matures_at {
            return Err(MultisigError::RecoveryNotMatured {
                current_block,
                matures_at,
            });
        }

        if hash_owners(new_owners) != self.hash {
            return Err(MultisigError::OwnerListMismatch);
        }

        OwnerSet::new(new_owners.to_vec())
    }

    fn reset(&mut self) {
        self.hash = H256::ZERO;
        self.block = 0;
    }
}
