//! Ledger-facing interfaces
//!
//! The wallet state (owners, nonce, recovery record) lives on a ledger that
//! executes one mutating call at a time. This module defines what the
//! authorization layer needs from it:
//! - [`Ledger`]: nonce and owner queries plus the signature-gated `execute`
//! - [`TransferableLedger`]: signature-gated ownership change
//! - [`RecoverableLedger`]: the time-locked recovery entry points
//!
//! [`MemoryLedger`] implements all three in process.

pub mod memory;
pub mod token;

use crate::core::{Address, H256};
use crate::multisig::{GroupedSignatures, MultisigError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::MemoryLedger;
pub use token::{Erc20Token, TokenError};

/// Notifications emitted by the wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    Deposited {
        from: Address,
        value: u128,
    },
    Executed {
        destination: Address,
        nonce: u64,
        value: u128,
        data: Vec<u8>,
    },
    RecoveryStarted {
        from: Address,
        new_owners: Vec<Address>,
    },
    RecoveryCancelled {
        from: Address,
    },
    RecoveryConfirmed {
        from: Address,
        new_owners: Vec<Address>,
    },
}

impl WalletEvent {
    /// Event name as it appears in logs
    pub fn name(&self) -> &'static str {
        match self {
            WalletEvent::Deposited { .. } => "Deposited",
            WalletEvent::Executed { .. } => "Executed",
            WalletEvent::RecoveryStarted { .. } => "RecoveryStarted",
            WalletEvent::RecoveryCancelled { .. } => "RecoveryCancelled",
            WalletEvent::RecoveryConfirmed { .. } => "RecoveryConfirmed",
        }
    }
}

/// An event together with where it was emitted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub block_number: u64,
    pub event: WalletEvent,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one mutating ledger call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Block the call was applied in
    pub block_number: u64,
    /// Events emitted by this call, in order
    pub events: Vec<WalletEvent>,
}

impl ExecutionResult {
    /// Last event with the given name
    pub fn find_last_event(&self, name: &str) -> Option<&WalletEvent> {
        self.events.iter().rev().find(|event| event.name() == name)
    }
}

/// Base wallet surface: state queries and signature-gated execution
pub trait Ledger {
    /// Address of the wallet this ledger handle points at
    fn wallet_address(&self) -> Address;

    fn current_nonce(&self) -> Result<u64, MultisigError>;

    fn list_owners(&self) -> Result<Vec<Address>, MultisigError>;

    /// Execute an authorized call on behalf of the wallet
    fn execute(
        &self,
        from: &Address,
        signatures: &GroupedSignatures,
        destination: &Address,
        value: u128,
        data: &[u8],
    ) -> Result<ExecutionResult, MultisigError>;
}

/// Wallet that accepts a signature-gated owner change
pub trait TransferableLedger: Ledger {
    fn transfer_ownership(
        &self,
        from: &Address,
        signatures: &GroupedSignatures,
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError>;
}

/// Wallet with time-locked recovery
pub trait RecoverableLedger: Ledger {
    fn start_recovery(
        &self,
        from: &Address,
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError>;

    fn cancel_recovery(&self, from: &Address) -> Result<ExecutionResult, MultisigError>;

    fn confirm_recovery(
        &self,
        from: &Address,
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError>;

    fn recovery_hash(&self) -> Result<H256, MultisigError>;

    fn recovery_block(&self) -> Result<u64, MultisigError>;

    fn recovery_block_offset(&self) -> Result<u64, MultisigError>;
}
