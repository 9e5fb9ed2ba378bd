//! Multi-signature authorization
//!
//! Every owner signs the same canonical message; the grouped signatures,
//! sorted by signer, authorize one call at the wallet's current nonce.
//! A single owner can also start a time-locked recovery that replaces the
//! owner set unless another owner cancels it first.
//!
//! # Example
//!
//! ```ignore
//! use recoverable_multisig::multisig::{TransferCommand, WalletConfig};
//!
//! // Deploy a 3-of-3 wallet
//! let ledger = Arc::new(MemoryLedger::deploy(&WalletConfig::with_owners(owners))?);
//! let command = TransferCommand::new(ledger.clone(), keys[0].address());
//!
//! // Each owner signs for nonce 0
//! let sigs = keys.iter().map(|k| command.sign(k, 0, &to, 100)).collect::<Result<Vec<_>, _>>()?;
//!
//! // Any owner submits
//! command.execute(&sigs, &to, 100)?;
//! ```

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod executor;
pub mod message;
pub mod recovery;
pub mod wallet;

pub use aggregate::{
    diagnose_rejection, find_signed_nonce, group, sort_by_signer, verify_grouped,
    GroupedSignatures, STALE_NONCE_WINDOW,
};
pub use commands::{TransferCommand, TransferErc20Command, TransferOwnershipCommand};
pub use config::{ConfigError, WalletConfig, DEFAULT_RECOVERY_BLOCK_OFFSET};
pub use executor::MultisigExecutor;
pub use message::{hash_owners, PendingAction};
pub use recovery::{RecoveryRecord, RecoveryState};
pub use wallet::{MultisigError, OwnerSet};
