//! Recoverable Multisig: an owner-signature authorization layer in Rust
//!
//! This crate provides the client side of an N-of-N smart-contract wallet:
//! - Canonical, nonce-bound messages hashed with Keccak-256
//! - Recoverable secp256k1 personal-message signatures
//! - Signature grouping sorted by recovered signer
//! - Value, token, and ownership-transfer commands
//! - Time-locked owner recovery with cancellation
//! - An in-memory ledger that enforces the wallet rules
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use recoverable_multisig::crypto::KeyPair;
//! use recoverable_multisig::ledger::{Ledger, MemoryLedger};
//! use recoverable_multisig::multisig::{TransferCommand, WalletConfig};
//!
//! // Deploy a 2-of-2 wallet and fund it
//! let keys = vec![KeyPair::generate(), KeyPair::generate()];
//! let owners = keys.iter().map(|k| k.address()).collect();
//! let ledger = Arc::new(MemoryLedger::deploy(&WalletConfig::with_owners(owners)).unwrap());
//! ledger.deposit(&KeyPair::generate().address(), 1_000).unwrap();
//!
//! // Both owners sign, one submits
//! let to = KeyPair::generate().address();
//! let command = TransferCommand::new(Arc::clone(&ledger), keys[0].address());
//! let sigs: Vec<_> = keys.iter().map(|k| command.sign(k, 0, &to, 250).unwrap()).collect();
//! command.execute(&sigs, &to, 250).unwrap();
//!
//! assert_eq!(ledger.current_nonce().unwrap(), 1);
//! assert_eq!(ledger.account_balance(&to), 250);
//! ```

pub mod abi;
pub mod core;
pub mod crypto;
pub mod ledger;
pub mod multisig;

// Re-export commonly used types
pub use abi::{AbiEncoder, AbiError, AbiValue, CallEncoder};
pub use self::core::{Address, H256};
pub use crypto::{keccak256, KeyError, KeyPair, Signature};
pub use ledger::{
    ExecutionResult, Ledger, MemoryLedger, RecoverableLedger, TransferableLedger, WalletEvent,
};
pub use multisig::{
    GroupedSignatures, MultisigError, MultisigExecutor, OwnerSet, TransferCommand,
    TransferErc20Command, TransferOwnershipCommand, WalletConfig,
};
