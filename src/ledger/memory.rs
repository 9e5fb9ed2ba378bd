//! In-memory ledger
//!
//! Holds one wallet's state and applies the wallet entry points exactly as a
//! chain would: owner gating, signature verification against the current
//! nonce, all-or-nothing state changes, and an event log. Block height only
//! moves when the caller mines, which lets tests place calls at chosen
//! heights.

use crate::abi::decode_transfer;
use crate::core::{Address, H256};
use crate::crypto::keccak256_concat;
use crate::ledger::token::{Erc20Token, TokenError};
use crate::ledger::{
    EventRecord, ExecutionResult, Ledger, RecoverableLedger, TransferableLedger, WalletEvent,
};
use crate::multisig::message::{concat_owners, digest, encode, encode_ownership};
use crate::multisig::{
    diagnose_rejection, verify_grouped, GroupedSignatures, MultisigError, OwnerSet,
    RecoveryRecord, WalletConfig,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Block the wallet is deployed in
pub const GENESIS_BLOCK: u64 = 1;

#[derive(Debug)]
struct WalletState {
    owners: OwnerSet,
    nonce: u64,
    recovery: RecoveryRecord,
    /// Native balance held by the wallet
    balance: u128,
    /// Native balances received by other accounts
    accounts: HashMap<Address, u128>,
    tokens: HashMap<Address, Erc20Token>,
    token_nonce: u64,
    block_number: u64,
    events: Vec<EventRecord>,
}

impl WalletState {
    fn require_owner(&self, from: &Address) -> Result<(), MultisigError> {
        if !self.owners.contains(from) {
            log::warn!("Rejected call from non-owner {}", from);
            return Err(MultisigError::Unauthorized(*from));
        }
        Ok(())
    }

    fn finish(&mut self, events: Vec<WalletEvent>) -> ExecutionResult {
        let timestamp = Utc::now();
        for event in &events {
            self.events.push(EventRecord {
                block_number: self.block_number,
                event: event.clone(),
                timestamp,
            });
        }
        ExecutionResult {
            block_number: self.block_number,
            events,
        }
    }
}

/// A single recoverable, transferable multisig wallet held in memory
#[derive(Debug)]
pub struct MemoryLedger {
    address: Address,
    state: RwLock<WalletState>,
}

impl MemoryLedger {
    /// Deploy a wallet at a fresh address
    pub fn deploy(config: &WalletConfig) -> Result<Self, MultisigError> {
        let salt: [u8; 32] = rand::random();
        let hash = keccak256_concat(&[&salt, &concat_owners(&config.owners)]);
        Self::deploy_at(Address::from_word(hash.as_bytes()), config)
    }

    /// Deploy a wallet at a chosen address
    pub fn deploy_at(address: Address, config: &WalletConfig) -> Result<Self, MultisigError> {
        let owners = config.validate()?;

        log::info!(
            "Wallet deployed at {} ({}, recovery offset {})",
            address,
            owners.description(),
            config.recovery_block_offset
        );

        Ok(Self {
            address,
            state: RwLock::new(WalletState {
                owners,
                nonce: 0,
                recovery: RecoveryRecord::new(config.recovery_block_offset),
                balance: 0,
                accounts: HashMap::new(),
                tokens: HashMap::new(),
                token_nonce: 0,
                block_number: GENESIS_BLOCK,
                events: Vec::new(),
            }),
        })
    }

    pub fn block_number(&self) -> u64 {
        self.state.read().block_number
    }

    /// Mine `count` empty blocks
    pub fn mine(&self, count: u64) -> u64 {
        let mut state = self.state.write();
        state.block_number = state.block_number.saturating_add(count);
        state.block_number
    }

    /// Mine until the chain reaches `block`; no-op if already past it
    pub fn advance_to(&self, block: u64) -> u64 {
        let mut state = self.state.write();
        state.block_number = state.block_number.max(block);
        state.block_number
    }

    /// Send native value to the wallet
    pub fn deposit(&self, from: &Address, value: u128) -> Result<ExecutionResult, MultisigError> {
        let mut state = self.state.write();
        if value == 0 {
            return Ok(state.finish(Vec::new()));
        }

        state.balance = state
            .balance
            .checked_add(value)
            .ok_or_else(|| MultisigError::ExecutionFailed("balance overflow".to_string()))?;

        log::info!("Deposit of {} from {} to {}", value, from, self.address);
        Ok(state.finish(vec![WalletEvent::Deposited { from: *from, value }]))
    }

    /// Native balance of the wallet
    pub fn balance(&self) -> u128 {
        self.state.read().balance
    }

    /// Native value an external account has received from the wallet
    pub fn account_balance(&self, address: &Address) -> u128 {
        self.state
            .read()
            .accounts
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    /// Create a token contract with the whole supply held by `holder`
    pub fn deploy_token(&self, symbol: &str, total_supply: u128, holder: &Address) -> Address {
        let mut state = self.state.write();
        let hash = keccak256_concat(&[
            self.address.as_bytes(),
            symbol.as_bytes(),
            &state.token_nonce.to_be_bytes(),
        ]);
        state.token_nonce += 1;

        let address = Address::from_word(hash.as_bytes());
        state.tokens.insert(
            address,
            Erc20Token::new(address, symbol.to_string(), total_supply, *holder),
        );

        log::info!("Token {} deployed at {}", symbol, address);
        address
    }

    pub fn token_balance(&self, token: &Address, holder: &Address) -> Result<u128, TokenError> {
        self.state
            .read()
            .tokens
            .get(token)
            .map(|t| t.balance_of(holder))
            .ok_or(TokenError::TokenNotFound(*token))
    }

    /// Every event emitted so far
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().events.clone()
    }

    /// Verify signatures at the current nonce.
    ///
    /// On failure, checks whether they verify at a recent earlier nonce so a
    /// replay surfaces as `StaleNonce` rather than a generic signature error.
    fn authorize(
        owners: &OwnerSet,
        nonce: u64,
        signatures: &GroupedSignatures,
        digest_at: impl Fn(u64) -> H256,
    ) -> Result<(), MultisigError> {
        let err = match verify_grouped(&digest_at(nonce), signatures, owners) {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let err = diagnose_rejection(err, nonce, |past| {
            verify_grouped(&digest_at(past), signatures, owners).is_ok()
        });
        if !matches!(err, MultisigError::StaleNonce { .. }) {
            log::warn!("Rejected signatures at nonce {}: {}", nonce, err);
        }
        Err(err)
    }
}

impl Ledger for MemoryLedger {
    fn wallet_address(&self) -> Address {
        self.address
    }

    fn current_nonce(&self) -> Result<u64, MultisigError> {
        Ok(self.state.read().nonce)
    }

    fn list_owners(&self) -> Result<Vec<Address>, MultisigError> {
        Ok(self.state.read().owners.as_slice().to_vec())
    }

    fn execute(
        &self,
        from: &Address,
        signatures: &GroupedSignatures,
        destination: &Address,
        value: u128,
        data: &[u8],
    ) -> Result<ExecutionResult, MultisigError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.require_owner(from)?;

        let nonce = state.nonce;
        let wallet = self.address;
        Self::authorize(&state.owners, nonce, signatures, |n| {
            digest(&encode(&wallet, n, destination, value, data))
        })?;

        if value > state.balance {
            return Err(MultisigError::ExecutionFailed(format!(
                "insufficient balance: have {}, need {}",
                state.balance, value
            )));
        }

        let token_call = match state.tokens.get(destination) {
            Some(token) if !data.is_empty() => {
                let (to, amount) = decode_transfer(data)?.ok_or(TokenError::UnsupportedCall)?;
                token.check_transfer(&wallet, &to, amount)?;
                Some((to, amount))
            }
            _ => None,
        };

        // Everything below is infallible; state changes start here
        if let Some((to, amount)) = token_call {
            if let Some(token) = state.tokens.get_mut(destination) {
                let moved = token.transfer(&wallet, &to, amount)?;
                log::info!(
                    "Token {} ({}) transfer of {} from {} to {}",
                    token.symbol,
                    moved.token,
                    moved.amount,
                    moved.from,
                    moved.to
                );
            }
        }
        // Value sent to the wallet itself stays in its balance
        if value > 0 && *destination != wallet {
            state.balance -= value;
            let received = state.accounts.entry(*destination).or_insert(0);
            *received = received.saturating_add(value);
        }
        state.nonce += 1;

        log::info!(
            "Executed nonce {} from {}: {} to {} with {} bytes of data",
            nonce,
            wallet,
            value,
            destination,
            data.len()
        );

        Ok(state.finish(vec![WalletEvent::Executed {
            destination: *destination,
            nonce,
            value,
            data: data.to_vec(),
        }]))
    }
}

impl TransferableLedger for MemoryLedger {
    fn transfer_ownership(
        &self,
        from: &Address,
        signatures: &GroupedSignatures,
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.require_owner(from)?;

        let replacement = OwnerSet::new(new_owners.to_vec())?;
        let nonce = state.nonce;
        let wallet = self.address;
        Self::authorize(&state.owners, nonce, signatures, |n| {
            digest(&encode_ownership(&wallet, n, new_owners))
        })?;

        state.owners = replacement;
        state.nonce += 1;

        log::info!(
            "Ownership of {} transferred at nonce {} to {} owners",
            wallet,
            nonce,
            new_owners.len()
        );
        Ok(state.finish(Vec::new()))
    }
}

impl RecoverableLedger for MemoryLedger {
    fn start_recovery(
        &self,
        from: &Address,
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.require_owner(from)?;

        let block = state.block_number;
        let hash = state.recovery.start(new_owners, block)?;

        log::info!(
            "Recovery of {} started by {} at block {} (commitment {})",
            self.address,
            from,
            block,
            hash
        );
        Ok(state.finish(vec![WalletEvent::RecoveryStarted {
            from: *from,
            new_owners: new_owners.to_vec(),
        }]))
    }

    fn cancel_recovery(&self, from: &Address) -> Result<ExecutionResult, MultisigError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.require_owner(from)?;

        state.recovery.cancel()?;

        log::info!("Recovery of {} cancelled by {}", self.address, from);
        Ok(state.finish(vec![WalletEvent::RecoveryCancelled { from: *from }]))
    }

    fn confirm_recovery(
        &self,
        from: &Address,
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.require_owner(from)?;

        let block = state.block_number;
        state.owners = state.recovery.confirm(new_owners, block)?;

        log::info!(
            "Recovery of {} confirmed by {} at block {}: {}",
            self.address,
            from,
            block,
            state.owners.description()
        );
        Ok(state.finish(vec![WalletEvent::RecoveryConfirmed {
            from: *from,
            new_owners: new_owners.to_vec(),
        }]))
    }

    fn recovery_hash(&self) -> Result<H256, MultisigError> {
        Ok(self.state.read().recovery.hash())
    }

    fn recovery_block(&self) -> Result<u64, MultisigError> {
        Ok(self.state.read().recovery.block())
    }

    fn recovery_block_offset(&self) -> Result<u64, MultisigError> {
        Ok(self.state.read().recovery.block_offset())
    }
}
