//! ERC-20 style token contract
//!
//! A minimal fungible token the in-memory ledger can route wallet calls to,
//! so token transfers authorized by the owners have an observable effect.

use crate::core::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Invalid recipient: cannot transfer to self")]
    SelfTransfer,
    #[error("Token not found: {0}")]
    TokenNotFound(Address),
    #[error("Unsupported token call")]
    UnsupportedCall,
}

/// Transfer event (emitted when tokens are transferred)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferEvent {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    pub timestamp: DateTime<Utc>,
}

/// A fungible token with a fixed supply
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Erc20Token {
    /// Token contract address
    pub address: Address,
    /// Token symbol (e.g., "MTK")
    pub symbol: String,
    /// Total supply (fixed at creation)
    pub total_supply: u128,
    balances: HashMap<Address, u128>,
}

impl Erc20Token {
    /// Create a token with the whole supply held by `holder`
    pub fn new(address: Address, symbol: String, total_supply: u128, holder: Address) -> Self {
        let mut balances = HashMap::new();
        balances.insert(holder, total_supply);

        Self {
            address,
            symbol,
            total_supply,
            balances,
        }
    }

    /// Get balance of an address
    pub fn balance_of(&self, address: &Address) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Check a transfer without applying it
    pub fn check_transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }

        if from == to {
            return Err(TokenError::SelfTransfer);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        Ok(())
    }

    /// Transfer tokens from one address to another
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_transfer(from, to, amount)?;

        *self.balances.entry(*from).or_insert(0) -= amount;
        *self.balances.entry(*to).or_insert(0) += amount;

        Ok(TransferEvent {
            token: self.address,
            from: *from,
            to: *to,
            amount,
            timestamp: Utc::now(),
        })
    }
}
