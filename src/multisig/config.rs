//! Wallet deployment configuration
//!
//! The only configuration a wallet consumes: its initial owners and the
//! recovery wait period, both fixed at construction.

use crate::core::Address;
use crate::multisig::wallet::{MultisigError, OwnerSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Recovery wait period used when none is configured
pub const DEFAULT_RECOVERY_BLOCK_OFFSET: u64 = 100;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] MultisigError),
}

fn default_recovery_block_offset() -> u64 {
    DEFAULT_RECOVERY_BLOCK_OFFSET
}

/// Wallet construction parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Initial owners, in order
    pub owners: Vec<Address>,
    /// Blocks that must pass between starting and confirming a recovery
    #[serde(default = "default_recovery_block_offset")]
    pub recovery_block_offset: u64,
}

impl WalletConfig {
    pub fn new(owners: Vec<Address>, recovery_block_offset: u64) -> Self {
        Self {
            owners,
            recovery_block_offset,
        }
    }

    /// Configuration with the default recovery wait period
    pub fn with_owners(owners: Vec<Address>) -> Self {
        Self::new(owners, DEFAULT_RECOVERY_BLOCK_OFFSET)
    }

    /// Validate the owner list
    pub fn validate(&self) -> Result<OwnerSet, MultisigError> {
        OwnerSet::new(self.owners.clone())
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::File::open(path)?;
        let config: WalletConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;

        log::debug!(
            "Loaded wallet config from {:?}: {} owners, recovery offset {}",
            path,
            config.owners.len(),
            config.recovery_block_offset
        );
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
