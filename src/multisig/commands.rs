//! Wallet commands
//!
//! Each command pairs a `sign` step, run independently by every owner, with
//! an `execute` step, run once by the submitting owner over the collected
//! signatures.

use crate::abi::{AbiEncoder, AbiValue, CallEncoder, TRANSFER_SIGNATURE};
use crate::core::Address;
use crate::crypto::{KeyPair, Signature};
use crate::ledger::{ExecutionResult, Ledger, TransferableLedger};
use crate::multisig::aggregate::{diagnose_rejection, group};
use crate::multisig::executor::MultisigExecutor;
use crate::multisig::message::{digest, encode_ownership};
use crate::multisig::wallet::{MultisigError, OwnerSet};
use std::sync::Arc;

/// Send native value from the wallet
pub struct TransferCommand<L: Ledger> {
    executor: MultisigExecutor<L>,
}

impl<L: Ledger> TransferCommand<L> {
    pub fn new(ledger: Arc<L>, sender: Address) -> Self {
        Self {
            executor: MultisigExecutor::new(ledger, sender),
        }
    }

    pub fn sign(
        &self,
        key: &KeyPair,
        nonce: u64,
        destination: &Address,
        value: u128,
    ) -> Result<Signature, MultisigError> {
        self.executor
            .request_signature(key, nonce, destination, value, &[])
    }

    pub fn execute(
        &self,
        signatures: &[Signature],
        destination: &Address,
        value: u128,
    ) -> Result<ExecutionResult, MultisigError> {
        self.executor.submit(signatures, destination, value, &[])
    }
}

/// Send fungible tokens held by the wallet
pub struct TransferErc20Command<L: Ledger, E: CallEncoder = AbiEncoder> {
    executor: MultisigExecutor<L>,
    token: Address,
    encoder: E,
}

impl<L: Ledger> TransferErc20Command<L, AbiEncoder> {
    pub fn new(ledger: Arc<L>, sender: Address, token: Address) -> Self {
        Self::with_encoder(ledger, sender, token, AbiEncoder)
    }
}

impl<L: Ledger, E: CallEncoder> TransferErc20Command<L, E> {
    pub fn with_encoder(ledger: Arc<L>, sender: Address, token: Address, encoder: E) -> Self {
        Self {
            executor: MultisigExecutor::new(ledger, sender),
            token,
            encoder,
        }
    }

    pub fn token(&self) -> Address {
        self.token
    }

    /// Payload of the token's `transfer(recipient, amount)` call
    pub fn payload(&self, recipient: &Address, amount: u128) -> Result<Vec<u8>, MultisigError> {
        Ok(self.encoder.encode_call(
            TRANSFER_SIGNATURE,
            &[AbiValue::Address(*recipient), AbiValue::Uint(amount)],
        )?)
    }

    pub fn sign(
        &self,
        key: &KeyPair,
        nonce: u64,
        recipient: &Address,
        amount: u128,
    ) -> Result<Signature, MultisigError> {
        let data = self.payload(recipient, amount)?;
        self.executor
            .request_signature(key, nonce, &self.token, 0, &data)
    }

    pub fn execute(
        &self,
        signatures: &[Signature],
        recipient: &Address,
        amount: u128,
    ) -> Result<ExecutionResult, MultisigError> {
        let data = self.payload(recipient, amount)?;
        self.executor.submit(signatures, &self.token, 0, &data)
    }
}

/// Replace the owner set immediately, with every current owner's signature
pub struct TransferOwnershipCommand<L: TransferableLedger> {
    ledger: Arc<L>,
    sender: Address,
}

impl<L: TransferableLedger> TransferOwnershipCommand<L> {
    pub fn new(ledger: Arc<L>, sender: Address) -> Self {
        Self { ledger, sender }
    }

    pub fn sign(
        &self,
        key: &KeyPair,
        nonce: u64,
        new_owners: &[Address],
    ) -> Result<Signature, MultisigError> {
        let digest = digest(&encode_ownership(
            &self.ledger.wallet_address(),
            nonce,
            new_owners,
        ));
        Ok(key.sign_digest(&digest)?)
    }

    pub fn execute(
        &self,
        signatures: &[Signature],
        new_owners: &[Address],
    ) -> Result<ExecutionResult, MultisigError> {
        let nonce = self.ledger.current_nonce()?;
        let owners = OwnerSet::new(self.ledger.list_owners()?)?;
        let wallet = self.ledger.wallet_address();
        let digest_at = |n| digest(&encode_ownership(&wallet, n, new_owners));

        let grouped = group(&digest_at(nonce), signatures, &owners).map_err(|err| {
            diagnose_rejection(err, nonce, |past| {
                group(&digest_at(past), signatures, &owners).is_ok()
            })
        })?;

        log::debug!(
            "Submitting ownership transfer to {} owners at nonce {}",
            new_owners.len(),
            nonce
        );
        self.ledger
            .transfer_ownership(&self.sender, &grouped, new_owners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::AbiError;
    use crate::ledger::{MemoryLedger, RecoverableLedger, WalletEvent};
    use crate::multisig::WalletConfig;

    struct Setup {
        ledger: Arc<MemoryLedger>,
        keys: Vec<KeyPair>,
    }

    fn setup(n: usize) -> Setup {
        let _ = env_logger::builder().is_test(true).try_init();
        let keys: Vec<KeyPair> = (0..n).map(|_| KeyPair::generate()).collect();
        let owners: Vec<Address> = keys.iter().map(|k| k.address()).collect();
        let ledger = Arc::new(MemoryLedger::deploy(&WalletConfig::new(owners, 100)).unwrap());
        Setup { ledger, keys }
    }

    #[test]
    fn test_transfer_command() {
        let s = setup(3);
        s.ledger.deposit(&KeyPair::generate().address(), 1_000).unwrap();
        let to = KeyPair::generate().address();
        let command = TransferCommand::new(Arc::clone(&s.ledger), s.keys[2].address());

        let sigs: Vec<Signature> = s
            .keys
            .iter()
            .map(|k| command.sign(k, 0, &to, 250).unwrap())
            .collect();
        let result = command.execute(&sigs, &to, 250).unwrap();

        assert_eq!(
            result.find_last_event("Executed"),
            Some(&WalletEvent::Executed {
                destination: to,
                nonce: 0,
                value: 250,
                data: vec![],
            })
        );
        assert_eq!(s.ledger.account_balance(&to), 250);
        assert_eq!(s.ledger.balance(), 750);
    }

    #[test]
    fn test_transfer_command_sequence() {
        let s = setup(2);
        s.ledger.deposit(&KeyPair::generate().address(), 1_000).unwrap();
        let to = KeyPair::generate().address();
        let command = TransferCommand::new(Arc::clone(&s.ledger), s.keys[0].address());

        for nonce in 0..3 {
            let sigs: Vec<Signature> = s
                .keys
                .iter()
                .map(|k| command.sign(k, nonce, &to, 10).unwrap())
                .collect();
            command.execute(&sigs, &to, 10).unwrap();
        }

        assert_eq!(s.ledger.current_nonce().unwrap(), 3);
        assert_eq!(s.ledger.account_balance(&to), 30);
    }

    #[test]
    fn test_erc20_command() {
        let s = setup(2);
        let wallet = s.ledger.wallet_address();
        let token = s.ledger.deploy_token("TST", 1_000, &wallet);
        let recipient = KeyPair::generate().address();
        let command = TransferErc20Command::new(Arc::clone(&s.ledger), s.keys[1].address(), token);

        let sigs: Vec<Signature> = s
            .keys
            .iter()
            .map(|k| command.sign(k, 0, &recipient, 400).unwrap())
            .collect();
        let result = command.execute(&sigs, &recipient, 400).unwrap();

        match result.find_last_event("Executed") {
            Some(WalletEvent::Executed {
                destination,
                value,
                data,
                ..
            }) => {
                assert_eq!(*destination, token);
                assert_eq!(*value, 0);
                assert_eq!(data, &command.payload(&recipient, 400).unwrap());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(s.ledger.token_balance(&token, &recipient).unwrap(), 400);
        assert_eq!(s.ledger.token_balance(&token, &wallet).unwrap(), 600);
    }

    struct FailingEncoder;

    impl CallEncoder for FailingEncoder {
        fn encode_call(&self, signature: &str, _args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
            Err(AbiError::UnsupportedType(signature.to_string()))
        }
    }

    #[test]
    fn test_erc20_command_encoder_error() {
        let s = setup(1);
        let token = s.ledger.deploy_token("TST", 10, &s.ledger.wallet_address());
        let command = TransferErc20Command::with_encoder(
            Arc::clone(&s.ledger),
            s.keys[0].address(),
            token,
            FailingEncoder,
        );

        let recipient = KeyPair::generate().address();
        assert!(matches!(
            command.sign(&s.keys[0], 0, &recipient, 1),
            Err(MultisigError::Encoding(_))
        ));
    }

    #[test]
    fn test_transfer_ownership_command() {
        let s = setup(3);
        let new_keys: Vec<KeyPair> = (0..2).map(|_| KeyPair::generate()).collect();
        let new_owners: Vec<Address> = new_keys.iter().map(|k| k.address()).collect();
        let command = TransferOwnershipCommand::new(Arc::clone(&s.ledger), s.keys[0].address());

        let sigs: Vec<Signature> = s
            .keys
            .iter()
            .map(|k| command.sign(k, 0, &new_owners).unwrap())
            .collect();
        command.execute(&sigs, &new_owners).unwrap();

        assert_eq!(s.ledger.list_owners().unwrap(), new_owners);
        assert_eq!(s.ledger.current_nonce().unwrap(), 1);
        // Recovery state is untouched by a direct transfer
        assert!(s.ledger.recovery_hash().unwrap().is_zero());

        // The new owners now control the wallet
        let next = TransferOwnershipCommand::new(Arc::clone(&s.ledger), new_owners[1]);
        let back: Vec<Address> = s.keys.iter().map(|k| k.address()).collect();
        let sigs: Vec<Signature> = new_keys
            .iter()
            .map(|k| next.sign(k, 1, &back).unwrap())
            .collect();
        next.execute(&sigs, &back).unwrap();
        assert_eq!(s.ledger.list_owners().unwrap(), back);
    }

    #[test]
    fn test_transfer_ownership_replay_is_stale() {
        let s = setup(2);
        let same_owners: Vec<Address> = s.keys.iter().map(|k| k.address()).collect();
        let command = TransferOwnershipCommand::new(Arc::clone(&s.ledger), s.keys[0].address());

        let sigs: Vec<Signature> = s
            .keys
            .iter()
            .map(|k| command.sign(k, 0, &same_owners).unwrap())
            .collect();
        command.execute(&sigs, &same_owners).unwrap();

        assert!(matches!(
            command.execute(&sigs, &same_owners),
            Err(MultisigError::StaleNonce { signed: 0, current: 1 })
        ));
        assert_eq!(s.ledger.current_nonce().unwrap(), 1);
    }

    #[test]
    fn test_transfer_ownership_needs_all_owners() {
        let s = setup(2);
        let new_owners = vec![KeyPair::generate().address()];
        let command = TransferOwnershipCommand::new(Arc::clone(&s.ledger), s.keys[0].address());

        let sigs = vec![command.sign(&s.keys[0], 0, &new_owners).unwrap()];
        assert!(matches!(
            command.execute(&sigs, &new_owners),
            Err(MultisigError::InvalidSignatureSet(_))
        ));
        assert_eq!(s.ledger.current_nonce().unwrap(), 0);
    }

    #[test]
    fn test_ownership_signature_not_usable_for_execute() {
        // An ownership signature must not authorize a generic call
        let s = setup(1);
        s.ledger.deposit(&KeyPair::generate().address(), 100).unwrap();
        let ownership = TransferOwnershipCommand::new(Arc::clone(&s.ledger), s.keys[0].address());
        let transfer = TransferCommand::new(Arc::clone(&s.ledger), s.keys[0].address());

        let to = KeyPair::generate().address();
        let sig = ownership.sign(&s.keys[0], 0, &[to]).unwrap();
        assert!(transfer.execute(&[sig], &to, 0).is_err());
    }
}
