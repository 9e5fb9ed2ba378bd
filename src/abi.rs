//! Contract call payload encoding
//!
//! The command layer never builds calldata by hand. It asks a [`CallEncoder`]
//! to turn a method signature and arguments into an opaque payload. The
//! bundled [`AbiEncoder`] covers the static argument types the wallet needs
//! (`address`, `uint256`, `bool`): a 4-byte selector followed by one 32-byte
//! word per argument.

use crate::core::{u128_word, word_to_u128, Address, WORD_SIZE};
use crate::crypto::keccak256;
use thiserror::Error;

/// Method signature of the fungible-token transfer call
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// Errors raised while encoding or decoding call payloads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Malformed method signature: {0}")]
    MalformedSignature(String),
    #[error("Unsupported parameter type: {0}")]
    UnsupportedType(String),
    #[error("Argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Argument {index} does not match parameter type {expected}")]
    TypeMismatch { index: usize, expected: String },
    #[error("Calldata too short: {0} bytes")]
    ShortCalldata(usize),
    #[error("Value out of range in word {0}")]
    ValueOutOfRange(usize),
}

/// A single static call argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(u128),
    Bool(bool),
}

impl AbiValue {
    fn matches(&self, param: &str) -> bool {
        matches!(
            (self, param),
            (AbiValue::Address(_), "address")
                | (AbiValue::Uint(_), "uint256")
                | (AbiValue::Bool(_), "bool")
        )
    }

    fn to_word(&self) -> [u8; WORD_SIZE] {
        match self {
            AbiValue::Address(addr) => addr.to_word(),
            AbiValue::Uint(v) => u128_word(*v),
            AbiValue::Bool(b) => u128_word(u128::from(*b)),
        }
    }
}

/// Translates a method signature plus arguments into a call payload
pub trait CallEncoder {
    fn encode_call(&self, signature: &str, args: &[AbiValue]) -> Result<Vec<u8>, AbiError>;
}

/// Encoder for static-type ABI calls
#[derive(Clone, Copy, Debug, Default)]
pub struct AbiEncoder;

impl CallEncoder for AbiEncoder {
    fn encode_call(&self, signature: &str, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let params = parse_params(signature)?;
        if params.len() != args.len() {
            return Err(AbiError::ArgumentCount {
                expected: params.len(),
                actual: args.len(),
            });
        }

        let mut out = Vec::with_capacity(4 + WORD_SIZE * args.len());
        out.extend_from_slice(&selector(signature));
        for (index, (param, arg)) in params.iter().zip(args).enumerate() {
            if !arg.matches(param) {
                return Err(AbiError::TypeMismatch {
                    index,
                    expected: param.to_string(),
                });
            }
            out.extend_from_slice(&arg.to_word());
        }
        Ok(out)
    }
}

/// Compute the 4-byte selector of a method signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let bytes = hash.as_bytes();
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

/// Split calldata into its selector and argument words
pub fn decode_words(data: &[u8]) -> Result<([u8; 4], Vec<[u8; WORD_SIZE]>), AbiError> {
    if data.len() < 4 || (data.len() - 4) % WORD_SIZE != 0 {
        return Err(AbiError::ShortCalldata(data.len()));
    }
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&data[..4]);

    let words = data[4..]
        .chunks_exact(WORD_SIZE)
        .map(|chunk| {
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(chunk);
            word
        })
        .collect();
    Ok((sel, words))
}

/// Decode a `transfer(address,uint256)` payload into recipient and amount.
///
/// Returns `Ok(None)` when the payload is a different call.
pub fn decode_transfer(data: &[u8]) -> Result<Option<(Address, u128)>, AbiError> {
    let (sel, words) = decode_words(data)?;
    if sel != selector(TRANSFER_SIGNATURE) {
        return Ok(None);
    }
    if words.len() != 2 {
        return Err(AbiError::ArgumentCount {
            expected: 2,
            actual: words.len(),
        });
    }
    let recipient = Address::from_word(&words[0]);
    let amount = word_to_u128(&words[1]).ok_or(AbiError::ValueOutOfRange(1))?;
    Ok(Some((recipient, amount)))
}

fn parse_params(signature: &str) -> Result<Vec<&str>, AbiError> {
    let open = signature
        .find('(')
        .ok_or_else(|| AbiError::MalformedSignature(signature.to_string()))?;
    if open == 0 || !signature.ends_with(')') {
        return Err(AbiError::MalformedSignature(signature.to_string()));
    }

    let inner = &signature[open + 1..signature.len() - 1];
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|param| match param {
            "address" | "uint256" | "bool" => Ok(param),
            "" => Err(AbiError::MalformedSignature(signature.to_string())),
            other => Err(AbiError::UnsupportedType(other.to_string())),
        })
        .collect()
}
