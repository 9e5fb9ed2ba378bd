//! Hex and fixed-width word helpers
//!
//! Every field that goes into a signed message or an ABI call is laid out as a
//! 32-byte big-endian word. These helpers are the single place that padding
//! happens, so signers and verifiers cannot drift apart.

/// Width of one encoded word in bytes
pub const WORD_SIZE: usize = 32;

/// Strip an optional `0x`/`0X` prefix
pub fn strip_hex(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Encode bytes as a `0x`-prefixed lowercase hex string
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string, with or without `0x` prefix
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(strip_hex(value))
}

/// Left-pad a byte slice with zeros to a 32-byte word.
///
/// Returns `None` if the input is wider than a word.
pub fn pad_left(bytes: &[u8]) -> Option<[u8; WORD_SIZE]> {
    if bytes.len() > WORD_SIZE {
        return None;
    }
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(bytes);
    Some(word)
}

/// Encode an unsigned 64-bit integer as a big-endian word
pub fn u64_word(value: u64) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encode an unsigned 128-bit integer as a big-endian word
pub fn u128_word(value: u128) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Read a big-endian word back as `u128`.
///
/// Returns `None` when the upper 16 bytes are not zero.
pub fn word_to_u128(word: &[u8; WORD_SIZE]) -> Option<u128> {
    if word[..WORD_SIZE - 16].iter().any(|&b| b != 0) {
        return None;
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[WORD_SIZE - 16..]);
    Some(u128::from_be_bytes(buf))
}
