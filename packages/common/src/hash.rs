//! keccak256 and 32-byte hex helpers.

use tiny_keccak::{Hasher, Keccak};

/// A 32-byte hash, state root, asset id or L2 address.
pub type Bytes32 = [u8; 32];

/// Compute keccak256 of arbitrary data
pub fn keccak256(data: &[u8]) -> Bytes32 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute keccak256 over several slices without concatenating them first.
pub fn keccak256_concat(parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Render 32 bytes as a lowercase `0x`-prefixed hex string.
pub fn bytes32_to_hex(bytes: &Bytes32) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a `0x`-prefixed (or bare) 64-character hex string into 32 bytes.
///
/// Returns `None` for any other length or non-hex input.
pub fn parse_bytes32_hex(input: &str) -> Option<Bytes32> {
    let stripped = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if stripped.len() != 64 {
        return None;
    }
    let decoded = hex::decode(stripped).ok()?;
    decoded.try_into().ok()
}
