//! Capability identifiers.
//!
//! A capability's full id is `name@version`. The registry contract keys
//! capabilities by `keccak256(abi.encode(name, version))`.

use sha3::{Digest, Keccak256};
use shared_types::Bytes32;

/// Build the full id `name@version`.
pub fn capability_id(name: &str, version: &str) -> String {
    format!("{name}@{version}")
}

/// Split a full id into `(name, version)`.
///
/// Returns `None` unless there is exactly one `@` with text on both sides.
pub fn parse_capability_id(id: &str) -> Option<(&str, &str)> {
    let (name, version) = id.split_once('@')?;
    if name.is_empty() || version.is_empty() || version.contains('@') {
        return None;
    }
    Some((name, version))
}

/// On-chain key of a capability: Keccak-256 over the ABI encoding of
/// `(string name, string version)`.
pub fn hashed_capability_id(name: &str, version: &str) -> Bytes32 {
    let name_tail = abi_string_tail(name);
    let mut encoded = Vec::with_capacity(64 + name_tail.len() + 64 + version.len());
    encoded.extend_from_slice(&abi_word(64));
    encoded.extend_from_slice(&abi_word(64 + name_tail.len()));
    encoded.extend_from_slice(&name_tail);
    encoded.extend_from_slice(&abi_string_tail(version));

    let mut hashed = [0u8; 32];
    hashed.copy_from_slice(&Keccak256::digest(&encoded));
    hashed
}

fn abi_word(value: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Length word followed by the bytes right-padded to a 32-byte boundary.
fn abi_string_tail(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let padded = bytes.len().div_ceil(32) * 32;
    let mut tail = Vec::with_capacity(32 + padded);
    tail.extend_from_slice(&abi_word(bytes.len()));
    tail.extend_from_slice(bytes);
    tail.resize(32 + padded, 0);
    tail
}
