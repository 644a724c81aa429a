//! # Core Identifiers
//!
//! Raw on-chain identifiers are fixed 32-byte words. Their text form is
//! lowercase hex without a `0x` prefix, which is also what serde emits, so a
//! `PeerId` can be used directly as a JSON map key.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 for the 256-bit DON id lists carried by node records
pub use primitive_types::U256;

/// A raw 32-byte word as returned by the registry contract.
pub type Bytes32 = [u8; 32];

/// Identifier of a DON in the capability registry. The registry never
/// assigns 0.
pub type DonId = u32;

/// Errors from parsing identifier text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Peer identifier of a node on the DON network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PeerId(pub Bytes32);

impl PeerId {
    /// Wrap raw bytes.
    pub const fn new(bytes: Bytes32) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &Bytes32 {
        &self.0
    }
}

impl From<Bytes32> for PeerId {
    fn from(bytes: Bytes32) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for PeerId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bytes32_from_hex(s).map(Self)
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Parse a 32-byte word from hex, with or without a `0x` prefix.
pub fn bytes32_from_hex(s: &str) -> Result<Bytes32, IdParseError> {
    let raw = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| IdParseError::InvalidHex(e.to_string()))?;
    <Bytes32>::try_from(raw.as_slice()).map_err(|_| IdParseError::InvalidLength {
        expected: 32,
        actual: raw.len(),
    })
}

/// Serde adapter for `Bytes32` fields stored as hex text.
pub mod hex_bytes32 {
    use super::{bytes32_from_hex, Bytes32};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes32, D::Error> {
        let s = String::deserialize(deserializer)?;
        bytes32_from_hex(&s).map_err(de::Error::custom)
    }
}

/// Serde adapter for variable-length byte fields stored as hex text.
pub mod hex_vec {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(de::Error::custom)
    }
}

/// Serde adapter for `Vec<Bytes32>` fields stored as a list of hex strings.
pub mod hex_bytes32_vec {
    use super::{bytes32_from_hex, Bytes32};
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(words: &[Bytes32], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(words.len()))?;
        for word in words {
            seq.serialize_element(&hex::encode(word))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Bytes32>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| bytes32_from_hex(s).map_err(de::Error::custom))
            .collect()
    }
}
