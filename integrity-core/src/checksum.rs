//! Digest primitives
//!
//! - `checksum`: Blake3 hash of a segment or shard
//! - `root_hash`: Blake3 hash over an ordered list of checksums
//!
//! The root hash is order-sensitive: the same checksums in a different
//! order produce a different root.

use crate::error::{IntegrityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Checksum size in bytes
pub const CHECKSUM_SIZE: usize = 32;

/// Blake3 hash wrapper used for segment, shard and root hashes
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum(blake3::Hash);

impl Checksum {
    /// Compute the checksum of data
    pub fn compute(data: &[u8]) -> Self {
        Self(blake3::hash(data))
    }

    /// Wrap raw hash bytes
    pub fn from_bytes(bytes: [u8; CHECKSUM_SIZE]) -> Self {
        Self(blake3::Hash::from_bytes(bytes))
    }

    /// Get the raw hash bytes
    pub fn as_bytes(&self) -> &[u8; CHECKSUM_SIZE] {
        self.0.as_bytes()
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// Parse from hex string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hash = blake3::Hash::from_hex(hex)
            .map_err(|e| IntegrityError::Configuration(format!("invalid checksum hex: {}", e)))?;
        Ok(Self(hash))
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Checksum {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(self.as_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex = String::deserialize(deserializer)?;
            return Self::from_hex(&hex).map_err(serde::de::Error::custom);
        }
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        if bytes.len() != CHECKSUM_SIZE {
            return Err(serde::de::Error::custom("Invalid checksum length"));
        }
        let mut arr = [0u8; CHECKSUM_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_bytes(arr))
    }
}

/// Checksum of a segment or shard
pub fn checksum(data: &[u8]) -> Checksum {
    Checksum::compute(data)
}

/// Combine an ordered list of checksums into a single root
pub fn root_hash(checksums: &[Checksum]) -> Checksum {
    let mut hasher = blake3::Hasher::new();
    for sum in checksums {
        hasher.update(sum.as_bytes());
    }
    Checksum(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        let data = b"hello world";
        let sum = checksum(data);

        assert_eq!(sum, checksum(data));
        assert_ne!(sum, checksum(b"different data"));
        assert_eq!(sum.as_bytes(), blake3::hash(data).as_bytes());
    }

    #[test]
    fn test_hex_roundtrip() {
        let sum = checksum(b"hex");
        let parsed = Checksum::from_hex(&sum.to_hex()).unwrap();
        assert_eq!(sum, parsed);
        assert!(Checksum::from_hex("not hex").is_err());
    }

    #[test]
    fn test_root_hash_is_order_sensitive() {
        let a = checksum(b"a");
        let b = checksum(b"b");
        assert_ne!(root_hash(&[a, b]), root_hash(&[b, a]));
    }

    #[test]
    fn test_root_hash_matches_concatenation() {
        let a = checksum(b"first");
        let b = checksum(b"second");

        let mut concat = Vec::new();
        concat.extend_from_slice(a.as_bytes());
        concat.extend_from_slice(b.as_bytes());

        assert_eq!(root_hash(&[a, b]), checksum(&concat));
    }

    #[test]
    fn test_root_hash_of_empty_list() {
        assert_eq!(root_hash(&[]), checksum(b""));
    }

    #[test]
    fn test_serde_json_uses_hex() {
        let sum = checksum(b"serde");
        let json = serde_json::to_string(&sum).unwrap();
        assert_eq!(json, format!("\"{}\"", sum.to_hex()));

        let back: Checksum = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sum);
    }

    #[test]
    fn test_binary_serde_uses_raw_bytes() {
        let sum = checksum(b"bincode");
        let encoded = bincode::serialize(&sum).unwrap();

        // u64 length prefix, then the digest
        assert_eq!(encoded.len(), 8 + CHECKSUM_SIZE);
        assert_eq!(&encoded[8..], sum.as_bytes());

        let back: Checksum = bincode::deserialize(&encoded).unwrap();
        assert_eq!(back, sum);
    }
}
