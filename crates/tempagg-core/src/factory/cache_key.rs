//! Deterministic cache keys and fingerprints for aggregator factories.
#![expect(clippy::cast_possible_truncation)]

use crate::{direction::Direction, value::ColumnType};
use sha2::{Digest, Sha256};

///
/// CONSTANTS
///

pub(crate) const DOUBLE_FIRST_CACHE_TYPE_ID: u8 = 0x10;
pub(crate) const DOUBLE_LAST_CACHE_TYPE_ID: u8 = 0x11;
pub(crate) const FLOAT_FIRST_CACHE_TYPE_ID: u8 = 0x12;
pub(crate) const FLOAT_LAST_CACHE_TYPE_ID: u8 = 0x13;
pub(crate) const LONG_FIRST_CACHE_TYPE_ID: u8 = 0x14;
pub(crate) const LONG_LAST_CACHE_TYPE_ID: u8 = 0x15;
pub(crate) const STRING_FIRST_CACHE_TYPE_ID: u8 = 0x16;
pub(crate) const STRING_LAST_CACHE_TYPE_ID: u8 = 0x17;

/// Cache type id for one (value family, direction) pair.
#[must_use]
pub const fn cache_type_id(column: ColumnType, direction: Direction) -> u8 {
    match (column, direction) {
        (ColumnType::Double, Direction::Earliest) => DOUBLE_FIRST_CACHE_TYPE_ID,
        (ColumnType::Double, Direction::Latest) => DOUBLE_LAST_CACHE_TYPE_ID,
        (ColumnType::Float, Direction::Earliest) => FLOAT_FIRST_CACHE_TYPE_ID,
        (ColumnType::Float, Direction::Latest) => FLOAT_LAST_CACHE_TYPE_ID,
        (ColumnType::Long, Direction::Earliest) => LONG_FIRST_CACHE_TYPE_ID,
        (ColumnType::Long, Direction::Latest) => LONG_LAST_CACHE_TYPE_ID,
        (ColumnType::String, Direction::Earliest) => STRING_FIRST_CACHE_TYPE_ID,
        (ColumnType::String, Direction::Latest) => STRING_LAST_CACHE_TYPE_ID,
    }
}

///
/// CacheKeyBuilder
///
/// Encodes `[type id][varint len][bytes]...` so that every appended part is
/// length-delimited and the whole key is injective over its parts.
///

#[derive(Clone, Debug)]
pub struct CacheKeyBuilder {
    bytes: Vec<u8>,
}

impl CacheKeyBuilder {
    #[must_use]
    pub fn new(type_id: u8) -> Self {
        Self {
            bytes: vec![type_id],
        }
    }

    #[must_use]
    pub fn append_str(mut self, value: &str) -> Self {
        write_varint(&mut self.bytes, value.len() as u64);
        self.bytes.extend_from_slice(value.as_bytes());
        self
    }

    #[must_use]
    pub fn append_usize(mut self, value: usize) -> Self {
        write_varint(&mut self.bytes, value as u64);
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

// Unsigned LEB128.
fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

///
/// AggregatorFingerprint
///
/// Stable SHA-256 fingerprint of one factory cache key.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AggregatorFingerprint([u8; 32]);

impl AggregatorFingerprint {
    /// Fingerprint a cache key under the versioned fingerprint domain.
    #[must_use]
    pub fn of_cache_key(cache_key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"aggfp:v1");
        hasher.update(cache_key);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

impl std::fmt::Display for AggregatorFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_encodes_lengths_compactly() {
        let key = CacheKeyBuilder::new(0x14).append_str("ab").build();
        assert_eq!(key, vec![0x14, 2, b'a', b'b']);

        let long = "x".repeat(300);
        let key = CacheKeyBuilder::new(0x14).append_str(&long).build();
        assert_eq!(&key[..3], &[0x14, 0xac, 0x02]);
        assert_eq!(key.len(), 3 + 300);
    }

    #[test]
    fn length_prefix_separates_adjacent_parts() {
        let left = CacheKeyBuilder::new(1).append_str("ab").append_str("c").build();
        let right = CacheKeyBuilder::new(1).append_str("a").append_str("bc").build();

        assert_ne!(left, right);
    }

    #[test]
    fn type_ids_are_distinct_per_family_and_direction() {
        let mut ids = Vec::new();
        for column in [
            ColumnType::Double,
            ColumnType::Float,
            ColumnType::Long,
            ColumnType::String,
        ] {
            for direction in [Direction::Earliest, Direction::Latest] {
                ids.push(cache_type_id(column, direction));
            }
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let a = AggregatorFingerprint::of_cache_key(&[1, 2, 3]);
        let b = AggregatorFingerprint::of_cache_key(&[1, 2, 3]);
        let c = AggregatorFingerprint::of_cache_key(&[1, 2, 4]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_hex().len(), 64);
        assert_eq!(a.to_string(), a.as_hex());
    }
}
