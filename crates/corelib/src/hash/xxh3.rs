//! Seeded XXH3 hash over the key's little-endian bytes.

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::hash::traits::{reduce, HashFunction};
use crate::ring::Key;

/// XXH3-64 with a caller-chosen seed. Different seeds give independent
/// placements, which makes this a convenient source of ring pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xxh3 {
    pub seed: u64,
}

impl Xxh3 {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl HashFunction for Xxh3 {
    fn hash(&self, value: Key, keyspace_size: u64) -> u64 {
        let mixed = xxh3_64_with_seed(&value.to_le_bytes(), self.seed);
        reduce(mixed as i64, keyspace_size)
    }

    fn name(&self) -> &'static str {
        "Xxh3"
    }
}
