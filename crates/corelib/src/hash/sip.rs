//! Keyed SipHash-1-3.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::hash::traits::{reduce, HashFunction};
use crate::ring::Key;

/// SipHash-1-3 keyed with a 128-bit key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SipHash13 {
    k0: u64,
    k1: u64,
}

impl SipHash13 {
    pub fn new_with_keys(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }
}

impl HashFunction for SipHash13 {
    fn hash(&self, value: Key, keyspace_size: u64) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(self.k0, self.k1);
        hasher.write(&value.to_le_bytes());
        reduce(hasher.finish() as i64, keyspace_size)
    }

    fn name(&self) -> &'static str {
        "SipHash13"
    }
}
