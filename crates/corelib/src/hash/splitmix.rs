//! SplitMix64 finalizer.

use crate::hash::traits::{reduce, HashFunction};
use crate::ring::Key;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// The SplitMix64 output function, used as a stateless 64-bit mixer.
///
/// Default right-hand hash of a cuckoo ring pair: its structure has nothing
/// in common with [`Avalanche`](crate::hash::Avalanche), so the two rings
/// place keys independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitMix64;

impl SplitMix64 {
    #[inline]
    pub fn mix(value: Key) -> u64 {
        let mut z = (value as u64).wrapping_add(GOLDEN_GAMMA);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl HashFunction for SplitMix64 {
    fn hash(&self, value: Key, keyspace_size: u64) -> u64 {
        reduce(Self::mix(value) as i64, keyspace_size)
    }

    fn name(&self) -> &'static str {
        "SplitMix64"
    }
}
