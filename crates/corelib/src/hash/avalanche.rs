//! Shift/XOR/add avalanche mixer.
//!
//! Six rounds of shifts, XORs and additive constants in the style of Bob
//! Jenkins' 32-bit integer hash, evaluated in wrapping 64-bit signed
//! arithmetic. Two constant sets are provided so a ring pair can use the same
//! mixer shape with uncorrelated outputs.

use crate::hash::traits::{reduce, HashFunction};
use crate::ring::Key;

/// Avalanche mixer parameterised by its six additive/XOR constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Avalanche {
    constants: [i64; 6],
    name: &'static str,
}

impl Avalanche {
    /// Constant set used by the left ring of a pair and by plain rings.
    pub const LEFT: Avalanche = Avalanche {
        constants: [
            0x7ed5_5d16,
            0xc761_c23c,
            0x1656_67b1,
            0xd3a2_646c,
            0xfd70_46c5,
            0xb55a_4f09,
        ],
        name: "Avalanche(left)",
    };

    /// Alternative constant set.
    pub const RIGHT: Avalanche = Avalanche {
        constants: [
            0x7ed5_5d15,
            0xc741_c20c,
            0x1256_67b1,
            0xf3a2_646c,
            0xfd70_46c5,
            0xb55b_4f09,
        ],
        name: "Avalanche(right)",
    };

    /// Raw mixed value before reduction into the keyspace.
    #[inline]
    pub fn mix(&self, value: Key) -> i64 {
        let [c0, c1, c2, c3, c4, c5] = self.constants;
        let mut a = value;
        a = a.wrapping_add(c0).wrapping_add(a << 12);
        a = (a ^ c1) ^ (a >> 19);
        a = a.wrapping_add(c2).wrapping_add(a << 5);
        a = a.wrapping_add(c3) ^ (a << 9);
        a = a.wrapping_add(c4).wrapping_add(a << 3);
        (a ^ c5) ^ (a >> 16)
    }
}

impl Default for Avalanche {
    fn default() -> Self {
        Avalanche::LEFT
    }
}

impl HashFunction for Avalanche {
    fn hash(&self, value: Key, keyspace_size: u64) -> u64 {
        reduce(self.mix(value), keyspace_size)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let h = Avalanche::LEFT;
        assert_eq!(h.hash(12345, 1 << 32), h.hash(12345, 1 << 32));
    }

    #[test]
    fn test_in_range_for_negative_keys() {
        for key in [-1, i64::MIN, -987_654_321, 0, i64::MAX] {
            assert!(Avalanche::LEFT.hash(key, 1_000) < 1_000);
            assert!(Avalanche::RIGHT.hash(key, 1_000) < 1_000);
        }
    }

    #[test]
    fn test_constant_sets_disagree() {
        let differing = (0..1_000)
            .filter(|&k| Avalanche::LEFT.hash(k, 1 << 32) != Avalanche::RIGHT.hash(k, 1 << 32))
            .count();
        assert!(differing > 990);
    }

    #[test]
    fn test_sequential_keys_spread() {
        // Sequential keys should not pile into one corner of the keyspace.
        let kss = 1 << 32;
        let low = (0..10_000)
            .filter(|&k| Avalanche::LEFT.hash(k, kss) < kss / 2)
            .count();
        assert!((3_000..7_000).contains(&low), "low half got {}", low);
    }
}
