//! Thread-safe handle around a cuckoo ring pair.
//!
//! A single insert can touch slots on both rings, so the pair is guarded as
//! one unit: every mutation takes the write lock for the whole pair. Reads
//! take the read lock and return owned snapshots, so no borrow into a slot
//! outlives the lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::CuckooConfig;
use crate::cuckoo::{CuckooRings, InsertOutcome, Side};
use crate::error::Result;
use crate::hash::{Avalanche, HashFunction, SplitMix64};
use crate::ring::{Key, Position, Rebalance};
use crate::stats::PairStats;

/// Cloneable, lock-guarded [`CuckooRings`].
///
/// ```rust
/// use corelib::SharedCuckooRings;
///
/// let rings = SharedCuckooRings::new(1 << 32, 8).unwrap();
/// let writer = rings.clone();
/// std::thread::spawn(move || {
///     for key in 0..100 {
///         writer.insert(key);
///     }
/// })
/// .join()
/// .unwrap();
/// assert_eq!(rings.stats().total_keys, 100);
/// ```
#[derive(Debug)]
pub struct SharedCuckooRings<L = Avalanche, R = SplitMix64> {
    inner: Arc<RwLock<CuckooRings<L, R>>>,
}

impl<L, R> Clone for SharedCuckooRings<L, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedCuckooRings<Avalanche, SplitMix64> {
    pub fn new(keyspace_size: u64, servers_per_ring: usize) -> Result<Self> {
        Ok(Self::from_rings(CuckooRings::new(
            keyspace_size,
            servers_per_ring,
        )?))
    }

    pub fn with_config(config: CuckooConfig) -> Result<Self> {
        Ok(Self::from_rings(CuckooRings::with_config(config)?))
    }
}

impl<L: HashFunction, R: HashFunction> SharedCuckooRings<L, R> {
    pub fn from_rings(rings: CuckooRings<L, R>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(rings)),
        }
    }

    pub fn insert(&self, key: Key) -> InsertOutcome {
        self.inner.write().insert(key)
    }

    pub fn remove(&self, key: Key) -> bool {
        self.inner.write().remove(key)
    }

    pub fn locate(&self, key: Key) -> Option<(Side, Position)> {
        self.inner.read().locate(key)
    }

    pub fn add_random_server(&self, side: Side) -> Result<Rebalance> {
        self.inner.write().add_random_server(side)
    }

    pub fn remove_random_server(&self, side: Side) -> Result<Rebalance> {
        self.inner.write().remove_random_server(side)
    }

    /// Keys currently held by one server, copied out under the read lock.
    pub fn keys_at(&self, side: Side, position: Position) -> Option<Vec<Key>> {
        let rings = self.inner.read();
        let keys = match side {
            Side::Left => rings.left().get_keys(position),
            Side::Right => rings.right().get_keys(position),
        };
        keys.map(<[Key]>::to_vec)
    }

    pub fn stats(&self) -> PairStats {
        self.inner.read().stats()
    }

    /// Runs `f` with shared access to the pair.
    pub fn read<T>(&self, f: impl FnOnce(&CuckooRings<L, R>) -> T) -> T {
        let guard = self.inner.read();
        f(&*guard)
    }

    /// Runs `f` with exclusive access to the pair, for batches of operations
    /// that must not interleave with other writers.
    pub fn write<T>(&self, f: impl FnOnce(&mut CuckooRings<L, R>) -> T) -> T {
        let mut guard = self.inner.write();
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_inserts_conserve_keys() {
        let rings = SharedCuckooRings::new(1 << 32, 16).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let rings = rings.clone();
                thread::spawn(move || {
                    for key in 0..250 {
                        rings.insert(t * 1_000 + key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = rings.stats();
        assert_eq!(stats.total_keys, 1_000);
        assert_eq!(stats.total_servers, 32);
    }

    #[test]
    fn test_keys_at_returns_copy() {
        let rings = SharedCuckooRings::new(1 << 32, 4).unwrap();
        rings.insert(42);
        let (side, position) = rings.locate(42).unwrap();
        let keys = rings.keys_at(side, position).unwrap();
        assert_eq!(keys, vec![42]);

        // The copy is unaffected by later mutation of the slot.
        assert!(rings.remove(42));
        assert_eq!(keys, vec![42]);
        assert_eq!(rings.keys_at(side, position), Some(vec![]));
    }

    #[test]
    fn test_write_batches() {
        let rings = SharedCuckooRings::with_config(CuckooConfig::new(1 << 32, 4).with_seed(9))
            .unwrap();
        let added = rings.write(|pair| {
            pair.insert(1);
            pair.add_random_server(Side::Right)
        });
        assert!(added.is_ok());
        assert_eq!(rings.read(|pair| pair.total_server_count()), 9);
    }
}
