//! Hash ring data structure.
//!
//! Holds a `BTreeMap<Position, ServerSlot>` and the clockwise lookup logic.
//! Every key lives in the slot returned by [`Ring::lookup`] for that key;
//! server joins and leaves preserve this by draining and reinserting the
//! affected keys.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::hash::{Avalanche, HashFunction};
use crate::ring::position::Position;
use crate::ring::slot::{Key, ServerSlot};
use crate::stats::LoadStats;

/// Outcome of a topology change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rebalance {
    /// The server that was added or removed.
    pub position: Position,
    /// Keys drained and reinserted by the change.
    pub moved: usize,
    /// Slots that went over the overflow threshold during reinsertion.
    pub overflowed: Vec<Position>,
}

/// A consistent hashing ring with per-slot key lists.
///
/// # Invariants
///
/// - Every slot position lies in `[0, keyspace_size)`.
/// - The ring always holds at least one slot: construction rejects zero
///   servers and removing the last server fails.
/// - `key_count` equals the sum of all slot lengths.
#[derive(Debug, Clone)]
pub struct Ring<H = Avalanche> {
    slots: BTreeMap<Position, ServerSlot>,
    keyspace_size: u64,
    overflow_threshold: usize,
    key_count: usize,
    hasher: H,
    rng: StdRng,
}

impl Ring<Avalanche> {
    /// Creates a ring of `servers` evenly spaced servers using the default
    /// hash function.
    pub fn new(keyspace_size: u64, servers: usize) -> Result<Self> {
        Self::with_hasher(keyspace_size, servers, Avalanche::default())
    }
}

impl<H: HashFunction> Ring<H> {
    pub fn with_hasher(keyspace_size: u64, servers: usize, hasher: H) -> Result<Self> {
        Self::with_config(RingConfig::new(keyspace_size, servers), hasher)
    }

    pub fn with_config(config: RingConfig, hasher: H) -> Result<Self> {
        config.validate()?;

        let slots = (0..config.servers)
            .map(|i| {
                (
                    Position::evenly_spaced(i, config.servers, config.keyspace_size),
                    ServerSlot::new(),
                )
            })
            .collect();

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            slots,
            keyspace_size: config.keyspace_size,
            overflow_threshold: config.overflow_threshold,
            key_count: 0,
            hasher,
            rng,
        })
    }

    #[inline]
    pub fn keyspace_size(&self) -> u64 {
        self.keyspace_size
    }

    #[inline]
    pub fn overflow_threshold(&self) -> usize {
        self.overflow_threshold
    }

    #[inline]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Returns the position of the server responsible for `key`.
    ///
    /// Hashes the key onto the ring and walks clockwise to the first server,
    /// wrapping past the end of the keyspace to the lowest position.
    ///
    /// # Performance
    /// - **Time**: O(log n) where n = number of servers
    pub fn lookup(&self, key: Key) -> Position {
        self.successor(self.hasher.hash(key, self.keyspace_size))
    }

    /// First server position at or clockwise after `point`.
    pub fn successor(&self, point: u64) -> Position {
        self.slots
            .range(Position(point)..)
            .next()
            .or_else(|| self.slots.iter().next())
            .map(|(position, _)| *position)
            .expect("ring always holds at least one slot")
    }

    /// Places `key` on its server.
    ///
    /// Returns the server's position if it now holds strictly more keys than
    /// the overflow threshold, `None` otherwise.
    pub fn insert(&mut self, key: Key) -> Option<Position> {
        let position = self.lookup(key);
        let threshold = self.overflow_threshold;
        let slot = self.slot_mut(position);
        slot.push(key);
        let overflowing = slot.len() > threshold;
        self.key_count += 1;
        overflowing.then_some(position)
    }

    /// Removes the first occurrence of `key`. Returns `false` if absent.
    pub fn remove(&mut self, key: Key) -> bool {
        let position = self.lookup(key);
        let removed = self.slot_mut(position).remove_first(key);
        if removed {
            self.key_count -= 1;
        }
        removed
    }

    /// True if `key` is stored on its server.
    pub fn contains(&self, key: Key) -> bool {
        self.slots
            .get(&self.lookup(key))
            .map_or(false, |slot| slot.contains(key))
    }

    // ------------------------------------------------------------------
    // Topology
    // ------------------------------------------------------------------

    /// Adds a server at `position`.
    ///
    /// The new server splits the segment of its clockwise successor, so the
    /// successor's keys are drained and reinserted; those hashing before the
    /// new position now land on it.
    pub fn add_server(&mut self, position: Position) -> Result<Rebalance> {
        if position.0 >= self.keyspace_size {
            return Err(Error::PositionOutOfRange {
                position: position.0,
                keyspace_size: self.keyspace_size,
            });
        }
        if self.slots.contains_key(&position) {
            return Err(Error::SlotOccupied(position));
        }

        let successor = self.successor(position.0);
        self.slots.insert(position, ServerSlot::new());

        let keys = self.take_keys(successor);
        let moved = keys.len();
        let overflowed = self.reinsert(keys);

        metrics::counter!("ring_servers_added_total").increment(1);
        debug!(%position, %successor, moved, "added server to ring");

        Ok(Rebalance {
            position,
            moved,
            overflowed,
        })
    }

    /// Adds a server at a uniformly random unoccupied position.
    pub fn add_random_server(&mut self) -> Result<Rebalance> {
        if self.slots.len() as u64 >= self.keyspace_size {
            return Err(Error::KeyspaceExhausted);
        }
        let position = loop {
            let candidate = Position(self.rng.gen_range(0..self.keyspace_size));
            if !self.slots.contains_key(&candidate) {
                break candidate;
            }
        };
        self.add_server(position)
    }

    /// Removes the server at `position` and reinserts its keys, which move
    /// to their new clockwise owners.
    ///
    /// Missing positions fail with [`Error::SlotNotFound`] and leave the
    /// ring untouched.
    pub fn remove_server(&mut self, position: Position) -> Result<Rebalance> {
        if self.slots.len() == 1 {
            return Err(if self.slots.contains_key(&position) {
                Error::LastServer
            } else {
                Error::SlotNotFound(position)
            });
        }

        let keys = self
            .slots
            .remove(&position)
            .ok_or(Error::SlotNotFound(position))?
            .take();
        self.key_count -= keys.len();

        let moved = keys.len();
        let overflowed = self.reinsert(keys);

        metrics::counter!("ring_servers_removed_total").increment(1);
        debug!(%position, moved, "removed server from ring");

        Ok(Rebalance {
            position,
            moved,
            overflowed,
        })
    }

    /// Removes the server owning a uniformly random keyspace point.
    pub fn remove_random_server(&mut self) -> Result<Rebalance> {
        if self.slots.len() == 1 {
            return Err(Error::LastServer);
        }
        let point = self.rng.gen_range(0..self.keyspace_size);
        let position = self.successor(point);
        self.remove_server(position)
    }

    /// Empties the server at `position` without reinserting its keys. The
    /// server stays on the ring. Returns `false` if no server sits there.
    pub fn clear_server(&mut self, position: Position) -> bool {
        self.drain_server(position).is_some()
    }

    /// Empties the server at `position` and hands its keys to the caller.
    /// The server stays on the ring.
    pub fn drain_server(&mut self, position: Position) -> Option<Vec<Key>> {
        let keys = self.slots.get_mut(&position)?.take();
        self.key_count -= keys.len();
        Some(keys)
    }

    /// Keys currently assigned to the server at `position`.
    pub fn get_keys(&self, position: Position) -> Option<&[Key]> {
        self.slots.get(&position).map(ServerSlot::keys)
    }

    pub fn contains_server(&self, position: Position) -> bool {
        self.slots.contains_key(&position)
    }

    /// Server positions in clockwise order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.slots.keys().copied()
    }

    /// `(position, key count)` for every server, in clockwise order.
    pub fn loads(&self) -> impl Iterator<Item = (Position, usize)> + Clone + '_ {
        self.slots.iter().map(|(position, slot)| (*position, slot.len()))
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Total keys on the ring. Maintained incrementally, O(1).
    #[inline]
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    pub fn max_load(&self) -> usize {
        self.slots.values().map(ServerSlot::len).max().unwrap_or(0)
    }

    pub fn min_load(&self) -> usize {
        self.slots.values().map(ServerSlot::len).min().unwrap_or(0)
    }

    pub fn average_load(&self) -> f64 {
        self.key_count as f64 / self.slots.len() as f64
    }

    pub fn load_variance(&self) -> f64 {
        self.stats().variance
    }

    /// Sum of squared slot sizes.
    pub fn cost(&self) -> u64 {
        self.slots
            .values()
            .map(|slot| (slot.len() as u64) * (slot.len() as u64))
            .sum()
    }

    pub fn stats(&self) -> LoadStats {
        LoadStats::from_loads(self.loads().map(|(_, load)| load))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn slot_mut(&mut self, position: Position) -> &mut ServerSlot {
        self.slots
            .get_mut(&position)
            .expect("lookup only returns existing positions")
    }

    fn take_keys(&mut self, position: Position) -> Vec<Key> {
        self.drain_server(position).unwrap_or_default()
    }

    /// Reinserts `keys`, returning each overflowing position once.
    fn reinsert(&mut self, keys: Vec<Key>) -> Vec<Position> {
        let mut overflowed = Vec::new();
        for key in keys {
            if let Some(position) = self.insert(key) {
                if !overflowed.contains(&position) {
                    overflowed.push(position);
                }
            }
        }
        overflowed
    }
}

/// Builder for rings with non-default settings.
///
/// ```rust
/// use corelib::hash::SplitMix64;
/// use corelib::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .keyspace_size(1 << 20)
///     .servers(16)
///     .overflow_threshold(32)
///     .seed(7)
///     .hasher(SplitMix64)
///     .build()
///     .unwrap();
/// assert_eq!(ring.slot_count(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder<H = Avalanche> {
    config: RingConfig,
    hasher: H,
}

impl RingBuilder<Avalanche> {
    pub fn new() -> Self {
        Self {
            config: RingConfig::default(),
            hasher: Avalanche::default(),
        }
    }
}

impl Default for RingBuilder<Avalanche> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashFunction> RingBuilder<H> {
    pub fn keyspace_size(mut self, keyspace_size: u64) -> Self {
        self.config.keyspace_size = keyspace_size;
        self
    }

    pub fn servers(mut self, servers: usize) -> Self {
        self.config.servers = servers;
        self
    }

    pub fn overflow_threshold(mut self, overflow_threshold: usize) -> Self {
        self.config.overflow_threshold = overflow_threshold;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Replaces the hash function, changing the ring's hasher type.
    pub fn hasher<H2: HashFunction>(self, hasher: H2) -> RingBuilder<H2> {
        RingBuilder {
            config: self.config,
            hasher,
        }
    }

    pub fn build(self) -> Result<Ring<H>> {
        Ring::with_config(self.config, self.hasher)
    }
}
