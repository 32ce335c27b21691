//! The cuckoo ring pair.

use tracing::{debug, trace};

use crate::config::CuckooConfig;
use crate::cuckoo::displacement::{DisplacementQueue, HopBudget};
use crate::cuckoo::side::Side;
use crate::error::{Error, Result};
use crate::hash::{Avalanche, HashFunction, SplitMix64};
use crate::ring::{Key, Position, Rebalance, Ring};
use crate::stats::{LoadStats, PairStats};

/// Keys sampled when checking that the two hash functions disagree.
const INDEPENDENCE_SAMPLE: Key = 64;

/// Keyspace the independence sample is hashed into. Fixed and wide, so a
/// tiny configured keyspace cannot make distinct functions collide.
const INDEPENDENCE_KEYSPACE: u64 = 1 << 32;

/// What a top-level [`CuckooRings::insert`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Ring the key was first placed on.
    pub side: Side,
    /// Drain-and-flip operations performed, never more than the hop limit.
    pub drains: usize,
    /// True if the chain stopped at the hop limit with overflow left over.
    pub exhausted: bool,
}

/// Two consistent hashing rings balanced against each other.
///
/// Both rings share a keyspace but hash keys independently, so a key that
/// lands on a crowded server in one ring usually lands somewhere quieter in
/// the other. Overflowing servers are drained into the sibling ring.
///
/// Every key sits in the lookup slot of whichever ring currently holds it,
/// which is what [`locate`](Self::locate) and [`remove`](Self::remove) use.
#[derive(Debug, Clone)]
pub struct CuckooRings<L = Avalanche, R = SplitMix64> {
    left: Ring<L>,
    right: Ring<R>,
    hop_limit: usize,
    displacements: u64,
    exhausted_chains: u64,
}

impl CuckooRings<Avalanche, SplitMix64> {
    /// Creates a pair with `servers_per_ring` evenly spaced servers on each
    /// ring and default settings otherwise.
    pub fn new(keyspace_size: u64, servers_per_ring: usize) -> Result<Self> {
        Self::with_config(CuckooConfig::new(keyspace_size, servers_per_ring))
    }

    pub fn with_config(config: CuckooConfig) -> Result<Self> {
        Self::with_hashers(config, Avalanche::LEFT, SplitMix64)
    }
}

impl<L: HashFunction, R: HashFunction> CuckooRings<L, R> {
    /// Creates a pair with explicit hash functions.
    ///
    /// Fails if the two functions agree on every sampled key: identical
    /// placement on both rings makes flipping keys across pointless.
    pub fn with_hashers(config: CuckooConfig, left: L, right: R) -> Result<Self> {
        config.validate()?;
        ensure_independent(&left, &right)?;

        let (left_config, right_config) = config.ring_configs();
        Ok(Self {
            left: Ring::with_config(left_config, left)?,
            right: Ring::with_config(right_config, right)?,
            hop_limit: config.hop_limit,
            displacements: 0,
            exhausted_chains: 0,
        })
    }

    #[inline]
    pub fn left(&self) -> &Ring<L> {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &Ring<R> {
        &self.right
    }

    #[inline]
    pub fn hop_limit(&self) -> usize {
        self.hop_limit
    }

    /// Inserts `key` into the less loaded ring (left on a tie) and resolves
    /// any overflow by draining slots across rings, up to the hop limit.
    pub fn insert(&mut self, key: Key) -> InsertOutcome {
        let side = if self.left.key_count() <= self.right.key_count() {
            Side::Left
        } else {
            Side::Right
        };

        let overflow = match side {
            Side::Left => self.left.insert(key),
            Side::Right => self.right.insert(key),
        };

        let (drains, exhausted) = match overflow {
            Some(position) => self.displace(side, position),
            None => (0, false),
        };

        InsertOutcome {
            side,
            drains,
            exhausted,
        }
    }

    /// Runs a displacement chain starting at an overflowing slot.
    ///
    /// Returns the number of drains performed and whether the hop budget ran
    /// out with slots still queued.
    fn displace(&mut self, side: Side, position: Position) -> (usize, bool) {
        let mut budget = HopBudget::new(self.hop_limit);
        let mut queue = DisplacementQueue::new();
        queue.push(side, position);

        let mut exhausted = false;
        while let Some((side, position)) = queue.pop() {
            if !budget.try_spend() {
                exhausted = true;
                break;
            }
            let overflowed = self.drain_and_flip(side, position);
            trace!(%side, %position, hop = budget.spent(), overflowed = overflowed.len(), "drained slot");
            for next in overflowed {
                queue.push(side.other(), next);
            }
        }

        let drains = budget.spent();
        self.displacements += drains as u64;
        metrics::counter!("cuckoo_rings_displacements_total").increment(drains as u64);

        if exhausted {
            self.exhausted_chains += 1;
            metrics::counter!("cuckoo_rings_exhausted_chains_total").increment(1);
            debug!(
                hops = drains,
                pending = queue.len() + 1,
                "displacement chain hit hop limit, leaving slots over threshold"
            );
        }

        (drains, exhausted)
    }

    /// Moves every key of the slot at `position` on `side` into the other
    /// ring. The slot stays on its ring, empty. Returns the positions on the
    /// other ring that overflowed.
    fn drain_and_flip(&mut self, side: Side, position: Position) -> Vec<Position> {
        match side {
            Side::Left => flip(&mut self.left, &mut self.right, position),
            Side::Right => flip(&mut self.right, &mut self.left, position),
        }
    }

    /// Ring and server currently holding `key`, checking the left ring first.
    pub fn locate(&self, key: Key) -> Option<(Side, Position)> {
        let position = self.left.lookup(key);
        if self.left.get_keys(position).map_or(false, |keys| keys.contains(&key)) {
            return Some((Side::Left, position));
        }
        let position = self.right.lookup(key);
        if self.right.get_keys(position).map_or(false, |keys| keys.contains(&key)) {
            return Some((Side::Right, position));
        }
        None
    }

    pub fn contains(&self, key: Key) -> bool {
        self.locate(key).is_some()
    }

    /// Removes one occurrence of `key` from whichever ring holds it.
    pub fn remove(&mut self, key: Key) -> bool {
        self.left.remove(key) || self.right.remove(key)
    }

    pub fn add_server(&mut self, side: Side, position: Position) -> Result<Rebalance> {
        match side {
            Side::Left => self.left.add_server(position),
            Side::Right => self.right.add_server(position),
        }
    }

    pub fn remove_server(&mut self, side: Side, position: Position) -> Result<Rebalance> {
        match side {
            Side::Left => self.left.remove_server(position),
            Side::Right => self.right.remove_server(position),
        }
    }

    /// Adds a server at a random position of one ring. Numeric side
    /// indices convert through `Side::from` (`0` left, `1` right, modulo 2).
    pub fn add_random_server(&mut self, side: Side) -> Result<Rebalance> {
        match side {
            Side::Left => self.left.add_random_server(),
            Side::Right => self.right.add_random_server(),
        }
    }

    /// Removes a random server from one ring.
    pub fn remove_random_server(&mut self, side: Side) -> Result<Rebalance> {
        match side {
            Side::Left => self.left.remove_random_server(),
            Side::Right => self.right.remove_random_server(),
        }
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    pub fn key_count(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left.key_count(),
            Side::Right => self.right.key_count(),
        }
    }

    pub fn slot_count(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left.slot_count(),
            Side::Right => self.right.slot_count(),
        }
    }

    pub fn total_key_count(&self) -> usize {
        self.left.key_count() + self.right.key_count()
    }

    pub fn total_server_count(&self) -> usize {
        self.left.slot_count() + self.right.slot_count()
    }

    pub fn total_cost(&self) -> u64 {
        self.left.cost() + self.right.cost()
    }

    pub fn max_load(&self) -> usize {
        self.left.max_load().max(self.right.max_load())
    }

    pub fn min_load(&self) -> usize {
        self.left.min_load().min(self.right.min_load())
    }

    /// Drain-and-flip operations performed since construction.
    pub fn displacements(&self) -> u64 {
        self.displacements
    }

    /// Inserts whose chain stopped at the hop limit.
    pub fn exhausted_chains(&self) -> u64 {
        self.exhausted_chains
    }

    pub fn ring_stats(&self, side: Side) -> LoadStats {
        match side {
            Side::Left => self.left.stats(),
            Side::Right => self.right.stats(),
        }
    }

    pub fn stats(&self) -> PairStats {
        PairStats::new(
            self.left.stats(),
            self.right.stats(),
            self.displacements,
            self.exhausted_chains,
        )
    }
}

fn flip<A, B>(from: &mut Ring<A>, to: &mut Ring<B>, position: Position) -> Vec<Position>
where
    A: HashFunction,
    B: HashFunction,
{
    let mut overflowed = Vec::new();
    for key in from.drain_server(position).unwrap_or_default() {
        if let Some(next) = to.insert(key) {
            if !overflowed.contains(&next) {
                overflowed.push(next);
            }
        }
    }
    overflowed
}

fn ensure_independent<L, R>(left: &L, right: &R) -> Result<()>
where
    L: HashFunction,
    R: HashFunction,
{
    let identical = (0..INDEPENDENCE_SAMPLE).all(|key| {
        left.hash(key, INDEPENDENCE_KEYSPACE) == right.hash(key, INDEPENDENCE_KEYSPACE)
    });
    if identical {
        return Err(Error::invalid_config(format!(
            "left ({}) and right ({}) hash functions place keys identically",
            left.name(),
            right.name()
        )));
    }
    Ok(())
}
