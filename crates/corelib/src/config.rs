//! Construction parameters for rings and cuckoo ring pairs.
//!
//! Both structs derive `Serialize`/`Deserialize` with `#[serde(default)]`, so a
//! host application can embed them in its own configuration and only spell
//! out the fields it cares about. Validation happens once, at construction.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default keyspace: the full 32-bit range.
pub const DEFAULT_KEYSPACE_SIZE: u64 = 1 << 32;

/// Number of keys a slot may hold before it counts as overflowing.
pub const DEFAULT_OVERFLOW_THRESHOLD: usize = 100;

/// Drain-and-flip operations allowed per top-level insert.
pub const DEFAULT_HOP_LIMIT: usize = 8;

/// Configuration for a single [`Ring`](crate::ring::Ring).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Size of the keyspace `[0, keyspace_size)`.
    pub keyspace_size: u64,
    /// Servers placed evenly around the ring at construction.
    pub servers: usize,
    /// A slot overflows once it holds strictly more keys than this.
    pub overflow_threshold: usize,
    /// Seed for random server placement; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl RingConfig {
    pub fn new(keyspace_size: u64, servers: usize) -> Self {
        Self {
            keyspace_size,
            servers,
            ..Self::default()
        }
    }

    pub fn with_overflow_threshold(mut self, overflow_threshold: usize) -> Self {
        self.overflow_threshold = overflow_threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects configurations that would produce an unusable ring.
    pub fn validate(&self) -> Result<()> {
        validate_keyspace(self.keyspace_size)?;
        validate_servers(self.servers, self.keyspace_size)?;
        validate_threshold(self.overflow_threshold)
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            keyspace_size: DEFAULT_KEYSPACE_SIZE,
            servers: 1,
            overflow_threshold: DEFAULT_OVERFLOW_THRESHOLD,
            seed: None,
        }
    }
}

/// Configuration for a [`CuckooRings`](crate::cuckoo::CuckooRings) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuckooConfig {
    /// Keyspace shared by both rings.
    pub keyspace_size: u64,
    /// Initial servers on each ring (the pair starts with twice this many).
    pub servers_per_ring: usize,
    /// Overflow threshold applied to both rings.
    pub overflow_threshold: usize,
    /// Maximum drain-and-flip operations per top-level insert.
    pub hop_limit: usize,
    /// Seed for random server placement on both rings.
    pub seed: Option<u64>,
}

impl CuckooConfig {
    pub fn new(keyspace_size: u64, servers_per_ring: usize) -> Self {
        Self {
            keyspace_size,
            servers_per_ring,
            ..Self::default()
        }
    }

    pub fn with_overflow_threshold(mut self, overflow_threshold: usize) -> Self {
        self.overflow_threshold = overflow_threshold;
        self
    }

    pub fn with_hop_limit(mut self, hop_limit: usize) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_keyspace(self.keyspace_size)?;
        validate_servers(self.servers_per_ring, self.keyspace_size)?;
        validate_threshold(self.overflow_threshold)?;
        if self.hop_limit == 0 {
            return Err(Error::invalid_config("hop_limit must be > 0"));
        }
        Ok(())
    }

    /// Per-ring configuration; the right ring's seed is offset so the two
    /// rings do not draw identical random positions.
    pub(crate) fn ring_configs(&self) -> (RingConfig, RingConfig) {
        let left = RingConfig {
            keyspace_size: self.keyspace_size,
            servers: self.servers_per_ring,
            overflow_threshold: self.overflow_threshold,
            seed: self.seed,
        };
        let right = RingConfig {
            seed: self.seed.map(|s| s.wrapping_add(1)),
            ..left.clone()
        };
        (left, right)
    }
}

impl Default for CuckooConfig {
    fn default() -> Self {
        Self {
            keyspace_size: DEFAULT_KEYSPACE_SIZE,
            servers_per_ring: 1,
            overflow_threshold: DEFAULT_OVERFLOW_THRESHOLD,
            hop_limit: DEFAULT_HOP_LIMIT,
            seed: None,
        }
    }
}

fn validate_keyspace(keyspace_size: u64) -> Result<()> {
    if keyspace_size == 0 {
        return Err(Error::invalid_config("keyspace_size must be > 0"));
    }
    if keyspace_size > i64::MAX as u64 {
        return Err(Error::invalid_config(format!(
            "keyspace_size {} exceeds {}",
            keyspace_size,
            i64::MAX
        )));
    }
    Ok(())
}

fn validate_servers(servers: usize, keyspace_size: u64) -> Result<()> {
    if servers == 0 {
        return Err(Error::invalid_config("server count must be > 0"));
    }
    // Evenly spaced placement needs a stride of at least one position.
    if servers as u64 > keyspace_size {
        return Err(Error::invalid_config(format!(
            "{} servers do not fit in a keyspace of size {}",
            servers, keyspace_size
        )));
    }
    Ok(())
}

fn validate_threshold(overflow_threshold: usize) -> Result<()> {
    if overflow_threshold == 0 {
        return Err(Error::invalid_config("overflow_threshold must be > 0"));
    }
    Ok(())
}
