//! Core library for consistent hashing with cuckoo-style cross-ring balancing.
//!
//! This crate provides:
//! - Hash functions mapping keys into a fixed keyspace
//! - A consistent hash ring that tracks the keys assigned to each server and
//!   rebalances them when servers join or leave
//! - A pair of independently hashed rings that drain overflowing servers into
//!   each other, bounded by a hop limit per insert
//! - Load statistics and a lock-guarded shared handle

pub mod config;
pub mod cuckoo;
pub mod error;
pub mod hash;
pub mod ring;
pub mod shared;
pub mod stats;

pub use config::{CuckooConfig, RingConfig};
pub use cuckoo::{CuckooRings, InsertOutcome, Side};
pub use error::{Error, Result};
pub use hash::HashFunction;
pub use ring::{Key, Position, Rebalance, Ring, RingBuilder};
pub use shared::SharedCuckooRings;
pub use stats::{LoadStats, PairStats};
