//! Tests for the single consistent hash ring.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: construction, lookup, insert, remove
//! 2. **Topology changes**: joins and leaves keep every key assigned
//! 3. **Edge cases**: wraparound, single server, missing servers
//! 4. **Statistics**: load, variance and cost agree with the slot contents

use std::collections::HashMap;

use corelib::hash::{SplitMix64, Xxh3};
use corelib::{Error, HashFunction, Key, Position, Ring, RingBuilder};

const KSS: u64 = 1 << 32;

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_construction_rejects_bad_config() {
    assert!(matches!(Ring::new(0, 10), Err(Error::InvalidConfig(_))));
    assert!(matches!(Ring::new(KSS, 0), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_insert_hundred_servers() {
    let mut ring = Ring::new(KSS, 100).unwrap();
    for key in 1..100 {
        ring.insert(key);
    }

    assert_eq!(ring.slot_count(), 100);
    assert_eq!(ring.key_count(), 99);
    assert!(ring.max_load() <= ring.overflow_threshold());
    for key in 1..100 {
        assert!(ring.contains(key), "key {} should be stored", key);
    }
}

#[test]
fn test_remove_server_then_refill() {
    let mut ring = Ring::new(KSS, 100).unwrap();
    for key in 1..100 {
        ring.insert(key);
    }

    let busiest = ring
        .loads()
        .max_by_key(|(_, load)| *load)
        .map(|(position, _)| position)
        .unwrap();
    let prior = ring.get_keys(busiest).unwrap().len();

    let report = ring.remove_server(busiest).unwrap();
    assert_eq!(report.moved, prior);
    assert_eq!(ring.slot_count(), 99);
    assert_eq!(ring.key_count(), 99);

    for key in 1000..1000 + prior as Key {
        ring.insert(key);
    }
    assert_eq!(ring.key_count(), 99 + prior);
    for key in 1..100 {
        assert!(ring.contains(key), "key {} lost after removal", key);
    }
}

#[test]
fn test_consistent_lookup() {
    let ring = Ring::new(KSS, 64).unwrap();
    for key in [-7, 0, 1, 12_345, Key::MAX] {
        let first = ring.lookup(key);
        assert_eq!(first, ring.lookup(key), "same key should map to same server");
        assert!(ring.contains_server(first));
    }
}

#[test]
fn test_duplicate_keys_are_kept() {
    let mut ring = Ring::new(KSS, 4).unwrap();
    ring.insert(5);
    ring.insert(5);
    let position = ring.lookup(5);
    assert_eq!(ring.get_keys(position), Some(&[5, 5][..]));
    assert!(ring.remove(5));
    assert!(ring.contains(5));
}

// ============================================================================
// Topology Change Tests
// ============================================================================

#[test]
fn test_join_only_moves_keys_from_successor() {
    let mut ring = Ring::new(KSS, 32).unwrap();
    for key in 0..5_000 {
        ring.insert(key);
    }
    let before: HashMap<Key, Position> = (0..5_000).map(|k| (k, ring.lookup(k))).collect();

    let new_position = Position(KSS / 64 + 12_345);
    let successor = ring.successor(new_position.get());
    let report = ring.add_server(new_position).unwrap();
    assert_eq!(report.position, new_position);

    let mut moved = 0;
    for (key, old_owner) in &before {
        let owner = ring.lookup(*key);
        if owner == new_position {
            assert_eq!(*old_owner, successor);
            moved += 1;
        } else {
            assert_eq!(owner, *old_owner, "key {} should keep its server", key);
        }
        assert!(ring.contains(*key));
    }
    assert_eq!(ring.get_keys(new_position).unwrap().len(), moved);
    assert_eq!(ring.key_count(), 5_000);
}

#[test]
fn test_leave_reassigns_every_key() {
    let mut ring = Ring::new(KSS, 32).unwrap();
    for key in 0..5_000 {
        ring.insert(key);
    }
    let victim = ring.lookup(77);
    ring.remove_server(victim).unwrap();

    assert!(!ring.contains_server(victim));
    for key in 0..5_000 {
        assert_ne!(ring.lookup(key), victim);
        assert!(ring.contains(key));
    }
    assert_eq!(ring.key_count(), 5_000);
}

#[test]
fn test_random_topology_churn_conserves_keys() {
    let mut ring = RingBuilder::new()
        .keyspace_size(KSS)
        .servers(50)
        .seed(42)
        .build()
        .unwrap();

    let mut inserted = 0;
    for round in 0..200 {
        match round % 3 {
            0 => {
                ring.add_random_server().unwrap();
            }
            1 => {
                ring.remove_random_server().unwrap();
            }
            _ => {}
        }
        for key in 0..10 {
            ring.insert(round * 10 + key);
            inserted += 1;
        }
    }
    assert_eq!(ring.key_count(), inserted);
    assert_eq!(ring.stats().keys, inserted);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_single_server() {
    let mut ring = Ring::new(KSS, 1).unwrap();
    for key in 0..100 {
        ring.insert(key);
        assert_eq!(ring.lookup(key), Position(0), "all keys map to the only server");
    }
    assert_eq!(ring.remove_server(Position(0)), Err(Error::LastServer));
    assert_eq!(ring.key_count(), 100);
}

#[test]
fn test_remove_missing_server_keeps_counts() {
    let mut ring = Ring::new(KSS, 10).unwrap();
    ring.insert(3);
    assert_eq!(
        ring.remove_server(Position(1)),
        Err(Error::SlotNotFound(Position(1)))
    );
    assert_eq!(ring.slot_count(), 10);
    assert_eq!(ring.key_count(), 1);
}

#[test]
fn test_add_remove_add() {
    let mut ring = Ring::new(KSS, 4).unwrap();
    ring.add_server(Position(17)).unwrap();
    ring.remove_server(Position(17)).unwrap();
    ring.add_server(Position(17)).unwrap();
    assert_eq!(ring.slot_count(), 5);
}

// ============================================================================
// Ring Builder Tests
// ============================================================================

#[test]
fn test_ring_builder_default() {
    let ring = RingBuilder::new().build().unwrap();
    assert_eq!(ring.keyspace_size(), KSS);
    assert_eq!(ring.slot_count(), 1);
    assert_eq!(ring.hasher().name(), "Avalanche(left)");
}

#[test]
fn test_ring_builder_custom_hasher() {
    let ring = RingBuilder::new()
        .servers(8)
        .overflow_threshold(3)
        .hasher(Xxh3::with_seed(5))
        .build()
        .unwrap();
    assert_eq!(ring.slot_count(), 8);
    assert_eq!(ring.overflow_threshold(), 3);
    assert_eq!(ring.hasher().name(), "Xxh3");

    let other = Ring::with_hasher(KSS, 8, SplitMix64).unwrap();
    assert_eq!(other.hasher().name(), "SplitMix64");
}

// ============================================================================
// Statistics Tests
// ============================================================================

#[test]
fn test_statistics_match_slots() {
    let mut ring = Ring::new(KSS, 16).unwrap();
    for key in 0..1_000 {
        ring.insert(key);
    }
    let loads: Vec<usize> = ring.loads().map(|(_, load)| load).collect();

    assert_eq!(ring.cost(), loads.iter().map(|&l| (l * l) as u64).sum::<u64>());
    assert_eq!(ring.max_load(), *loads.iter().max().unwrap());
    assert_eq!(ring.min_load(), *loads.iter().min().unwrap());
    assert!((ring.average_load() - 1_000.0 / 16.0).abs() < 1e-9);

    let stats = ring.stats();
    assert_eq!(stats.servers, 16);
    assert_eq!(stats.keys, 1_000);
    assert!((stats.variance - ring.load_variance()).abs() < 1e-9);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["keys"], 1_000);
}
