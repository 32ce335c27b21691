//! Load statistics snapshots.
//!
//! Snapshots are plain values: computing one walks every slot once, after
//! which it can be logged, serialized or compared without holding on to the
//! ring.

use serde::{Deserialize, Serialize};

/// Per-ring load distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    pub servers: usize,
    pub keys: usize,
    pub max_load: usize,
    pub min_load: usize,
    pub average_load: f64,
    /// Population variance of per-slot key counts.
    pub variance: f64,
    /// Sum of squared slot sizes; lower means better balanced.
    pub cost: u64,
}

impl LoadStats {
    /// Folds a sequence of per-slot key counts into a snapshot.
    pub fn from_loads<I>(loads: I) -> Self
    where
        I: IntoIterator<Item = usize>,
        I::IntoIter: Clone,
    {
        let loads = loads.into_iter();
        let mut stats = LoadStats {
            min_load: usize::MAX,
            ..Default::default()
        };

        for load in loads.clone() {
            stats.servers += 1;
            stats.keys += load;
            stats.max_load = stats.max_load.max(load);
            stats.min_load = stats.min_load.min(load);
            stats.cost += (load as u64) * (load as u64);
        }

        if stats.servers == 0 {
            stats.min_load = 0;
            return stats;
        }

        stats.average_load = stats.keys as f64 / stats.servers as f64;
        stats.variance = loads
            .map(|load| {
                let d = load as f64 - stats.average_load;
                d * d
            })
            .sum::<f64>()
            / stats.servers as f64;
        stats
    }

    /// Cost per server, the figure the timing harnesses report.
    pub fn cost_per_server(&self) -> f64 {
        if self.servers == 0 {
            0.0
        } else {
            self.cost as f64 / self.servers as f64
        }
    }
}

/// Aggregate view over both rings of a cuckoo pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    pub left: LoadStats,
    pub right: LoadStats,
    pub total_keys: usize,
    pub total_servers: usize,
    pub total_cost: u64,
    pub max_load: usize,
    pub min_load: usize,
    /// Drain-and-flip operations performed since construction.
    pub displacements: u64,
    /// Inserts whose displacement chain hit the hop limit.
    pub exhausted_chains: u64,
}

impl PairStats {
    pub fn new(left: LoadStats, right: LoadStats, displacements: u64, exhausted_chains: u64) -> Self {
        Self {
            total_keys: left.keys + right.keys,
            total_servers: left.servers + right.servers,
            total_cost: left.cost + right.cost,
            max_load: left.max_load.max(right.max_load),
            min_load: left.min_load.min(right.min_load),
            left,
            right,
            displacements,
            exhausted_chains,
        }
    }

    pub fn cost_per_server(&self) -> f64 {
        if self.total_servers == 0 {
            0.0
        } else {
            self.total_cost as f64 / self.total_servers as f64
        }
    }
}
