//! Dual-ring cuckoo rebalancing.
//!
//! Two independently hashed rings share the load. Inserts go to the ring
//! holding fewer keys; when a slot overflows, its keys are drained into the
//! other ring, which may overflow in turn. The chain is bounded by a hop
//! budget per top-level insert, after which the remaining overflow is left
//! in place.

pub mod displacement;
pub mod rings;
pub mod side;

pub use displacement::HopBudget;
pub use rings::{CuckooRings, InsertOutcome};
pub use side::Side;
