//! Consistent hash ring implementation.
//!
//! The ring manages server positions and the keys assigned to each, and
//! rebalances keys when servers join or leave.

pub mod position;
pub mod ring;
pub mod slot;

pub use position::Position;
pub use ring::{Rebalance, Ring, RingBuilder};
pub use slot::{Key, ServerSlot};
