//! Hash functions that place keys on a ring.
//!
//! A hash function maps a signed 64-bit key into `[0, keyspace_size)`. A
//! cuckoo ring pair needs two of them that disagree about where keys land,
//! so several independent mixers are provided.

pub mod avalanche;
pub mod sip;
pub mod splitmix;
pub mod traits;
pub mod xxh3;

pub use avalanche::Avalanche;
pub use sip::SipHash13;
pub use splitmix::SplitMix64;
pub use traits::{reduce, FnHash, HashFunction};
pub use xxh3::Xxh3;
