//! Ring position implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A server position on the ring, in `[0, keyspace_size)`.
///
/// Positions are sparse: only the points where a server sits exist in a
/// ring. Ordering is plain numeric order, which is what the clockwise
/// successor search relies on.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(pub u64);

impl Position {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Position of server `index` when `servers` servers are spread evenly
    /// over a keyspace of `keyspace_size`.
    #[inline]
    pub fn evenly_spaced(index: usize, servers: usize, keyspace_size: u64) -> Self {
        Position(index as u64 * (keyspace_size / servers as u64))
    }
}

impl From<u64> for Position {
    fn from(value: u64) -> Self {
        Position(value)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evenly_spaced() {
        let kss = 1 << 32;
        assert_eq!(Position::evenly_spaced(0, 100, kss), Position(0));
        assert_eq!(Position::evenly_spaced(1, 100, kss), Position(kss / 100));
        assert_eq!(Position::evenly_spaced(99, 100, kss), Position(99 * (kss / 100)));
    }

    #[test]
    fn test_ordering() {
        assert!(Position(1) < Position(2));
    }
}
