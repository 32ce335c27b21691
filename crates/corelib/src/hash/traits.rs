//! Core hash function trait definitions.

use std::fmt;

use crate::ring::Key;

/// A deterministic map from keys to ring positions.
///
/// Implementations are stateless and thread-safe, so a ring can be shared
/// behind a lock without synchronizing the hash itself.
pub trait HashFunction: Send + Sync + fmt::Debug + 'static {
    /// Maps `value` into `[0, keyspace_size)`.
    ///
    /// `keyspace_size` is always non-zero when called by a ring.
    fn hash(&self, value: Key, keyspace_size: u64) -> u64;

    /// Returns the name of this hash function (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Reduces a mixed value into `[0, keyspace_size)`, non-negative regardless
/// of the sign of `mixed`.
#[inline]
pub fn reduce(mixed: i64, keyspace_size: u64) -> u64 {
    debug_assert!(keyspace_size > 0);
    (mixed as i128).rem_euclid(keyspace_size as i128) as u64
}

/// Adapter turning a plain function or closure into a [`HashFunction`].
///
/// The closure's output is reduced modulo the keyspace, so an out-of-range
/// result can never escape onto the ring.
///
/// ```rust
/// use corelib::hash::{FnHash, HashFunction};
///
/// let identity = FnHash::new("identity", |key: i64, _kss: u64| key as u64);
/// assert_eq!(identity.hash(12, 10), 2);
/// ```
#[derive(Clone)]
pub struct FnHash<F> {
    name: &'static str,
    func: F,
}

impl<F> FnHash<F>
where
    F: Fn(Key, u64) -> u64 + Send + Sync + 'static,
{
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> fmt::Debug for FnHash<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHash").field("name", &self.name).finish()
    }
}

impl<F> HashFunction for FnHash<F>
where
    F: Fn(Key, u64) -> u64 + Send + Sync + 'static,
{
    fn hash(&self, value: Key, keyspace_size: u64) -> u64 {
        (self.func)(value, keyspace_size) % keyspace_size
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
