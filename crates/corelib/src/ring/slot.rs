//! Server slots: a position plus the keys assigned to it.

/// Keys stored on the ring.
pub type Key = i64;

/// The keys assigned to one server, in insertion order.
///
/// Duplicates are kept: inserting the same key twice stores it twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerSlot {
    keys: Vec<Key>,
}

impl ServerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub(crate) fn push(&mut self, key: Key) {
        self.keys.push(key);
    }

    /// Removes the first occurrence of `key`, preserving the order of the rest.
    pub(crate) fn remove_first(&mut self, key: Key) -> bool {
        match self.keys.iter().position(|&k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Empties the slot, handing the keys to the caller.
    pub(crate) fn take(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.keys)
    }
}
