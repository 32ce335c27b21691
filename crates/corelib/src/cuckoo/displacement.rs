//! Bookkeeping for displacement chains: the hop budget and the work queue.
//!
//! A chain is processed breadth-first. Each queued entry names a slot that
//! overflowed; processing it spends one hop and may queue slots on the
//! sibling ring. Both pieces are plain values owned by a single insert call.

use std::collections::VecDeque;

use crate::cuckoo::side::Side;
use crate::ring::Position;

/// Number of drain-and-flip operations one top-level insert may perform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HopBudget {
    limit: usize,
    spent: usize,
}

impl HopBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, spent: 0 }
    }

    /// Spends one hop. Returns `false`, spending nothing, once the limit
    /// has been reached.
    pub fn try_spend(&mut self) -> bool {
        if self.spent >= self.limit {
            return false;
        }
        self.spent += 1;
        true
    }

    #[inline]
    pub fn spent(&self) -> usize {
        self.spent
    }
}

/// FIFO of overflowing slots awaiting a drain.
#[derive(Clone, Debug, Default)]
pub(crate) struct DisplacementQueue {
    pending: VecDeque<(Side, Position)>,
}

impl DisplacementQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a slot unless it is already waiting.
    pub(crate) fn push(&mut self, side: Side, position: Position) {
        if !self.pending.contains(&(side, position)) {
            self.pending.push_back((side, position));
        }
    }

    pub(crate) fn pop(&mut self) -> Option<(Side, Position)> {
        self.pending.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_allows_exactly_limit_hops() {
        let mut budget = HopBudget::new(3);
        assert!(budget.try_spend());
        assert!(budget.try_spend());
        assert!(budget.try_spend());
        assert!(!budget.try_spend());
        assert_eq!(budget.spent(), 3);
    }

    #[test]
    fn test_queue_is_fifo_and_deduplicates() {
        let mut queue = DisplacementQueue::new();
        queue.push(Side::Left, Position(1));
        queue.push(Side::Right, Position(2));
        queue.push(Side::Left, Position(1));
        queue.push(Side::Right, Position(1));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some((Side::Left, Position(1))));
        assert_eq!(queue.pop(), Some((Side::Right, Position(2))));
        assert_eq!(queue.pop(), Some((Side::Right, Position(1))));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_requeue_after_pop() {
        let mut queue = DisplacementQueue::new();
        queue.push(Side::Left, Position(5));
        assert!(queue.pop().is_some());
        queue.push(Side::Left, Position(5));
        assert_eq!(queue.len(), 1);
    }
}
