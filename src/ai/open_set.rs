//! Indexed binary min-heap for the A* frontier
//!
//! Each key appears at most once. Re-inserting a key with a lower priority
//! lowers its entry in place (enqueue-or-decrease) instead of adding a
//! duplicate. Ties on priority resolve by first insertion, so extraction
//! order is deterministic.

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    priority: u32,
    /// Insertion order, used as tie-break
    seq: u64,
}

impl<K> Entry<K> {
    #[inline]
    fn before(&self, other: &Self) -> bool {
        (self.priority, self.seq) < (other.priority, other.seq)
    }
}

/// Min-priority queue with decrease-key
#[derive(Debug, Clone)]
pub struct OpenSet<K> {
    heap: Vec<Entry<K>>,
    /// Heap slot of every queued key
    positions: FxHashMap<K, usize>,
    next_seq: u64,
}

impl<K: Copy + Eq + Hash> OpenSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: FxHashMap::default(),
            next_seq: 0,
        }
    }

    /// Insert a key, or lower its priority if it is already queued.
    ///
    /// Returns `false` when the key was queued with an equal or lower priority
    /// and nothing changed.
    pub fn push_or_decrease(&mut self, key: K, priority: u32) -> bool {
        if let Some(&slot) = self.positions.get(&key) {
            if priority >= self.heap[slot].priority {
                return false;
            }
            self.heap[slot].priority = priority;
            self.sift_up(slot);
            return true;
        }

        let slot = self.heap.len();
        self.heap.push(Entry {
            key,
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.positions.insert(key, slot);
        self.sift_up(slot);
        true
    }

    /// Remove and return the key with the lowest priority
    pub fn pop(&mut self) -> Option<(K, u32)> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.positions.remove(&entry.key);

        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((entry.key, entry.priority))
    }

    /// Current priority of a queued key
    #[must_use]
    pub fn priority(&self, key: &K) -> Option<u32> {
        self.positions.get(key).map(|&slot| self.heap[slot].priority)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].key, a);
        self.positions.insert(self.heap[b].key, b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.heap[slot].before(&self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len && self.heap[left].before(&self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.heap[right].before(&self.heap[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}

impl<K: Copy + Eq + Hash> Default for OpenSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_priority_order() {
        let mut open = OpenSet::new();
        for (key, priority) in [(1, 7), (2, 3), (3, 9), (4, 1), (5, 5)] {
            open.push_or_decrease(key, priority);
        }

        let order: Vec<_> = std::iter::from_fn(|| open.pop()).collect();
        assert_eq!(order, vec![(4, 1), (2, 3), (5, 5), (1, 7), (3, 9)]);
        assert!(open.is_empty());
    }

    #[test]
    fn test_decrease_key_does_not_duplicate() {
        let mut open = OpenSet::new();
        open.push_or_decrease('a', 10);
        open.push_or_decrease('b', 4);

        assert!(open.push_or_decrease('a', 2));
        assert_eq!(open.len(), 2);
        assert_eq!(open.priority(&'a'), Some(2));
        assert_eq!(open.pop(), Some(('a', 2)));
    }

    #[test]
    fn test_higher_priority_is_ignored() {
        let mut open = OpenSet::new();
        open.push_or_decrease('a', 3);

        assert!(!open.push_or_decrease('a', 8));
        assert!(!open.push_or_decrease('a', 3));
        assert_eq!(open.priority(&'a'), Some(3));
    }

    #[test]
    fn test_ties_break_by_insertion() {
        let mut open = OpenSet::new();
        for key in [30, 10, 20] {
            open.push_or_decrease(key, 5);
        }

        assert_eq!(open.pop(), Some((30, 5)));
        assert_eq!(open.pop(), Some((10, 5)));
        assert_eq!(open.pop(), Some((20, 5)));
    }

    #[test]
    fn test_reinsert_after_pop() {
        let mut open = OpenSet::new();
        open.push_or_decrease(1u32, 1);
        assert_eq!(open.pop(), Some((1, 1)));
        assert!(!open.contains(&1));

        assert!(open.push_or_decrease(1, 6));
        assert_eq!(open.pop(), Some((1, 6)));
        assert_eq!(open.pop(), None);
    }

    #[test]
    fn test_positions_stay_consistent() {
        let mut open = OpenSet::new();
        for key in 0u32..64 {
            open.push_or_decrease(key, 1000 - key * 7 % 113);
        }
        for key in (0u32..64).step_by(3) {
            open.push_or_decrease(key, key % 5);
        }

        let mut last = 0;
        while let Some((key, priority)) = open.pop() {
            assert!(priority >= last);
            assert!(!open.contains(&key));
            last = priority;
        }
    }
}
