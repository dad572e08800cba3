//! One direction's open set
//!
//! Entry arena + indexed min-priority queue + best-weight index keyed by
//! traversal identity. The queue is indexed by [`EntryId`], so a cheaper path
//! to a known key changes that entry's priority in place (true decrease-key)
//! and the queue never holds two entries for one key.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use rustc_hash::FxHashMap;

use crate::spt::{EntryId, SptEntry};
use crate::traversal::{Direction, TraversalKey};

type Priority = Reverse<OrderedFloat<f64>>;

#[inline]
fn priority(weight: f64) -> Priority {
    Reverse(OrderedFloat(weight))
}

/// Open set and shortest-path tree of one search direction
#[derive(Debug)]
pub struct Frontier<X> {
    direction: Direction,
    entries: Vec<SptEntry<X>>,
    /// Parallel to `entries`: popped at least once
    settled: Vec<bool>,
    queue: PriorityQueue<EntryId, Priority>,
    best: FxHashMap<TraversalKey, EntryId>,
    current: Option<EntryId>,
    visited: usize,
    finished: bool,
}

impl<X> Frontier<X> {
    pub fn new(direction: Direction, capacity: usize) -> Self {
        Self {
            direction,
            entries: Vec::with_capacity(capacity),
            settled: Vec::with_capacity(capacity),
            queue: PriorityQueue::with_capacity(capacity),
            best: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            current: None,
            visited: 0,
            finished: false,
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn alloc(&mut self, entry: SptEntry<X>) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(entry);
        self.settled.push(false);
        id
    }

    /// Add a direction root; `key` indexes it for node-based search
    pub fn push_root(&mut self, entry: SptEntry<X>, key: Option<TraversalKey>) -> EntryId {
        let weight = entry.weight;
        let id = self.alloc(entry);
        self.queue.push(id, priority(weight));
        if let Some(key) = key {
            self.best.insert(key, id);
        }
        self.current = Some(id);
        id
    }

    /// Add a new entry for a key not yet present
    pub fn insert(&mut self, key: TraversalKey, entry: SptEntry<X>) -> EntryId {
        debug_assert!(!self.best.contains_key(&key), "duplicate key {key:?}");
        let weight = entry.weight;
        let id = self.alloc(entry);
        self.queue.push(id, priority(weight));
        self.best.insert(key, id);
        id
    }

    /// Re-prioritize `id` after its weight decreased
    ///
    /// An entry that was already popped goes back into the queue.
    pub fn requeue(&mut self, id: EntryId) {
        let weight = self.entries[id.index()].weight;
        self.queue.push(id, priority(weight));
    }

    /// Current best entry for `key`
    #[inline]
    pub fn lookup(&self, key: TraversalKey) -> Option<EntryId> {
        self.best.get(&key).copied()
    }

    #[inline]
    pub fn entry(&self, id: EntryId) -> &SptEntry<X> {
        &self.entries[id.index()]
    }

    #[inline]
    pub fn entry_mut(&mut self, id: EntryId) -> &mut SptEntry<X> {
        &mut self.entries[id.index()]
    }

    /// Pop the cheapest entry and make it current
    ///
    /// Returns the entry and whether it had been popped before.
    pub fn pop(&mut self) -> Option<(EntryId, bool)> {
        let (id, _) = self.queue.pop()?;
        self.visited += 1;
        self.current = Some(id);
        let seen = std::mem::replace(&mut self.settled[id.index()], true);
        Some((id, seen))
    }

    /// Weight of the cheapest open entry
    pub fn peek_weight(&self) -> Option<f64> {
        self.queue.peek().map(|(_, p)| (p.0).0)
    }

    /// Weight of the last popped entry (the root before the first pop)
    pub fn current_weight(&self) -> f64 {
        self.current
            .map(|id| self.entries[id.index()].weight)
            .unwrap_or(f64::INFINITY)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Open entries
    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Entries ever created, roots included
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of indexed traversal keys
    #[inline]
    pub fn key_count(&self) -> usize {
        self.best.len()
    }

    #[inline]
    pub fn visited(&self) -> usize {
        self.visited
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn set_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    /// Walk the parent chain from `id` to the root, `id` first
    pub fn chain(&self, id: EntryId) -> impl Iterator<Item = &SptEntry<X>> + '_ {
        std::iter::successors(Some(self.entry(id)), move |e| e.parent.map(|p| self.entry(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NO_EDGE;

    fn entry(node: u32, weight: f64, parent: Option<EntryId>) -> SptEntry {
        SptEntry {
            edge: NO_EDGE,
            adj_node: node,
            weight,
            parent,
            extra: (),
        }
    }

    #[test]
    fn test_pops_in_weight_order() {
        let mut f = Frontier::new(Direction::Forward, 4);
        let root = f.push_root(entry(0, 0.0, None), Some(TraversalKey(0)));
        f.pop();
        f.insert(TraversalKey(1), entry(1, 5.0, Some(root)));
        f.insert(TraversalKey(2), entry(2, 2.0, Some(root)));
        f.insert(TraversalKey(3), entry(3, 3.5, Some(root)));

        assert_eq!(f.peek_weight(), Some(2.0));
        let mut order = Vec::new();
        while let Some((id, _)) = f.pop() {
            order.push(f.entry(id).adj_node);
        }
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(f.visited(), 4);
    }

    #[test]
    fn test_requeue_is_decrease_key() {
        let mut f = Frontier::new(Direction::Backward, 4);
        let root = f.push_root(entry(0, 0.0, None), None);
        f.pop();
        let a = f.insert(TraversalKey(1), entry(1, 10.0, Some(root)));
        f.insert(TraversalKey(2), entry(2, 4.0, Some(root)));

        f.entry_mut(a).weight = 1.0;
        f.requeue(a);
        assert_eq!(f.queue_len(), 2);

        let (first, seen) = f.pop().unwrap();
        assert_eq!(first, a);
        assert!(!seen);
        assert_eq!(f.current_weight(), 1.0);
    }

    #[test]
    fn test_requeue_settled_entry_is_reported() {
        let mut f = Frontier::new(Direction::Forward, 2);
        let root = f.push_root(entry(0, 0.0, None), Some(TraversalKey(0)));
        assert_eq!(f.pop(), Some((root, false)));
        f.requeue(root);
        assert_eq!(f.pop(), Some((root, true)));
        assert!(f.is_empty());
    }

    #[test]
    fn test_lookup_and_chain() {
        let mut f = Frontier::new(Direction::Forward, 4);
        let root = f.push_root(entry(0, 0.0, None), Some(TraversalKey(0)));
        let a = f.insert(TraversalKey(1), entry(1, 1.0, Some(root)));
        let b = f.insert(TraversalKey(2), entry(2, 2.0, Some(a)));

        assert_eq!(f.lookup(TraversalKey(2)), Some(b));
        assert_eq!(f.lookup(TraversalKey(9)), None);
        let nodes: Vec<u32> = f.chain(b).map(|e| e.adj_node).collect();
        assert_eq!(nodes, vec![2, 1, 0]);
        assert_eq!(f.entry_count(), 3);
        assert_eq!(f.key_count(), 3);
    }
}
