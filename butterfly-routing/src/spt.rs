//! Shortest-path-tree entries
//!
//! Each search direction owns an arena of entries. Parent links are arena
//! indices; entries are never removed, so a parent outlives all of its
//! descendants and the whole tree is dropped with the search.

use std::fmt;

use crate::graph::{EdgeId, EdgeView, NodeId, NO_EDGE};
use crate::traversal::Direction;

/// Index of an entry in its direction's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u32);

impl EntryId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Best known way to reach one traversal state from a direction's root
#[derive(Debug, Clone)]
pub struct SptEntry<X = ()> {
    /// Incoming edge; `NO_EDGE` for the root
    pub edge: EdgeId,
    pub adj_node: NodeId,
    /// Cumulative weight from the root
    pub weight: f64,
    pub parent: Option<EntryId>,
    /// Variant-specific payload
    pub extra: X,
}

impl<X> SptEntry<X> {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<X> fmt::Display for SptEntry<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (edge {}, weight {})", self.adj_node, self.edge, self.weight)
    }
}

/// Builds and updates entries for a search variant
///
/// Plain Dijkstra needs nothing beyond [`SptEntry`]; variants that carry extra
/// bookkeeping (alternative routes, many-to-many buckets) attach it through
/// `Extra`. After either call the entry must hold the given weight, which the
/// search only passes when it is the best known for the entry's key.
pub trait EntryFactory {
    type Extra: fmt::Debug;

    /// Root entry of a direction
    fn create_start_entry(&mut self, node: NodeId, weight: f64, direction: Direction)
        -> SptEntry<Self::Extra>;

    /// New entry reached over `edge`
    ///
    /// `inc_edge` is the original edge incoming to the new entry's node; it
    /// equals `edge.edge` unless the graph exposes composite edges.
    fn create_entry(
        &mut self,
        edge: &EdgeView,
        inc_edge: EdgeId,
        weight: f64,
        parent: EntryId,
        direction: Direction,
    ) -> SptEntry<Self::Extra>;

    /// Overwrite `entry` with a cheaper way to reach it
    fn update_entry(
        &mut self,
        entry: &mut SptEntry<Self::Extra>,
        _edge: &EdgeView,
        inc_edge: EdgeId,
        weight: f64,
        parent: EntryId,
        _direction: Direction,
    ) {
        entry.edge = inc_edge;
        entry.weight = weight;
        entry.parent = Some(parent);
    }
}

/// Entries without payload
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainEntries;

impl EntryFactory for PlainEntries {
    type Extra = ();

    fn create_start_entry(&mut self, node: NodeId, weight: f64, _direction: Direction) -> SptEntry {
        SptEntry {
            edge: NO_EDGE,
            adj_node: node,
            weight,
            parent: None,
            extra: (),
        }
    }

    fn create_entry(
        &mut self,
        edge: &EdgeView,
        inc_edge: EdgeId,
        weight: f64,
        parent: EntryId,
        _direction: Direction,
    ) -> SptEntry {
        SptEntry {
            edge: inc_edge,
            adj_node: edge.adj_node,
            weight,
            parent: Some(parent),
            extra: (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> EdgeView {
        EdgeView {
            edge: 3,
            base_node: 1,
            adj_node: 2,
            reversed: false,
            orig_edge_first: 3,
            orig_edge_last: 3,
            distance: 4.0,
            speed_fwd: 50.0,
            speed_bwd: 0.0,
        }
    }

    #[test]
    fn test_plain_entries() {
        let mut f = PlainEntries;
        let root = f.create_start_entry(1, 0.0, Direction::Forward);
        assert!(root.is_root());
        assert_eq!(root.edge, NO_EDGE);

        let mut e = f.create_entry(&view(), 3, 4.0, EntryId(0), Direction::Forward);
        assert_eq!(e.adj_node, 2);
        assert_eq!(e.parent, Some(EntryId(0)));

        f.update_entry(&mut e, &view(), 3, 2.5, EntryId(7), Direction::Forward);
        assert_eq!(e.weight, 2.5);
        assert_eq!(e.parent, Some(EntryId(7)));
        assert_eq!(e.adj_node, 2);
    }
}
