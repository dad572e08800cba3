//! Edge filters gate which edges a search may traverse
//!
//! Filters compose conjunctively. The search always applies an
//! [`AccessFilter`] for its direction; callers may add one more filter, and
//! edge-snapped query points pin the very first expansion with a
//! [`PinnedEdgeFilter`].

use crate::graph::{EdgeId, EdgeView};
use crate::traversal::Direction;

/// Predicate over edges
pub trait EdgeFilter: Send + Sync {
    fn accept(&self, edge: &EdgeView) -> bool;
}

impl<F> EdgeFilter for F
where
    F: Fn(&EdgeView) -> bool + Send + Sync,
{
    #[inline]
    fn accept(&self, edge: &EdgeView) -> bool {
        self(edge)
    }
}

/// Composition helpers
pub trait EdgeFilterExt: EdgeFilter + Sized {
    fn and<B: EdgeFilter>(self, other: B) -> AndFilter<Self, B> {
        AndFilter::new(self, other)
    }
}

impl<F: EdgeFilter> EdgeFilterExt for F {}

/// Accepts edges that can be travelled in the search direction
///
/// Forward search leaves `base` towards `adj`; backward search arrives at
/// `base` coming from `adj`.
#[derive(Debug, Clone, Copy)]
pub struct AccessFilter {
    direction: Direction,
}

impl AccessFilter {
    pub fn out_edges() -> Self {
        Self {
            direction: Direction::Forward,
        }
    }

    pub fn in_edges() -> Self {
        Self {
            direction: Direction::Backward,
        }
    }

    pub fn for_direction(direction: Direction) -> Self {
        Self { direction }
    }
}

impl EdgeFilter for AccessFilter {
    #[inline]
    fn accept(&self, edge: &EdgeView) -> bool {
        match self.direction {
            Direction::Forward => edge.can_travel_forward(),
            Direction::Backward => edge.can_travel_backward(),
        }
    }
}

/// Both filters must accept
#[derive(Debug, Clone, Copy)]
pub struct AndFilter<A, B> {
    first: A,
    second: B,
}

impl<A: EdgeFilter, B: EdgeFilter> AndFilter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: EdgeFilter, B: EdgeFilter> EdgeFilter for AndFilter<A, B> {
    #[inline]
    fn accept(&self, edge: &EdgeView) -> bool {
        self.first.accept(edge) && self.second.accept(edge)
    }
}

/// Restricts an expansion to edges starting (forward) or ending (backward)
/// with a given original edge
#[derive(Debug, Clone, Copy)]
pub struct PinnedEdgeFilter {
    orig_edge: EdgeId,
    direction: Direction,
}

impl PinnedEdgeFilter {
    pub fn new(orig_edge: EdgeId, direction: Direction) -> Self {
        Self {
            orig_edge,
            direction,
        }
    }
}

impl EdgeFilter for PinnedEdgeFilter {
    #[inline]
    fn accept(&self, edge: &EdgeView) -> bool {
        let orig = match self.direction {
            Direction::Forward => edge.orig_edge_first,
            Direction::Backward => edge.orig_edge_last,
        };
        orig == self.orig_edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(edge: EdgeId, speed_fwd: f64, speed_bwd: f64) -> EdgeView {
        EdgeView {
            edge,
            base_node: 0,
            adj_node: 1,
            reversed: false,
            orig_edge_first: edge,
            orig_edge_last: edge + 100,
            distance: 1.0,
            speed_fwd,
            speed_bwd,
        }
    }

    #[test]
    fn test_access_filter() {
        let oneway = view(0, 50.0, 0.0);
        assert!(AccessFilter::out_edges().accept(&oneway));
        assert!(!AccessFilter::in_edges().accept(&oneway));
        assert!(AccessFilter::for_direction(Direction::Backward).accept(&view(0, 0.0, 30.0)));
    }

    #[test]
    fn test_closure_and_composition() {
        let not_three = |e: &EdgeView| e.edge != 3;
        let f = AccessFilter::out_edges().and(not_three);
        assert!(f.accept(&view(2, 50.0, 0.0)));
        assert!(!f.accept(&view(3, 50.0, 0.0)));
        assert!(!f.accept(&view(2, 0.0, 50.0)));
    }

    #[test]
    fn test_pinned_filter_uses_direction_end() {
        let e = view(4, 50.0, 50.0);
        assert!(PinnedEdgeFilter::new(4, Direction::Forward).accept(&e));
        assert!(!PinnedEdgeFilter::new(4, Direction::Backward).accept(&e));
        assert!(PinnedEdgeFilter::new(104, Direction::Backward).accept(&e));
    }

    #[test]
    fn test_boxed_filter() {
        let boxed: Box<dyn EdgeFilter> = Box::new(|e: &EdgeView| e.edge == 1);
        let boxed: &dyn EdgeFilter = boxed.as_ref();
        assert!(boxed.accept(&view(1, 1.0, 1.0)));
        assert!(!boxed.accept(&view(2, 1.0, 1.0)));
    }
}
