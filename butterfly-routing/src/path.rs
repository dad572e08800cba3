//! Route result and bidirectional path extraction

use crate::frontier::Frontier;
use crate::graph::{EdgeId, NodeId, RoutingGraph};
use crate::spt::EntryId;
use crate::traversal::Direction;

/// Extracted route
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub found: bool,
    /// Total weight; infinite when not found
    pub weight: f64,
    /// Sum of edge lengths in metres
    pub distance: f64,
    /// Nodes from source to target
    pub nodes: Vec<NodeId>,
    /// Edges from source to target; `nodes.len() == edges.len() + 1` when found
    pub edges: Vec<EdgeId>,
}

impl Path {
    /// Empty result for unreachable targets and unfinished searches
    pub fn not_found() -> Self {
        Self {
            found: false,
            weight: f64::INFINITY,
            distance: 0.0,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.found
    }
}

/// Splices the forward and backward shortest-path trees at the meeting point
pub struct BidirPathExtractor<'a, G> {
    graph: &'a G,
}

impl<'a, G: RoutingGraph> BidirPathExtractor<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    /// Build the path through `fwd_entry` and `bwd_entry`
    ///
    /// Both entries must sit on the same node: the forward chain ends where
    /// the backward chain starts.
    pub fn extract<X>(
        &self,
        fwd: &Frontier<X>,
        fwd_entry: EntryId,
        bwd: &Frontier<X>,
        bwd_entry: EntryId,
        weight: f64,
    ) -> Path {
        debug_assert_eq!(fwd.direction(), Direction::Forward);
        debug_assert_eq!(bwd.direction(), Direction::Backward);

        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut distance = 0.0;

        // Source -> meeting node
        let fwd_chain: Vec<_> = fwd.chain(fwd_entry).collect();
        for entry in fwd_chain.iter().rev() {
            if let Some(parent) = entry.parent {
                edges.push(entry.edge);
                distance += self.edge_distance(entry.edge, fwd.entry(parent).adj_node);
            }
            nodes.push(entry.adj_node);
        }

        let meeting = bwd.entry(bwd_entry);
        debug_assert_eq!(
            nodes.last().copied(),
            Some(meeting.adj_node),
            "forward and backward trees do not meet on one node"
        );

        // Meeting node -> target
        let mut current = meeting;
        while let Some(parent) = current.parent {
            let next = bwd.entry(parent);
            edges.push(current.edge);
            distance += self.edge_distance(current.edge, next.adj_node);
            nodes.push(next.adj_node);
            current = next;
        }

        tracing::trace!(
            n_nodes = nodes.len(),
            n_edges = edges.len(),
            weight,
            "extracted bidirectional path"
        );

        Path {
            found: true,
            weight,
            distance,
            nodes,
            edges,
        }
    }

    fn edge_distance(&self, edge: EdgeId, node: NodeId) -> f64 {
        self.graph
            .edge_view(edge, node)
            .map(|v| v.distance)
            .unwrap_or(0.0)
    }
}
