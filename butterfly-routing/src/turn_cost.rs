//! Turn costs for edge-based search
//!
//! Only a tiny fraction of junctions carries explicit turn rules, so the table
//! keeps a set of restricted via nodes and answers everything else with a zero
//! cost before touching the rule maps.
//!
//! ## Rule kinds
//!
//! - **Ban**: cannot turn from `from_edge` to `to_edge` at `via_node`
//! - **Only**: from `from_edge` at `via_node`, only the listed `to_edge`s are allowed
//! - **Penalty**: extra cost for a specific turn
//!
//! U-turns (continuing on the edge just travelled) are priced by
//! [`TurnCostWeighting`], forbidden by default.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{EdgeId, EdgeView, NodeId, NO_EDGE};
use crate::weighting::Weighting;

/// Turn rule table keyed by (from edge, via node, to edge)
#[derive(Debug, Clone, Default)]
pub struct TurnCostTable {
    restricted_nodes: FxHashSet<NodeId>,
    bans: FxHashSet<(EdgeId, NodeId, EdgeId)>,
    /// (from_edge, via_node) -> allowed to_edges
    only_allowed: FxHashMap<(EdgeId, NodeId), Vec<EdgeId>>,
    penalties: FxHashMap<(EdgeId, NodeId, EdgeId), f64>,
}

impl TurnCostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid the turn `from_edge -> to_edge` at `via_node`
    pub fn ban(&mut self, from_edge: EdgeId, via_node: NodeId, to_edge: EdgeId) -> &mut Self {
        self.restricted_nodes.insert(via_node);
        self.bans.insert((from_edge, via_node, to_edge));
        self
    }

    /// Allow `to_edge` as a continuation of `from_edge` at `via_node`,
    /// forbidding every continuation not registered the same way
    pub fn only(&mut self, from_edge: EdgeId, via_node: NodeId, to_edge: EdgeId) -> &mut Self {
        self.restricted_nodes.insert(via_node);
        let allowed = self.only_allowed.entry((from_edge, via_node)).or_default();
        if !allowed.contains(&to_edge) {
            allowed.push(to_edge);
        }
        self
    }

    /// Add `cost` to the turn `from_edge -> to_edge` at `via_node`
    pub fn penalty(
        &mut self,
        from_edge: EdgeId,
        via_node: NodeId,
        to_edge: EdgeId,
        cost: f64,
    ) -> &mut Self {
        self.restricted_nodes.insert(via_node);
        self.penalties.insert((from_edge, via_node, to_edge), cost);
        self
    }

    #[inline]
    pub fn is_restricted(&self, node: NodeId) -> bool {
        self.restricted_nodes.contains(&node)
    }

    /// Number of junctions carrying at least one rule
    pub fn restricted_node_count(&self) -> usize {
        self.restricted_nodes.len()
    }

    /// Cost of turning from `from_edge` to `to_edge` at `via_node`
    ///
    /// U-turns are not handled here; see [`TurnCostWeighting`].
    pub fn turn_cost(&self, from_edge: EdgeId, via_node: NodeId, to_edge: EdgeId) -> f64 {
        if from_edge == NO_EDGE || to_edge == NO_EDGE {
            return 0.0;
        }
        // Fast path: not a restricted node
        if !self.restricted_nodes.contains(&via_node) {
            return 0.0;
        }
        if self.bans.contains(&(from_edge, via_node, to_edge)) {
            return f64::INFINITY;
        }
        if let Some(allowed) = self.only_allowed.get(&(from_edge, via_node)) {
            if !allowed.contains(&to_edge) {
                return f64::INFINITY;
            }
        }
        self.penalties
            .get(&(from_edge, via_node, to_edge))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Adds turn costs to another weighting
///
/// Use with edge-based traversal; node-based search keys states by node and
/// keeps only one incoming edge per node.
#[derive(Debug, Clone)]
pub struct TurnCostWeighting<W> {
    inner: W,
    table: TurnCostTable,
    u_turn_cost: f64,
}

impl<W: Weighting> TurnCostWeighting<W> {
    pub fn new(inner: W, table: TurnCostTable) -> Self {
        Self {
            inner,
            table,
            u_turn_cost: f64::INFINITY,
        }
    }

    /// Allow U-turns at the given cost
    pub fn with_u_turn_cost(mut self, cost: f64) -> Self {
        self.u_turn_cost = cost;
        self
    }

    fn calc_turn_weight(&self, from_edge: EdgeId, via_node: NodeId, to_edge: EdgeId) -> f64 {
        if from_edge == to_edge {
            return self.u_turn_cost;
        }
        self.table.turn_cost(from_edge, via_node, to_edge)
    }
}

impl<W: Weighting> Weighting for TurnCostWeighting<W> {
    fn calc_weight(&self, edge: &EdgeView, reverse: bool, prev_or_next_edge: EdgeId) -> f64 {
        let weight = self.inner.calc_weight(edge, reverse, prev_or_next_edge);
        if prev_or_next_edge == NO_EDGE || weight.is_infinite() {
            return weight;
        }
        // The turn happens at base: forward arrives there on prev, backward
        // leaves it on next.
        let turn = if reverse {
            self.calc_turn_weight(edge.edge, edge.base_node, prev_or_next_edge)
        } else {
            self.calc_turn_weight(prev_or_next_edge, edge.base_node, edge.edge)
        };
        weight + turn
    }

    fn name(&self) -> &str {
        "turn_cost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighting::ShortestWeighting;

    fn view(edge: EdgeId, base_node: NodeId, adj_node: NodeId) -> EdgeView {
        EdgeView {
            edge,
            base_node,
            adj_node,
            reversed: false,
            orig_edge_first: edge,
            orig_edge_last: edge,
            distance: 10.0,
            speed_fwd: 50.0,
            speed_bwd: 50.0,
        }
    }

    #[test]
    fn test_unrestricted_node_is_free() {
        let mut table = TurnCostTable::new();
        table.ban(1, 5, 2);
        assert_eq!(table.turn_cost(1, 4, 2), 0.0);
        assert!(!table.is_restricted(4));
        assert!(table.is_restricted(5));
    }

    #[test]
    fn test_ban() {
        let mut table = TurnCostTable::new();
        table.ban(1, 5, 2);
        assert!(table.turn_cost(1, 5, 2).is_infinite());
        assert_eq!(table.turn_cost(1, 5, 3), 0.0);
        assert_eq!(table.turn_cost(NO_EDGE, 5, 2), 0.0);
    }

    #[test]
    fn test_only() {
        let mut table = TurnCostTable::new();
        table.only(1, 5, 2).only(1, 5, 3);
        assert_eq!(table.turn_cost(1, 5, 2), 0.0);
        assert_eq!(table.turn_cost(1, 5, 3), 0.0);
        assert!(table.turn_cost(1, 5, 4).is_infinite());
        // Other approaches are unaffected
        assert_eq!(table.turn_cost(7, 5, 4), 0.0);
    }

    #[test]
    fn test_penalty() {
        let mut table = TurnCostTable::new();
        table.penalty(1, 5, 2, 7.5);
        assert_eq!(table.turn_cost(1, 5, 2), 7.5);
        assert_eq!(table.restricted_node_count(), 1);
    }

    #[test]
    fn test_weighting_forward_and_backward_orientation() {
        let mut table = TurnCostTable::new();
        table.penalty(1, 5, 2, 3.0);
        let w = TurnCostWeighting::new(ShortestWeighting, table);

        // Forward: arrived at 5 on edge 1, continue on edge 2
        assert_eq!(w.calc_weight(&view(2, 5, 6), false, 1), 13.0);
        // Backward: edge 1 travelled into 5, then continue onto edge 2
        assert_eq!(w.calc_weight(&view(1, 5, 4), true, 2), 13.0);
        // Opposite turn carries no penalty
        assert_eq!(w.calc_weight(&view(1, 5, 4), false, 2), 10.0);
    }

    #[test]
    fn test_u_turn_cost() {
        let w = TurnCostWeighting::new(ShortestWeighting, TurnCostTable::new());
        assert!(w.calc_weight(&view(1, 5, 4), false, 1).is_infinite());
        assert_eq!(w.calc_weight(&view(1, 5, 4), false, NO_EDGE), 10.0);

        let w = w.with_u_turn_cost(20.0);
        assert_eq!(w.calc_weight(&view(1, 5, 4), false, 1), 30.0);
    }
}
