//! Graph access for the search engine
//!
//! The engine only needs a neighborhood explorer: for a node, every incident
//! edge seen from that node. Edges are stored once and carry an access speed
//! per direction, so a two-way road is a single edge id (as in the NBG).
//!
//! [`CsrGraph`] is the in-memory implementation: flat offsets/targets arrays,
//! the same layout the CH topology files use.

use butterfly_common::{Error, Result};

/// Compact node id
pub type NodeId = u32;

/// Compact edge id
pub type EdgeId = u32;

/// Sentinel for "no edge" (root entries, turn-agnostic weight calls)
pub const NO_EDGE: EdgeId = u32::MAX;

/// An edge as seen while exploring `base_node`
///
/// Speeds and original-edge ids are oriented along the view: `speed_fwd` is the
/// speed for travelling base -> adj, `orig_edge_first` is the original edge at
/// the base end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView {
    pub edge: EdgeId,
    pub base_node: NodeId,
    pub adj_node: NodeId,
    /// True when the view runs against the storage orientation (to -> from)
    pub reversed: bool,
    pub orig_edge_first: EdgeId,
    pub orig_edge_last: EdgeId,
    /// Length in metres
    pub distance: f64,
    /// km/h for base -> adj, 0 = no access
    pub speed_fwd: f64,
    /// km/h for adj -> base, 0 = no access
    pub speed_bwd: f64,
}

impl EdgeView {
    /// Can the edge be travelled from base to adj?
    #[inline]
    pub fn can_travel_forward(&self) -> bool {
        self.speed_fwd > 0.0
    }

    /// Can the edge be travelled from adj to base?
    #[inline]
    pub fn can_travel_backward(&self) -> bool {
        self.speed_bwd > 0.0
    }

    /// Speed in the travel direction; `reverse` means adj -> base
    #[inline]
    pub fn speed(&self, reverse: bool) -> f64 {
        if reverse {
            self.speed_bwd
        } else {
            self.speed_fwd
        }
    }
}

/// Read-only neighborhood explorer consumed by the search
///
/// Implementations must be safe to share between concurrent searches.
pub trait RoutingGraph: Send + Sync {
    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// All edges incident to `node`, each viewed with `base_node == node`
    fn edges(&self, node: NodeId) -> impl Iterator<Item = EdgeView> + '_;

    /// View of `edge` oriented so that it ends at `adj_node`
    fn edge_view(&self, edge: EdgeId, adj_node: NodeId) -> Option<EdgeView>;

    /// The endpoint of `edge` that is not `node`
    fn other_node(&self, edge: EdgeId, node: NodeId) -> NodeId;

    fn check_node(&self, node: NodeId) -> Result<()> {
        if (node as usize) < self.node_count() {
            Ok(())
        } else {
            Err(Error::NodeNotFound {
                node,
                node_count: self.node_count(),
            })
        }
    }

    fn check_edge(&self, edge: EdgeId) -> Result<()> {
        if (edge as usize) < self.edge_count() {
            Ok(())
        } else {
            Err(Error::EdgeNotFound {
                edge,
                edge_count: self.edge_count(),
            })
        }
    }
}

/// Stored edge record
#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    from: NodeId,
    to: NodeId,
    distance: f64,
    speed_fwd: f64,
    speed_bwd: f64,
}

/// CSR adjacency over undirected edge storage
#[derive(Debug, Clone)]
pub struct CsrGraph {
    n_nodes: usize,
    edges: Vec<EdgeRecord>,
    /// offsets[n]..offsets[n + 1] indexes `adj_edges` / `adj_reversed`
    offsets: Vec<u64>,
    adj_edges: Vec<EdgeId>,
    adj_reversed: Vec<bool>,
}

impl CsrGraph {
    pub fn builder(n_nodes: usize) -> GraphBuilder {
        GraphBuilder::new(n_nodes)
    }

    #[inline]
    fn view(&self, edge: EdgeId, reversed: bool) -> EdgeView {
        let rec = &self.edges[edge as usize];
        let (base_node, adj_node, speed_fwd, speed_bwd) = if reversed {
            (rec.to, rec.from, rec.speed_bwd, rec.speed_fwd)
        } else {
            (rec.from, rec.to, rec.speed_fwd, rec.speed_bwd)
        };
        EdgeView {
            edge,
            base_node,
            adj_node,
            reversed,
            orig_edge_first: edge,
            orig_edge_last: edge,
            distance: rec.distance,
            speed_fwd,
            speed_bwd,
        }
    }
}

impl RoutingGraph for CsrGraph {
    fn node_count(&self) -> usize {
        self.n_nodes
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn edges(&self, node: NodeId) -> impl Iterator<Item = EdgeView> + '_ {
        let start = self.offsets[node as usize] as usize;
        let end = self.offsets[node as usize + 1] as usize;
        (start..end).map(move |i| self.view(self.adj_edges[i], self.adj_reversed[i]))
    }

    fn edge_view(&self, edge: EdgeId, adj_node: NodeId) -> Option<EdgeView> {
        let rec = self.edges.get(edge as usize)?;
        if rec.to == adj_node {
            Some(self.view(edge, false))
        } else if rec.from == adj_node {
            Some(self.view(edge, true))
        } else {
            None
        }
    }

    fn other_node(&self, edge: EdgeId, node: NodeId) -> NodeId {
        let rec = &self.edges[edge as usize];
        if rec.from == node {
            rec.to
        } else {
            rec.from
        }
    }
}

/// Collects edges, then lays them out as CSR
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    n_nodes: usize,
    edges: Vec<EdgeRecord>,
}

impl GraphBuilder {
    pub fn new(n_nodes: usize) -> Self {
        Self {
            n_nodes,
            edges: Vec::new(),
        }
    }

    /// Add an edge; a speed of 0 closes that direction
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        distance: f64,
        speed_fwd: f64,
        speed_bwd: f64,
    ) -> Result<EdgeId> {
        for node in [from, to] {
            if node as usize >= self.n_nodes {
                return Err(Error::NodeNotFound {
                    node,
                    node_count: self.n_nodes,
                });
            }
        }
        if distance.is_nan() || distance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "edge {from}->{to} has invalid distance {distance}"
            )));
        }
        let id = self.edges.len() as EdgeId;
        self.edges.push(EdgeRecord {
            from,
            to,
            distance,
            speed_fwd,
            speed_bwd,
        });
        Ok(id)
    }

    /// One-way edge at 50 km/h
    pub fn add_oneway(&mut self, from: NodeId, to: NodeId, distance: f64) -> Result<EdgeId> {
        self.add_edge(from, to, distance, 50.0, 0.0)
    }

    /// Two-way edge at 50 km/h
    pub fn add_twoway(&mut self, from: NodeId, to: NodeId, distance: f64) -> Result<EdgeId> {
        self.add_edge(from, to, distance, 50.0, 50.0)
    }

    pub fn build(self) -> CsrGraph {
        let n = self.n_nodes;
        let mut degree = vec![0u64; n];
        for rec in &self.edges {
            degree[rec.from as usize] += 1;
            degree[rec.to as usize] += 1;
        }

        let mut offsets = vec![0u64; n + 1];
        for i in 0..n {
            offsets[i + 1] = offsets[i] + degree[i];
        }

        let total = offsets[n] as usize;
        let mut adj_edges = vec![0 as EdgeId; total];
        let mut adj_reversed = vec![false; total];
        let mut cursor: Vec<u64> = offsets[..n].to_vec();

        for (id, rec) in self.edges.iter().enumerate() {
            let slot = cursor[rec.from as usize] as usize;
            adj_edges[slot] = id as EdgeId;
            adj_reversed[slot] = false;
            cursor[rec.from as usize] += 1;

            // Loops get both views too, one per travel orientation
            let slot = cursor[rec.to as usize] as usize;
            adj_edges[slot] = id as EdgeId;
            adj_reversed[slot] = true;
            cursor[rec.to as usize] += 1;
        }

        CsrGraph {
            n_nodes: n,
            edges: self.edges,
            offsets,
            adj_edges,
            adj_reversed,
        }
    }
}
