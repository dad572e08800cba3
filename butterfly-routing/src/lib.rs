//! Bidirectional Dijkstra routing for butterfly-osm
//!
//! Point-to-point shortest paths on graphs without preprocessing. Searches run
//! from both ends at once and stop when the two trees provably cannot meet
//! more cheaply than the best connection found. Node-based and edge-based
//! (turn-cost aware) traversal share one engine.
//!
//! ```
//! use butterfly_routing::{BidirSearch, CsrGraph, SearchConfig, ShortestWeighting};
//!
//! let mut b = CsrGraph::builder(3);
//! b.add_twoway(0, 1, 10.0).unwrap();
//! b.add_twoway(1, 2, 5.0).unwrap();
//! let graph = b.build();
//!
//! let mut search = BidirSearch::new(&graph, ShortestWeighting, SearchConfig::node_based());
//! let path = search.calc_path(0, 2).unwrap();
//! assert_eq!(path.nodes, vec![0, 1, 2]);
//! assert_eq!(path.weight, 15.0);
//! ```

pub mod batch;
pub mod bidir;
pub mod config;
pub mod filter;
pub mod frontier;
pub mod graph;
pub mod path;
pub mod search;
pub mod spt;
pub mod traversal;
pub mod turn_cost;
pub mod weighting;

pub use batch::calc_paths_parallel;
pub use bidir::{Advance, BestPath, BidirSearch};
pub use config::SearchConfig;
pub use filter::{AccessFilter, EdgeFilter, EdgeFilterExt, PinnedEdgeFilter};
pub use graph::{CsrGraph, EdgeId, EdgeView, GraphBuilder, NodeId, RoutingGraph, NO_EDGE};
pub use path::Path;
pub use search::{SearchLimit, SearchStats};
pub use spt::{EntryFactory, EntryId, PlainEntries, SptEntry};
pub use traversal::{Direction, TraversalKey, TraversalMode};
pub use turn_cost::{TurnCostTable, TurnCostWeighting};
pub use weighting::{FastestWeighting, ShortestWeighting, Weighting};

pub use butterfly_common::{Error, Result};
