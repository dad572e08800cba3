//! Query lifecycle around the bidirectional engine
//!
//! `init` seeds both trees and runs the first expansion of each direction,
//! `run` alternates directions until the search is finished or a limit hits,
//! `extract` splices the result. `calc_path` does all three. An instance is
//! single use.

use std::fmt;
use std::time::{Duration, Instant};

use butterfly_common::{Error, Result};

use crate::bidir::{BestPath, BidirSearch, Lifecycle};
use crate::config::SearchConfig;
use crate::graph::{EdgeId, NodeId, RoutingGraph};
use crate::path::Path;
use crate::spt::{EntryFactory, PlainEntries};
use crate::traversal::{Direction, TraversalKey};
use crate::weighting::Weighting;

/// Why `run` stopped before the search finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    MaxVisitedNodes,
    Timeout,
}

impl fmt::Display for SearchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchLimit::MaxVisitedNodes => write!(f, "max_visited_nodes"),
            SearchLimit::Timeout => write!(f, "timeout"),
        }
    }
}

/// Per-query statistics
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub visited_fwd: usize,
    pub visited_bwd: usize,
    pub entries_fwd: usize,
    pub entries_bwd: usize,
    pub entries_updated: u64,
    pub meeting_updates: u64,
    pub elapsed: Duration,
    pub limit: Option<SearchLimit>,
}

impl SearchStats {
    pub fn visited(&self) -> usize {
        self.visited_fwd + self.visited_bwd
    }
}

impl<'a, G: RoutingGraph, W: Weighting> BidirSearch<'a, G, W, PlainEntries> {
    pub fn new(graph: &'a G, weighting: W, config: SearchConfig) -> Self {
        Self::with_entry_factory(graph, weighting, config, PlainEntries)
    }
}

impl<'a, G: RoutingGraph, W: Weighting, F: EntryFactory> BidirSearch<'a, G, W, F> {
    /// Seed both directions and run their first expansion
    ///
    /// `from_weight` / `to_weight` are the root weights; zero for plain
    /// node-to-node queries.
    pub fn init(&mut self, from: NodeId, from_weight: f64, to: NodeId, to_weight: f64) -> Result<()> {
        if self.lifecycle != Lifecycle::Fresh {
            return Err(Error::AlreadyRun);
        }
        self.config.validate()?;
        let edge_based = self.mode.is_edge_based();
        let pinned = self.from_out_edge.is_some() || self.to_in_edge.is_some();
        if pinned && !edge_based {
            // Node-based roots are indexed and would meet around the pin
            return Err(Error::InvalidConfig(
                "pinned edges require edge-based traversal".to_string(),
            ));
        }
        self.graph.check_node(from)?;
        self.graph.check_node(to)?;
        for edge in [self.from_out_edge, self.to_in_edge].into_iter().flatten() {
            self.graph.check_edge(edge)?;
        }

        self.lifecycle = Lifecycle::Initialized;
        self.started = Some(Instant::now());

        let root = self
            .factory
            .create_start_entry(from, from_weight, Direction::Forward);
        let fwd_root = self
            .fwd
            .push_root(root, (!edge_based).then_some(TraversalKey(from as u64)));
        let root = self
            .factory
            .create_start_entry(to, to_weight, Direction::Backward);
        let bwd_root = self
            .bwd
            .push_root(root, (!edge_based).then_some(TraversalKey(to as u64)));

        if from == to {
            if !edge_based {
                if self.config.update_best_path {
                    self.best = BestPath {
                        fwd: Some(fwd_root),
                        bwd: Some(bwd_root),
                        weight: from_weight + to_weight,
                    };
                }
            } else if !pinned {
                // Nothing to expand: the empty route is the answer
                self.best = BestPath {
                    fwd: Some(fwd_root),
                    bwd: Some(bwd_root),
                    weight: 0.0,
                };
                self.fwd.set_finished(true);
                self.bwd.set_finished(true);
                return Ok(());
            }
        }

        self.post_init(Direction::Forward);
        self.post_init(Direction::Backward);
        Ok(())
    }

    /// Alternate directions until finished or a configured limit is reached
    pub fn run(&mut self) {
        let started = *self.started.get_or_insert_with(Instant::now);
        let deadline = self.config.timeout().map(|t| started + t);
        let mut limit = None;

        while !self.finished() {
            if let Some(max) = self.config.max_visited_nodes {
                if self.visited_nodes() >= max {
                    limit = Some(SearchLimit::MaxVisitedNodes);
                    break;
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                limit = Some(SearchLimit::Timeout);
                break;
            }
            let direction = self.next_direction();
            self.advance(direction);
        }

        if let Some(limit) = limit {
            tracing::warn!(
                %limit,
                visited = self.visited_nodes(),
                best_weight = self.best.weight,
                "search stopped before finishing"
            );
        }
        self.limit = limit;
    }

    /// Expand the cheaper open direction; ties go forward
    fn next_direction(&self) -> Direction {
        match (self.fwd.peek_weight(), self.bwd.peek_weight()) {
            (None, _) => Direction::Forward,
            (_, None) => Direction::Backward,
            (Some(f), Some(b)) if f <= b => Direction::Forward,
            _ => Direction::Backward,
        }
    }

    /// True once no further expansion can improve the best meeting
    pub fn finished(&self) -> bool {
        if self.fwd.is_finished() || self.bwd.is_finished() {
            return true;
        }
        self.fwd.current_weight() + self.bwd.current_weight() >= self.best.weight
    }

    /// Shortest path between two nodes
    pub fn calc_path(&mut self, from: NodeId, to: NodeId) -> Result<Path> {
        self.calc_path_pinned(from, None, to, None)
    }

    /// Shortest path that leaves `from` over `from_out_edge` and reaches `to`
    /// over `to_in_edge`, where given
    pub fn calc_path_pinned(
        &mut self,
        from: NodeId,
        from_out_edge: Option<EdgeId>,
        to: NodeId,
        to_in_edge: Option<EdgeId>,
    ) -> Result<Path> {
        if self.lifecycle != Lifecycle::Fresh {
            return Err(Error::AlreadyRun);
        }
        self.set_pinned_original_edge(Direction::Forward, from_out_edge);
        self.set_pinned_original_edge(Direction::Backward, to_in_edge);

        tracing::debug!(
            from,
            to,
            ?from_out_edge,
            ?to_in_edge,
            algorithm = %self.name(),
            "bidirectional search"
        );

        self.init(from, 0.0, to, 0.0)?;
        self.run();
        let path = self.extract();

        tracing::debug!(
            found = path.found,
            weight = path.weight,
            n_edges = path.edges.len(),
            visited = self.visited_nodes(),
            elapsed_us = self.elapsed().as_micros() as u64,
            "search done"
        );
        Ok(path)
    }

    /// Entries settled by both directions
    pub fn visited_nodes(&self) -> usize {
        self.fwd.visited() + self.bwd.visited()
    }

    fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            visited_fwd: self.fwd.visited(),
            visited_bwd: self.bwd.visited(),
            entries_fwd: self.fwd.entry_count(),
            entries_bwd: self.bwd.entry_count(),
            entries_updated: self.counters.entries_updated,
            meeting_updates: self.counters.meeting_updates,
            elapsed: self.elapsed(),
            limit: self.limit,
        }
    }
}
