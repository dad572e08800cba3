//! Bidirectional Dijkstra without shortcuts
//!
//! Each call to [`BidirSearch::advance`] settles exactly one entry of one
//! direction: pop the cheapest open entry, then relax every admissible edge
//! around it. Relaxation also maintains the best meeting of the two trees, so
//! the controller (see `search.rs`) can stop as soon as neither frontier can
//! improve it.
//!
//! Node-based search keys states by node and rejects immediate U-turns on the
//! same edge. Edge-based search keys states by directed edge, which is what
//! turn costs need: the same node reached over two different edges stays two
//! states.

use std::time::Instant;

use crate::config::SearchConfig;
use crate::filter::{AccessFilter, EdgeFilter, PinnedEdgeFilter};
use crate::frontier::Frontier;
use crate::graph::{EdgeId, EdgeView, RoutingGraph, NO_EDGE};
use crate::path::{BidirPathExtractor, Path};
use crate::search::SearchLimit;
use crate::spt::{EntryFactory, EntryId, PlainEntries};
use crate::traversal::{Direction, TraversalKey, TraversalMode};
use crate::weighting::Weighting;

/// Outcome of one [`BidirSearch::advance`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// One entry was processed; the direction may continue
    Continue,
    /// The direction has nothing left that could improve the result
    Exhausted,
}

/// Best known connection between the two trees
#[derive(Debug, Clone, Copy)]
pub struct BestPath {
    pub fwd: Option<EntryId>,
    pub bwd: Option<EntryId>,
    pub weight: f64,
}

impl Default for BestPath {
    fn default() -> Self {
        Self {
            fwd: None,
            bwd: None,
            weight: f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Fresh,
    Initialized,
}

/// Relaxation counters
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub entries_updated: u64,
    pub meeting_updates: u64,
}

/// Point-to-point bidirectional search over a read-only graph
///
/// One instance answers one query. `F` decides what each tree entry carries.
pub struct BidirSearch<'a, G, W, F: EntryFactory = PlainEntries> {
    pub(crate) graph: &'a G,
    pub(crate) weighting: W,
    pub(crate) mode: TraversalMode,
    pub(crate) config: SearchConfig,
    pub(crate) factory: F,
    out_filter: AccessFilter,
    in_filter: AccessFilter,
    additional_filter: Option<Box<dyn EdgeFilter + 'a>>,
    pub(crate) fwd: Frontier<F::Extra>,
    pub(crate) bwd: Frontier<F::Extra>,
    pub(crate) best: BestPath,
    pub(crate) from_out_edge: Option<EdgeId>,
    pub(crate) to_in_edge: Option<EdgeId>,
    pub(crate) counters: Counters,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) started: Option<Instant>,
    pub(crate) limit: Option<SearchLimit>,
}

impl<'a, G: RoutingGraph, W: Weighting, F: EntryFactory> BidirSearch<'a, G, W, F> {
    /// Search using a custom entry factory
    pub fn with_entry_factory(graph: &'a G, weighting: W, config: SearchConfig, factory: F) -> Self {
        let capacity = config.capacity_for(graph.node_count());
        Self {
            graph,
            weighting,
            mode: config.traversal_mode,
            config,
            factory,
            out_filter: AccessFilter::out_edges(),
            in_filter: AccessFilter::in_edges(),
            additional_filter: None,
            fwd: Frontier::new(Direction::Forward, capacity),
            bwd: Frontier::new(Direction::Backward, capacity),
            best: BestPath::default(),
            from_out_edge: None,
            to_in_edge: None,
            counters: Counters::default(),
            lifecycle: Lifecycle::Fresh,
            started: None,
            limit: None,
        }
    }

    /// Restrict the search to edges `filter` accepts, on top of access rules
    pub fn set_edge_filter(&mut self, filter: impl EdgeFilter + 'a) -> &mut Self {
        self.additional_filter = Some(Box::new(filter));
        self
    }

    pub fn clear_edge_filter(&mut self) -> &mut Self {
        self.additional_filter = None;
        self
    }

    /// Pin the first expansion of `direction` to an original edge
    ///
    /// Forward: the route must leave the source over `orig_edge`. Backward:
    /// it must arrive at the target over it. Takes effect at `init`.
    pub fn set_pinned_original_edge(&mut self, direction: Direction, orig_edge: Option<EdgeId>) {
        match direction {
            Direction::Forward => self.from_out_edge = orig_edge,
            Direction::Backward => self.to_in_edge = orig_edge,
        }
    }

    #[inline]
    pub fn frontier(&self, direction: Direction) -> &Frontier<F::Extra> {
        match direction {
            Direction::Forward => &self.fwd,
            Direction::Backward => &self.bwd,
        }
    }

    #[inline]
    pub(crate) fn frontier_mut(&mut self, direction: Direction) -> &mut Frontier<F::Extra> {
        match direction {
            Direction::Forward => &mut self.fwd,
            Direction::Backward => &mut self.bwd,
        }
    }

    #[inline]
    pub fn best_path(&self) -> BestPath {
        self.best
    }

    /// Settle one entry of `direction`
    pub fn advance(&mut self, direction: Direction) -> Advance {
        self.advance_with(direction, None)
    }

    /// [`advance`](Self::advance) with an extra filter for this step only
    ///
    /// An `Exhausted` result marks the direction finished.
    pub(crate) fn advance_with(
        &mut self,
        direction: Direction,
        step_filter: Option<&dyn EdgeFilter>,
    ) -> Advance {
        let result = self.settle_next(direction, step_filter);
        if result == Advance::Exhausted {
            self.frontier_mut(direction).set_finished(true);
        }
        result
    }

    fn settle_next(&mut self, direction: Direction, step_filter: Option<&dyn EdgeFilter>) -> Advance {
        let Some((id, seen)) = self.frontier_mut(direction).pop() else {
            return Advance::Exhausted;
        };
        if self.entry_can_be_skipped(seen) {
            return Advance::Continue;
        }
        let weight = self.frontier(direction).entry(id).weight;
        if self.search_can_be_stopped(weight) {
            return Advance::Exhausted;
        }
        self.relax(direction, id, step_filter);
        Advance::Continue
    }

    /// Entries popped a second time were already expanded at a lower weight
    #[inline]
    fn entry_can_be_skipped(&self, seen: bool) -> bool {
        seen
    }

    /// Nothing at or above the best meeting weight can improve it
    #[inline]
    fn search_can_be_stopped(&self, weight: f64) -> bool {
        weight >= self.best.weight
    }

    /// First expansion of a direction, honoring its pinned original edge
    pub(crate) fn post_init(&mut self, direction: Direction) -> Advance {
        let pin = match direction {
            Direction::Forward => self.from_out_edge,
            Direction::Backward => self.to_in_edge,
        };
        match pin {
            None => self.advance_with(direction, None),
            Some(orig_edge) => {
                let pinned = PinnedEdgeFilter::new(orig_edge, direction);
                self.advance_with(direction, Some(&pinned))
            }
        }
    }

    fn relax(&mut self, direction: Direction, current: EntryId, step_filter: Option<&dyn EdgeFilter>) {
        let reverse = direction.is_reverse();
        let graph = self.graph;
        let (node, inc_edge, base_weight) = {
            let entry = self.frontier(direction).entry(current);
            (entry.adj_node, entry.edge, entry.weight)
        };

        for edge in graph.edges(node) {
            if !self.accept(&edge, inc_edge, step_filter) {
                continue;
            }
            let weight = self.calc_weight(&edge, inc_edge, base_weight, reverse);
            if weight.is_infinite() {
                continue;
            }

            let orig_edge = edge.edge;
            let key = self.mode.key_for(&edge, reverse);
            let frontier = match direction {
                Direction::Forward => &mut self.fwd,
                Direction::Backward => &mut self.bwd,
            };

            let entry_id = match frontier.lookup(key) {
                None => {
                    let entry = self
                        .factory
                        .create_entry(&edge, orig_edge, weight, current, direction);
                    frontier.insert(key, entry)
                }
                Some(existing) if frontier.entry(existing).weight > weight => {
                    self.factory.update_entry(
                        frontier.entry_mut(existing),
                        &edge,
                        orig_edge,
                        weight,
                        current,
                        direction,
                    );
                    frontier.requeue(existing);
                    self.counters.entries_updated += 1;
                    existing
                }
                Some(_) => continue,
            };

            if self.config.update_best_path {
                // Only edge-based meetings need the plain edge weight
                let edge_weight = if self.mode.is_edge_based() {
                    self.weighting.calc_weight(&edge, reverse, NO_EDGE)
                } else {
                    f64::INFINITY
                };
                self.update_best_path(edge_weight, entry_id, key, direction);
            }
        }
    }

    #[inline]
    fn accept(&self, edge: &EdgeView, inc_edge: EdgeId, step_filter: Option<&dyn EdgeFilter>) -> bool {
        // Edge-based search leaves U-turns to the weighting
        if !self.mode.is_edge_based() && edge.edge == inc_edge {
            return false;
        }
        self.additional_filter
            .as_ref()
            .is_none_or(|f| f.accept(edge))
            && step_filter.is_none_or(|f| f.accept(edge))
    }

    #[inline]
    fn calc_weight(&self, edge: &EdgeView, inc_edge: EdgeId, base_weight: f64, reverse: bool) -> f64 {
        let access = if reverse {
            self.in_filter.accept(edge)
        } else {
            self.out_filter.accept(edge)
        };
        if !access {
            return f64::INFINITY;
        }
        self.weighting.calc_weight(edge, reverse, inc_edge) + base_weight
    }

    /// Check whether `entry_id` connects to the opposite tree more cheaply
    /// than the best meeting so far
    fn update_best_path(
        &mut self,
        edge_weight: f64,
        entry_id: EntryId,
        key: TraversalKey,
        direction: Direction,
    ) {
        let (this, other) = match direction {
            Direction::Forward => (&self.fwd, &self.bwd),
            Direction::Backward => (&self.bwd, &self.fwd),
        };
        let Some(other_id) = other.lookup(key) else {
            return;
        };

        let entry = this.entry(entry_id);
        let other_entry = other.entry(other_id);
        let mut weight = entry.weight + other_entry.weight;
        let mut meeting_id = entry_id;

        if self.mode.is_edge_based() {
            debug_assert_eq!(
                entry.edge, other_entry.edge,
                "edge-based meeting on different edges"
            );
            // Both trees contain the meeting edge; keep it in the other one only
            let Some(parent) = entry.parent else {
                return;
            };
            meeting_id = parent;
            weight -= edge_weight;
        }

        if weight < self.best.weight {
            let (fwd, bwd) = match direction {
                Direction::Forward => (meeting_id, other_id),
                Direction::Backward => (other_id, meeting_id),
            };
            tracing::trace!(
                direction = %direction,
                node = this.entry(meeting_id).adj_node,
                weight,
                previous = self.best.weight,
                "best path improved"
            );
            self.best = BestPath {
                fwd: Some(fwd),
                bwd: Some(bwd),
                weight,
            };
            self.counters.meeting_updates += 1;
        }
    }

    /// The route found, or an empty path if the search did not finish or the
    /// trees never met
    pub fn extract(&self) -> Path {
        if !self.finished() {
            return Path::not_found();
        }
        match (self.best.fwd, self.best.bwd) {
            (Some(fwd), Some(bwd)) if self.best.weight.is_finite() => {
                BidirPathExtractor::new(self.graph).extract(
                    &self.fwd,
                    fwd,
                    &self.bwd,
                    bwd,
                    self.best.weight,
                )
            }
            _ => Path::not_found(),
        }
    }

    pub fn name(&self) -> String {
        format!("dijkstrabi|{}|{}", self.weighting.name(), self.mode)
    }
}
