//! Edge weightings
//!
//! A weighting turns one edge traversal into a cost. `f64::INFINITY` means the
//! traversal is not allowed (no access, banned turn). Weights must be
//! non-negative and deterministic; the search does not check this on the hot
//! path.

use crate::graph::{EdgeId, EdgeView};

/// Cost of traversing an edge
pub trait Weighting: Send + Sync {
    /// Weight of travelling `edge`
    ///
    /// `reverse` is true when the edge is travelled adj -> base, i.e. while
    /// expanding the backward search. `prev_or_next_edge` is the edge the
    /// traversal continues from (forward) or into (backward); `NO_EDGE` when
    /// unknown, in which case no turn cost applies.
    fn calc_weight(&self, edge: &EdgeView, reverse: bool, prev_or_next_edge: EdgeId) -> f64;

    /// Short name used in logs
    fn name(&self) -> &str;
}

impl<W: Weighting + ?Sized> Weighting for &W {
    fn calc_weight(&self, edge: &EdgeView, reverse: bool, prev_or_next_edge: EdgeId) -> f64 {
        (**self).calc_weight(edge, reverse, prev_or_next_edge)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Weight = length in metres
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortestWeighting;

impl Weighting for ShortestWeighting {
    #[inline]
    fn calc_weight(&self, edge: &EdgeView, _reverse: bool, _prev_or_next_edge: EdgeId) -> f64 {
        edge.distance
    }

    fn name(&self) -> &str {
        "shortest"
    }
}

/// Weight = travel time in seconds at the edge speed
///
/// Speeds above `max_speed_kmh` are capped, so the profile's top speed bounds
/// what the graph data can claim.
#[derive(Debug, Clone, Copy)]
pub struct FastestWeighting {
    max_speed_kmh: f64,
}

impl FastestWeighting {
    pub fn new(max_speed_kmh: f64) -> Self {
        Self { max_speed_kmh }
    }
}

impl Default for FastestWeighting {
    fn default() -> Self {
        Self::new(130.0)
    }
}

impl Weighting for FastestWeighting {
    #[inline]
    fn calc_weight(&self, edge: &EdgeView, reverse: bool, _prev_or_next_edge: EdgeId) -> f64 {
        let speed_kmh = edge.speed(reverse).min(self.max_speed_kmh);
        if speed_kmh <= 0.0 {
            return f64::INFINITY;
        }
        edge.distance / (speed_kmh / 3.6)
    }

    fn name(&self) -> &str {
        "fastest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NO_EDGE;

    fn view(speed_fwd: f64, speed_bwd: f64) -> EdgeView {
        EdgeView {
            edge: 0,
            base_node: 0,
            adj_node: 1,
            reversed: false,
            orig_edge_first: 0,
            orig_edge_last: 0,
            distance: 1000.0,
            speed_fwd,
            speed_bwd,
        }
    }

    #[test]
    fn test_shortest_is_distance() {
        let w = ShortestWeighting;
        assert_eq!(w.calc_weight(&view(50.0, 0.0), false, NO_EDGE), 1000.0);
        assert_eq!(w.calc_weight(&view(50.0, 0.0), true, 3), 1000.0);
    }

    #[test]
    fn test_fastest_uses_directional_speed() {
        let w = FastestWeighting::default();
        // 1 km at 36 km/h = 100 s
        assert!((w.calc_weight(&view(36.0, 72.0), false, NO_EDGE) - 100.0).abs() < 1e-9);
        assert!((w.calc_weight(&view(36.0, 72.0), true, NO_EDGE) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fastest_no_access_is_infinite() {
        let w = FastestWeighting::default();
        assert!(w.calc_weight(&view(50.0, 0.0), true, NO_EDGE).is_infinite());
    }

    #[test]
    fn test_fastest_caps_speed() {
        let w = FastestWeighting::new(36.0);
        assert!((w.calc_weight(&view(200.0, 0.0), false, NO_EDGE) - 100.0).abs() < 1e-9);
    }
}
