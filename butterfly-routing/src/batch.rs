//! Many independent queries against one shared graph
//!
//! Each query gets its own search instance; the graph and weighting are only
//! borrowed, so queries run on the rayon pool without coordination.

use rayon::prelude::*;

use butterfly_common::Result;

use crate::bidir::BidirSearch;
use crate::config::SearchConfig;
use crate::graph::{NodeId, RoutingGraph};
use crate::path::Path;
use crate::weighting::Weighting;

/// Route every `(from, to)` pair in parallel; results keep the query order
pub fn calc_paths_parallel<G, W>(
    graph: &G,
    weighting: &W,
    config: &SearchConfig,
    queries: &[(NodeId, NodeId)],
) -> Vec<Result<Path>>
where
    G: RoutingGraph,
    W: Weighting,
{
    let t0 = std::time::Instant::now();
    let results: Vec<Result<Path>> = queries
        .par_iter()
        .map(|&(from, to)| BidirSearch::new(graph, weighting, config.clone()).calc_path(from, to))
        .collect();

    let found = results
        .iter()
        .filter(|r| matches!(r, Ok(p) if p.is_found()))
        .count();
    tracing::debug!(
        n_queries = queries.len(),
        found,
        threads = rayon::current_num_threads(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "batch routed"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CsrGraph;
    use crate::weighting::ShortestWeighting;

    #[test]
    fn test_batch_matches_sequential() {
        let mut b = CsrGraph::builder(6);
        for i in 0..5 {
            b.add_twoway(i, i + 1, (i + 1) as f64).unwrap();
        }
        b.add_oneway(0, 5, 100.0).unwrap();
        let g = b.build();

        let queries: Vec<(NodeId, NodeId)> = (0..6)
            .flat_map(|a| (0..6).map(move |b| (a, b)))
            .collect();
        let config = SearchConfig::node_based();
        let parallel = calc_paths_parallel(&g, &ShortestWeighting, &config, &queries);

        assert_eq!(parallel.len(), queries.len());
        for (&(from, to), result) in queries.iter().zip(&parallel) {
            let expected = BidirSearch::new(&g, ShortestWeighting, config.clone())
                .calc_path(from, to)
                .unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected, "{from} -> {to}");
        }
    }

    #[test]
    fn test_batch_reports_errors_per_query() {
        let mut b = CsrGraph::builder(2);
        b.add_twoway(0, 1, 1.0).unwrap();
        let g = b.build();

        let results = calc_paths_parallel(
            &g,
            &ShortestWeighting,
            &SearchConfig::node_based(),
            &[(0, 1), (0, 9)],
        );
        assert!(results[0].as_ref().unwrap().is_found());
        assert!(results[1].is_err());
    }
}
