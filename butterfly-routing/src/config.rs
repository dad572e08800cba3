//! Search configuration
//!
//! Loaded from TOML, e.g.
//!
//! ```toml
//! traversal_mode = "edge_based"
//! max_visited_nodes = 1000000
//! timeout_ms = 2000
//! ```

use std::path::Path;
use std::time::Duration;

use butterfly_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::traversal::TraversalMode;

/// Queue/index pre-allocation bounds, scaled from the graph size
const MIN_INITIAL_CAPACITY: usize = 200;
const MAX_INITIAL_CAPACITY: usize = 150_000;

/// Per-query search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub traversal_mode: TraversalMode,
    /// Stop after this many settled entries (both directions); unlimited if unset
    pub max_visited_nodes: Option<usize>,
    /// Stop after this much wall time; unlimited if unset
    pub timeout_ms: Option<u64>,
    /// Pre-allocated entries per direction; derived from the graph if unset
    pub initial_capacity: Option<usize>,
    /// Track the best meeting point while relaxing
    pub update_best_path: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            traversal_mode: TraversalMode::NodeBased,
            max_visited_nodes: None,
            timeout_ms: None,
            initial_capacity: None,
            update_best_path: true,
        }
    }
}

impl SearchConfig {
    pub fn node_based() -> Self {
        Self::default()
    }

    pub fn edge_based() -> Self {
        Self {
            traversal_mode: TraversalMode::EdgeBased,
            ..Self::default()
        }
    }

    pub fn with_max_visited_nodes(mut self, max: usize) -> Self {
        self.max_visited_nodes = Some(max);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Entries to pre-allocate per direction for a graph of `n_nodes`
    pub fn capacity_for(&self, n_nodes: usize) -> usize {
        self.initial_capacity
            .unwrap_or_else(|| (n_nodes / 10).clamp(MIN_INITIAL_CAPACITY, MAX_INITIAL_CAPACITY))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_visited_nodes == Some(0) {
            return Err(Error::InvalidConfig(
                "max_visited_nodes must be > 0".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::InvalidConfig("timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
