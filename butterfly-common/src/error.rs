//! Error types for the butterfly-osm routing toolkit
//!
//! Routing itself degrades gracefully: an unreachable target is reported as an
//! empty path, not as an error. The variants below cover misuse of the API
//! (unknown ids, a search object reused) and configuration problems.

use thiserror::Error;

/// Main error type for butterfly-osm operations
#[derive(Debug, Error)]
pub enum Error {
    /// Node id outside the graph
    #[error("Node {node} not found (graph has {node_count} nodes)")]
    NodeNotFound { node: u32, node_count: usize },

    /// Edge id outside the graph
    #[error("Edge {edge} not found (graph has {edge_count} edges)")]
    EdgeNotFound { edge: u32, edge_count: usize },

    /// A search object was asked to run a second query
    #[error("Search already ran; create a new search object per query")]
    AlreadyRun,

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for butterfly-osm operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::NodeNotFound {
            node: 7,
            node_count: 5,
        };
        assert_eq!(err.to_string(), "Node 7 not found (graph has 5 nodes)");

        let err = Error::InvalidConfig("timeout_ms must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: timeout_ms must be > 0"
        );
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.source().is_some());
    }
}
