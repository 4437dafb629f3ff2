//! Error types for the shape-graph crate

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The ID does not belong to this graph
    #[error("Unknown shape: {0}")]
    UnknownShape(usize),
}
