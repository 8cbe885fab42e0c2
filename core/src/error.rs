//! Common error types for OSP graph operations.

use crate::{EdgeId, Location, NodeId};
use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An operation referenced a node or edge that does not exist.
    #[error("Invalid reference: {0} does not exist")]
    InvalidReference(Location),

    /// Delete or lookup target is absent.
    #[error("Not found: {0}")]
    NotFound(Location),

    /// A value or archetype did not match what the operation expects.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The root node cannot be removed by normal deletion.
    #[error("Cannot delete root node {0}")]
    RootProtected(NodeId),
}

impl GraphError {
    pub fn invalid_node(id: NodeId) -> Self {
        Self::InvalidReference(Location::Node(id))
    }

    pub fn invalid_edge(id: EdgeId) -> Self {
        Self::InvalidReference(Location::Edge(id))
    }

    pub fn node_not_found(id: NodeId) -> Self {
        Self::NotFound(Location::Node(id))
    }

    pub fn edge_not_found(id: EdgeId) -> Self {
        Self::NotFound(Location::Edge(id))
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
