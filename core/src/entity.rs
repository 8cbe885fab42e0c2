//! Entity structures for OSP.
//!
//! Nodes and edges are the two persistent entity kinds of the graph. Nodes
//! keep ordered adjacency lists of edge ids; edges name exactly one source and
//! one target node.

use crate::{Attributes, EdgeId, EdgeTypeId, NodeId, TypeId, Value};

/// A node in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Type of this node (reference to registry).
    pub type_id: TypeId,
    /// Attribute values.
    pub attributes: Attributes,
    /// Outgoing edges in insertion order.
    pub outgoing: Vec<EdgeId>,
    /// Incoming edges in insertion order. Back-references only.
    pub incoming: Vec<EdgeId>,
}

impl Node {
    /// Create a new node with no adjacency.
    pub fn new(id: NodeId, type_id: TypeId, attributes: Attributes) -> Self {
        Self {
            id,
            type_id,
            attributes,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Get an attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute value, returning the previous one.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    /// Number of incident edges, counting a self-loop twice.
    pub fn degree(&self) -> usize {
        self.outgoing.len() + self.incoming.len()
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Type of this edge (reference to registry).
    pub type_id: EdgeTypeId,
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Creation sequence; orders edges across adjacency lists.
    pub seq: u64,
    /// Attribute values.
    pub attributes: Attributes,
}

impl Edge {
    /// Create a new edge.
    pub fn new(
        id: EdgeId,
        type_id: EdgeTypeId,
        source: NodeId,
        target: NodeId,
        seq: u64,
        attributes: Attributes,
    ) -> Self {
        Self {
            id,
            type_id,
            source,
            target,
            seq,
            attributes,
        }
    }

    /// Get an attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute value, returning the previous one.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(name.into(), value)
    }

    /// Check if this edge touches a node at either end.
    pub fn involves(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// The endpoint opposite to `from`. For a self-loop this is `from` itself.
    pub fn opposite(&self, from: NodeId) -> Option<NodeId> {
        if self.source == from {
            Some(self.target)
        } else if self.target == from {
            Some(self.source)
        } else {
            None
        }
    }

    /// Returns true if source and target are the same node.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
