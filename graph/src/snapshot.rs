//! Stable, id-keyed record schema for persisting a graph.

use crate::graph::Graph;
use crate::index::{Arena, TypeIndex};
use osp_core::{
    Attributes, Edge, EdgeId, EdgeTypeId, GraphError, GraphResult, Node, NodeId, TypeId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persisted form of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub type_id: TypeId,
    pub attributes: Attributes,
    pub outgoing: Vec<EdgeId>,
    pub incoming: Vec<EdgeId>,
}

/// Persisted form of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub type_id: EdgeTypeId,
    pub source: NodeId,
    pub target: NodeId,
    pub seq: u64,
    pub attributes: Attributes,
}

/// Whole-graph snapshot.
///
/// Slot generations are kept so that ids which were dead when the snapshot
/// was taken stay dead after it is restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub root: NodeId,
    pub tracked_roots: Vec<NodeId>,
    pub next_seq: u64,
    pub node_generations: Vec<u32>,
    pub edge_generations: Vec<u32>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}

impl Graph {
    /// Capture the graph as id-keyed records.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            root: self.root,
            tracked_roots: self.tracked_roots.iter().copied().collect(),
            next_seq: self.next_seq,
            node_generations: self.nodes.generations(),
            edge_generations: self.edges.generations(),
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeRecord {
                    id: node.id,
                    type_id: node.type_id,
                    attributes: node.attributes.clone(),
                    outgoing: node.outgoing.clone(),
                    incoming: node.incoming.clone(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|edge| EdgeRecord {
                    id: edge.id,
                    type_id: edge.type_id,
                    source: edge.source,
                    target: edge.target,
                    seq: edge.seq,
                    attributes: edge.attributes.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a graph from a snapshot, checking that every reference in it
    /// resolves.
    pub fn restore(snapshot: GraphSnapshot) -> GraphResult<Graph> {
        let GraphSnapshot {
            root,
            tracked_roots,
            next_seq,
            node_generations,
            edge_generations,
            nodes,
            edges,
        } = snapshot;

        let mut type_index = TypeIndex::new();
        let node_values = nodes.into_iter().map(|record| {
            type_index.insert(record.type_id, record.id);
            let mut node = Node::new(record.id, record.type_id, record.attributes);
            node.outgoing = record.outgoing;
            node.incoming = record.incoming;
            (record.id.index(), record.id.generation(), node)
        });
        let node_arena = Arena::from_parts(node_generations, node_values.collect::<Vec<_>>())
            .map_err(|(index, generation)| GraphError::invalid_node(NodeId::new(index, generation)))?;

        let edge_values = edges.into_iter().map(|record| {
            let edge = Edge::new(
                record.id,
                record.type_id,
                record.source,
                record.target,
                record.seq,
                record.attributes,
            );
            (record.id.index(), record.id.generation(), edge)
        });
        let edge_arena = Arena::from_parts(edge_generations, edge_values)
            .map_err(|(index, generation)| GraphError::invalid_edge(EdgeId::new(index, generation)))?;

        let graph = Graph {
            nodes: node_arena,
            edges: edge_arena,
            root,
            tracked_roots: tracked_roots.into_iter().collect::<BTreeSet<_>>(),
            next_seq,
            type_index,
        };
        graph.check_integrity()?;
        Ok(graph)
    }

    /// Verify ids, endpoints and adjacency agree with each other.
    fn check_integrity(&self) -> GraphResult<()> {
        let root = self.node(self.root)?;
        if root.type_id != TypeId::ROOT {
            return Err(GraphError::type_mismatch(
                TypeId::ROOT.to_string(),
                root.type_id.to_string(),
            ));
        }
        for id in &self.tracked_roots {
            self.node(*id)?;
        }
        for node in self.nodes.iter() {
            for edge_id in &node.outgoing {
                let edge = self.edge(*edge_id)?;
                if edge.source != node.id {
                    return Err(GraphError::invalid_edge(*edge_id));
                }
            }
            for edge_id in &node.incoming {
                let edge = self.edge(*edge_id)?;
                if edge.target != node.id {
                    return Err(GraphError::invalid_edge(*edge_id));
                }
            }
        }
        for edge in self.edges.iter() {
            let source = self.node(edge.source)?;
            let target = self.node(edge.target)?;
            if !source.outgoing.contains(&edge.id) || !target.incoming.contains(&edge.id) {
                return Err(GraphError::invalid_edge(edge.id));
            }
        }
        Ok(())
    }
}
