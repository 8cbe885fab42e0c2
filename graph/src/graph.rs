//! Core graph storage implementation.

use crate::filter::{Direction, EdgeFilter};
use crate::index::{Arena, TypeIndex};
use osp_core::{
    attrs, Attributes, Edge, EdgeId, EdgeTypeId, GraphError, GraphResult, Node, NodeId, TypeId,
    Value,
};
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::{debug, warn};

/// One result of a neighbor query: the connecting edge and the node on its far
/// side.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'g> {
    pub edge: &'g Edge,
    pub node: &'g Node,
}

impl Neighbor<'_> {
    pub fn edge_id(&self) -> EdgeId {
        self.edge.id
    }

    pub fn node_id(&self) -> NodeId {
        self.node.id
    }
}

/// Counts from a reachability sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub nodes_removed: usize,
    pub edges_removed: usize,
}

/// The in-memory graph store.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Node storage
    pub(crate) nodes: Arena<Node>,
    /// Edge storage
    pub(crate) edges: Arena<Edge>,
    /// The distinguished root node
    pub(crate) root: NodeId,
    /// Extra anchors kept alive by sweeps
    pub(crate) tracked_roots: BTreeSet<NodeId>,
    /// Next edge creation sequence number
    pub(crate) next_seq: u64,
    /// Type index
    pub(crate) type_index: TypeIndex,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create a graph holding only the root node.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let (index, generation) = nodes.insert_with(|index, generation| {
            Node::new(NodeId::new(index, generation), TypeId::ROOT, attrs!())
        });
        let root = NodeId::new(index, generation);
        let mut type_index = TypeIndex::new();
        type_index.insert(TypeId::ROOT, root);

        Self {
            nodes,
            edges: Arena::new(),
            root,
            tracked_roots: BTreeSet::new(),
            next_seq: 0,
            type_index,
        }
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    // ==================== Node Operations ====================

    /// Create a new node with the given type and attributes.
    pub fn create_node(&mut self, type_id: TypeId, attributes: Attributes) -> NodeId {
        let (index, generation) = self.nodes.insert_with(|index, generation| {
            Node::new(NodeId::new(index, generation), type_id, attributes)
        });
        let id = NodeId::new(index, generation);
        self.type_index.insert(type_id, id);
        id
    }

    /// Get a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index(), id.generation())
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index(), id.generation())
    }

    /// Get a node or fail with `InvalidReference`.
    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.get_node(id).ok_or(GraphError::invalid_node(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(id.index(), id.generation())
    }

    /// Delete a node and every edge touching it.
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<()> {
        if id == self.root {
            return Err(GraphError::RootProtected(id));
        }
        let node = self.get_node(id).ok_or(GraphError::node_not_found(id))?;

        // A self-loop sits in both lists.
        let mut incident: Vec<EdgeId> = node.outgoing.clone();
        for edge_id in &node.incoming {
            if !incident.contains(edge_id) {
                incident.push(*edge_id);
            }
        }

        for edge_id in incident {
            self.delete_edge(edge_id)?;
        }

        if let Some(node) = self.nodes.remove(id.index(), id.generation()) {
            self.type_index.remove(node.type_id, id);
        }
        self.tracked_roots.remove(&id);

        Ok(())
    }

    /// Set an attribute on a node, returning the previous value.
    pub fn set_node_attr(
        &mut self,
        id: NodeId,
        attr_name: &str,
        value: Value,
    ) -> GraphResult<Option<Value>> {
        let node = self.get_node_mut(id).ok_or(GraphError::invalid_node(id))?;
        Ok(node.set_attr(attr_name, value))
    }

    // ==================== Edge Operations ====================

    /// Connect `source` to `target` with a new edge.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        type_id: EdgeTypeId,
        attributes: Attributes,
    ) -> GraphResult<EdgeId> {
        if !self.contains_node(source) {
            return Err(GraphError::invalid_node(source));
        }
        if !self.contains_node(target) {
            return Err(GraphError::invalid_node(target));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let (index, generation) = self.edges.insert_with(|index, generation| {
            Edge::new(
                EdgeId::new(index, generation),
                type_id,
                source,
                target,
                seq,
                attributes,
            )
        });
        let id = EdgeId::new(index, generation);

        if let Some(node) = self.get_node_mut(source) {
            node.outgoing.push(id);
        }
        if let Some(node) = self.get_node_mut(target) {
            node.incoming.push(id);
        }

        Ok(id)
    }

    /// Get an edge by ID.
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index(), id.generation())
    }

    /// Get a mutable reference to an edge by ID.
    pub fn get_edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.index(), id.generation())
    }

    /// Get an edge or fail with `InvalidReference`.
    pub fn edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.get_edge(id).ok_or(GraphError::invalid_edge(id))
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains(id.index(), id.generation())
    }

    /// Delete an edge and unlink it from both endpoints.
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self
            .edges
            .remove(id.index(), id.generation())
            .ok_or(GraphError::edge_not_found(id))?;

        if let Some(node) = self.get_node_mut(edge.source) {
            node.outgoing.retain(|e| *e != id);
        }
        if let Some(node) = self.get_node_mut(edge.target) {
            node.incoming.retain(|e| *e != id);
        }

        Ok(())
    }

    /// Set an attribute on an edge, returning the previous value.
    pub fn set_edge_attr(
        &mut self,
        id: EdgeId,
        attr_name: &str,
        value: Value,
    ) -> GraphResult<Option<Value>> {
        let edge = self.get_edge_mut(id).ok_or(GraphError::invalid_edge(id))?;
        Ok(edge.set_attr(attr_name, value))
    }

    // ==================== Query Operations ====================

    /// Adjacent `(edge, node)` pairs of `node` that pass `filter`, in edge
    /// insertion order.
    pub fn neighbors(
        &self,
        node: NodeId,
        direction: Direction,
        filter: &EdgeFilter,
    ) -> GraphResult<Vec<Neighbor<'_>>> {
        let origin = self.node(node)?;

        let edges: Vec<&Edge> = match direction {
            Direction::Out => self.resolve_edges(&origin.outgoing),
            Direction::In => self.resolve_edges(&origin.incoming),
            Direction::Any => {
                let mut merged = self.resolve_edges(&origin.outgoing);
                merged.extend(
                    self.resolve_edges(&origin.incoming)
                        .into_iter()
                        .filter(|edge| !edge.is_self_loop()),
                );
                merged.sort_by_key(|edge| edge.seq);
                merged
            }
        };

        let mut result = Vec::with_capacity(edges.len());
        for edge in edges {
            let far = match direction {
                Direction::Out => edge.target,
                Direction::In => edge.source,
                Direction::Any => edge.opposite(node).unwrap_or(edge.target),
            };
            let far_node = match self.get_node(far) {
                Some(n) => n,
                None => continue,
            };
            if filter.matches(edge, far_node) {
                result.push(Neighbor {
                    edge,
                    node: far_node,
                });
            }
        }
        Ok(result)
    }

    fn resolve_edges(&self, ids: &[EdgeId]) -> Vec<&Edge> {
        ids.iter().filter_map(|id| self.get_edge(*id)).collect()
    }

    /// Find nodes by type, in id order.
    pub fn nodes_by_type(&self, type_id: TypeId) -> impl Iterator<Item = NodeId> + '_ {
        self.type_index.get(type_id)
    }

    // ==================== Reachability ====================

    /// Keep `id` (and everything reachable from it) alive across sweeps.
    pub fn track_root(&mut self, id: NodeId) -> GraphResult<()> {
        if !self.contains_node(id) {
            return Err(GraphError::invalid_node(id));
        }
        self.tracked_roots.insert(id);
        Ok(())
    }

    /// Stop tracking `id`. Returns whether it was tracked.
    pub fn untrack_root(&mut self, id: NodeId) -> bool {
        self.tracked_roots.remove(&id)
    }

    /// Tracked roots, excluding the root node itself.
    pub fn tracked_roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tracked_roots.iter().copied()
    }

    /// Delete every node not reachable along outgoing edges from the root or a
    /// tracked root.
    pub fn sweep_unreachable(&mut self) -> SweepStats {
        let mut reachable: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue.push_back(self.root);
        queue.extend(self.tracked_roots.iter().copied());

        while let Some(id) = queue.pop_front() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(node) = self.get_node(id) {
                for edge in self.resolve_edges(&node.outgoing) {
                    if !reachable.contains(&edge.target) {
                        queue.push_back(edge.target);
                    }
                }
            }
        }

        let doomed: Vec<NodeId> = self
            .nodes
            .iter()
            .map(|node| node.id)
            .filter(|id| !reachable.contains(id))
            .collect();

        let edges_before = self.edge_count();
        let mut stats = SweepStats::default();
        for id in doomed {
            if self.delete_node(id).is_ok() {
                stats.nodes_removed += 1;
            }
        }
        stats.edges_removed = edges_before - self.edge_count();

        if stats.nodes_removed > 0 {
            warn!(
                nodes = stats.nodes_removed,
                edges = stats.edges_removed,
                "swept unreachable entities"
            );
        } else {
            debug!("sweep found nothing unreachable");
        }
        stats
    }

    // ==================== Statistics ====================

    /// Get the number of nodes in the graph, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All nodes in slot order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// All edges in slot order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }
}
