//! The view an ability body gets of its run.

use crate::error::AbilityResult;
use crate::reporter::Reporter;
use crate::walker::Walker;
use crate::AbilityRegistry;
use osp_core::{
    Archetype, Attributes, EdgeId, EdgeTypeId, GraphError, Location, NodeId, TypeId, Value,
};
use osp_graph::{Direction, EdgeFilter, Graph};
use osp_registry::RegistryError;

/// Control signals raised by bodies, checked by the scheduler after each one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Flow {
    pub skip: bool,
    pub disengage: bool,
}

impl Flow {
    pub fn interrupted(&self) -> bool {
        self.skip || self.disengage
    }
}

/// Everything an ability body may touch while it runs: the graph, the
/// walker's state and queue, the report buffer and the current location.
pub struct AbilityContext<'a> {
    graph: &'a mut Graph,
    registry: &'a AbilityRegistry,
    walker: &'a mut Walker,
    reporter: &'a mut Reporter,
    here: Location,
    here_type: Archetype,
    flow: &'a mut Flow,
}

impl<'a> AbilityContext<'a> {
    pub(crate) fn new(
        graph: &'a mut Graph,
        registry: &'a AbilityRegistry,
        walker: &'a mut Walker,
        reporter: &'a mut Reporter,
        here: Location,
        here_type: Archetype,
        flow: &'a mut Flow,
    ) -> Self {
        Self {
            graph,
            registry,
            walker,
            reporter,
            here,
            here_type,
            flow,
        }
    }

    // ==================== Location ====================

    /// Where the walker currently stands.
    pub fn here(&self) -> Location {
        self.here
    }

    /// The current node, if the walker stands on a node.
    pub fn here_node(&self) -> Option<NodeId> {
        self.here.as_node()
    }

    /// Archetype of the current location.
    pub fn here_type(&self) -> Archetype {
        self.here_type
    }

    /// Registered name of the current location's type.
    pub fn here_type_name(&self) -> &'a str {
        self.registry.name_of(self.here_type).unwrap_or("?")
    }

    /// Read an attribute of the current node or edge.
    pub fn here_attr(&self, name: &str) -> Option<&Value> {
        match self.here {
            Location::Node(id) => self.graph.get_node(id)?.get_attr(name),
            Location::Edge(id) => self.graph.get_edge(id)?.get_attr(name),
        }
    }

    /// Assign an attribute of the current node or edge.
    pub fn set_here_attr(&mut self, name: &str, value: impl Into<Value>) -> AbilityResult {
        let value = value.into();
        self.registry.validate_attr(self.here_type, name, &value)?;
        match self.here {
            Location::Node(id) => self.graph.set_node_attr(id, name, value)?,
            Location::Edge(id) => self.graph.set_edge_attr(id, name, value)?,
        };
        Ok(())
    }

    // ==================== Walker state ====================

    pub fn walker_type(&self) -> Archetype {
        self.walker.archetype()
    }

    pub fn walker_attr(&self, name: &str) -> Option<&Value> {
        self.walker.get_attr(name)
    }

    pub fn walker_attrs(&self) -> &Attributes {
        self.walker.attributes()
    }

    /// Assign a walker attribute. The value is checked against the walker's schema.
    pub fn set_walker_attr(&mut self, name: &str, value: impl Into<Value>) -> AbilityResult {
        let value = value.into();
        self.registry
            .validate_attr(self.walker.archetype(), name, &value)?;
        self.walker.set_attr(name, value);
        Ok(())
    }

    /// Number of locations still queued behind the current one.
    pub fn queue_len(&self) -> usize {
        self.walker.queue_len()
    }

    // ==================== Graph ====================

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Unchecked access to the store. Prefer the schema-validated helpers.
    pub fn graph_mut(&mut self) -> &mut Graph {
        self.graph
    }

    pub fn registry(&self) -> &'a AbilityRegistry {
        self.registry
    }

    /// Resolve a node type name.
    pub fn node_type(&self, name: &str) -> AbilityResult<TypeId> {
        self.registry
            .node_type_id(name)
            .ok_or_else(|| RegistryError::unknown_type(name).into())
    }

    /// Resolve an edge type name.
    pub fn edge_type(&self, name: &str) -> AbilityResult<EdgeTypeId> {
        self.registry
            .edge_type_id(name)
            .ok_or_else(|| RegistryError::unknown_type(name).into())
    }

    /// Create a node of the named type after validating its attributes.
    pub fn spawn_node(&mut self, type_name: &str, mut attrs: Attributes) -> AbilityResult<NodeId> {
        let type_id = self.node_type(type_name)?;
        self.registry
            .validate_attrs(Archetype::Node(type_id), &mut attrs)?;
        Ok(self.graph.create_node(type_id, attrs))
    }

    /// Connect two nodes with an edge of the named type.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        mut attrs: Attributes,
    ) -> AbilityResult<EdgeId> {
        let type_id = self.edge_type(edge_type)?;
        self.registry
            .validate_attrs(Archetype::Edge(type_id), &mut attrs)?;
        Ok(self.graph.connect(source, target, type_id, attrs)?)
    }

    /// Delete a node and its incident edges.
    pub fn delete_node(&mut self, id: NodeId) -> AbilityResult {
        Ok(self.graph.delete_node(id)?)
    }

    /// Apply a selector to the current node now, returning `(edge, node)` ids.
    pub fn neighbors(
        &self,
        direction: Direction,
        filter: &EdgeFilter,
    ) -> AbilityResult<Vec<(EdgeId, NodeId)>> {
        let node = self.require_node()?;
        let neighbors = self.graph.neighbors(node, direction, filter)?;
        Ok(neighbors
            .iter()
            .map(|n| (n.edge_id(), n.node_id()))
            .collect())
    }

    fn require_node(&self) -> AbilityResult<NodeId> {
        self.here.as_node().ok_or_else(|| {
            GraphError::type_mismatch("node location", self.here_type_name()).into()
        })
    }

    // ==================== Traversal control ====================

    /// Append a location to the tail of the walker's queue.
    ///
    /// Visiting an edge queues the edge and then its target node.
    pub fn visit(&mut self, location: impl Into<Location>) -> AbilityResult {
        match location.into() {
            Location::Node(id) => {
                if !self.graph.contains_node(id) {
                    return Err(GraphError::invalid_node(id).into());
                }
                self.walker.enqueue(Location::Node(id));
            }
            Location::Edge(id) => {
                let target = self.graph.edge(id)?.target;
                self.walker.enqueue(Location::Edge(id));
                self.walker.enqueue(Location::Node(target));
            }
        }
        Ok(())
    }

    /// Append several locations, in order.
    pub fn visit_all<I, L>(&mut self, locations: I) -> AbilityResult
    where
        I: IntoIterator<Item = L>,
        L: Into<Location>,
    {
        for location in locations {
            self.visit(location)?;
        }
        Ok(())
    }

    /// Select neighbors of the current node and visit each of them.
    /// Returns how many nodes were queued.
    pub fn visit_selected(&mut self, direction: Direction, filter: &EdgeFilter) -> AbilityResult<usize> {
        let selected = self.neighbors(direction, filter)?;
        let count = selected.len();
        self.visit_all(selected.into_iter().map(|(_, node)| node))?;
        Ok(count)
    }

    /// Abort the remaining abilities at the current location. The queue is
    /// left alone.
    pub fn skip(&mut self) {
        self.flow.skip = true;
    }

    /// Stop the run once this body returns, dropping everything still queued.
    pub fn disengage(&mut self) {
        self.flow.disengage = true;
    }

    /// Append a value to the run's report.
    pub fn report(&mut self, value: impl Into<Value>) {
        self.reporter.emit(value);
    }

    /// Values reported so far in this run.
    pub fn reports(&self) -> &[Value] {
        self.reporter.values()
    }

    // ==================== Direct invocation ====================

    /// Call one of the walker's abilities by name against the current
    /// location, outside normal dispatch.
    ///
    /// Fails with a type mismatch if the ability is guarded by a different
    /// location type.
    pub fn invoke(&mut self, name: &str) -> AbilityResult {
        let registry = self.registry;
        let ability = registry.ability_by_name(self.walker.archetype(), name)?;
        registry.check_guard(ability, self.here_type)?;
        let body = ability.body.clone();
        body(self)
    }
}
