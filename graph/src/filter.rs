//! Edge selectors.
//!
//! An [`EdgeFilter`] is a predicate over an edge and the node on its far side.
//! Filters hold no cached results: each application reads the graph as it is
//! at that moment.

use osp_core::{Edge, EdgeTypeId, Node, TypeId, Value};
use std::cmp::Ordering;

/// Which adjacency list a neighbor query walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Edges whose source is the origin node.
    #[default]
    Out,
    /// Edges whose target is the origin node.
    In,
    /// Both, merged in edge creation order.
    Any,
}

/// Comparison applied to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Attribute is present and not null. The constraint value is ignored.
    Exists,
}

/// One attribute predicate on an edge or node.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrConstraint {
    pub attr: String,
    pub op: CompareOp,
    pub value: Value,
}

impl AttrConstraint {
    pub fn new(attr: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            attr: attr.into(),
            op,
            value: value.into(),
        }
    }

    /// A missing attribute fails every comparison.
    pub fn matches(&self, attributes: &osp_core::Attributes) -> bool {
        let actual = match attributes.get(&self.attr) {
            Some(actual) => actual,
            None => return false,
        };
        match self.op {
            CompareOp::Exists => !actual.is_null(),
            CompareOp::Eq => values_equal(actual, &self.value),
            CompareOp::Ne => !values_equal(actual, &self.value),
            CompareOp::Lt => actual.compare(&self.value) == Some(Ordering::Less),
            CompareOp::Le => matches!(
                actual.compare(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            CompareOp::Gt => actual.compare(&self.value) == Some(Ordering::Greater),
            CompareOp::Ge => matches!(
                actual.compare(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    a == b || a.compare(b) == Some(Ordering::Equal)
}

/// Selector over (edge type, counterpart node type, edge attributes,
/// counterpart node attributes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeFilter {
    edge_type: Option<EdgeTypeId>,
    node_type: Option<TypeId>,
    constraints: Vec<AttrConstraint>,
    node_constraints: Vec<AttrConstraint>,
}

impl EdgeFilter {
    /// A filter that accepts every edge.
    pub fn any() -> Self {
        Self::default()
    }

    /// Only edges of this type.
    pub fn edge_type(mut self, edge_type: EdgeTypeId) -> Self {
        self.edge_type = Some(edge_type);
        self
    }

    /// Only edges whose counterpart node has this type.
    pub fn node_type(mut self, node_type: TypeId) -> Self {
        self.node_type = Some(node_type);
        self
    }

    /// Add an attribute constraint on the edge.
    pub fn where_attr(mut self, attr: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        self.constraints.push(AttrConstraint::new(attr, op, value));
        self
    }

    /// Shorthand for an equality constraint.
    pub fn attr_eq(self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_attr(attr, CompareOp::Eq, value)
    }

    /// Add an attribute constraint on the counterpart node.
    pub fn where_node_attr(mut self, attr: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        self.node_constraints.push(AttrConstraint::new(attr, op, value));
        self
    }

    /// Shorthand for an equality constraint on the counterpart node.
    pub fn node_attr_eq(self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_node_attr(attr, CompareOp::Eq, value)
    }

    /// Returns true if the filter places no restriction.
    pub fn is_unrestricted(&self) -> bool {
        self.edge_type.is_none()
            && self.node_type.is_none()
            && self.constraints.is_empty()
            && self.node_constraints.is_empty()
    }

    /// Evaluate against an edge and the node on its far side.
    pub fn matches(&self, edge: &Edge, counterpart: &Node) -> bool {
        if let Some(edge_type) = self.edge_type {
            if edge.type_id != edge_type {
                return false;
            }
        }
        if let Some(node_type) = self.node_type {
            if counterpart.type_id != node_type {
                return false;
            }
        }
        self.constraints
            .iter()
            .all(|constraint| constraint.matches(&edge.attributes))
            && self
                .node_constraints
                .iter()
                .all(|constraint| constraint.matches(&counterpart.attributes))
    }
}
