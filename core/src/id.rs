//! Identity types for OSP entities.
//!
//! Node and edge identifiers address slots in the graph arena. Each id carries
//! the generation of its slot, so an id that outlives its entity never
//! resolves to whatever later reuses the slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Create a new NodeId from a slot index and generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}", self.index, self.generation)
    }
}

/// Unique identifier for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId {
    index: u32,
    generation: u32,
}

impl EdgeId {
    /// Create a new EdgeId from a slot index and generation.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}v{}", self.index, self.generation)
    }
}

/// A place a walker can stand on: a node or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Node(NodeId),
    Edge(EdgeId),
}

impl Location {
    /// Returns true if this is a node location.
    pub fn is_node(&self) -> bool {
        matches!(self, Location::Node(_))
    }

    /// Returns true if this is an edge location.
    pub fn is_edge(&self) -> bool {
        matches!(self, Location::Edge(_))
    }

    /// Get as a NodeId if this is a node location.
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Location::Node(id) => Some(*id),
            Location::Edge(_) => None,
        }
    }

    /// Get as an EdgeId if this is an edge location.
    pub fn as_edge(&self) -> Option<EdgeId> {
        match self {
            Location::Node(_) => None,
            Location::Edge(id) => Some(*id),
        }
    }
}

impl From<NodeId> for Location {
    fn from(id: NodeId) -> Self {
        Location::Node(id)
    }
}

impl From<EdgeId> for Location {
    fn from(id: EdgeId) -> Self {
        Location::Edge(id)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Node(id) => write!(f, "{}", id),
            Location::Edge(id) => write!(f, "{}", id),
        }
    }
}

/// Identifier for a node type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The type of the distinguished root node. Always registered first.
    pub const ROOT: TypeId = TypeId(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Identifier for an edge type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeTypeId(pub u32);

impl EdgeTypeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "et{}", self.0)
    }
}

/// Identifier for a walker type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WalkerTypeId(pub u32);

impl WalkerTypeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WalkerTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wt{}", self.0)
    }
}

/// Any registered type: the closed set of keys abilities dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Node(TypeId),
    Edge(EdgeTypeId),
    Walker(WalkerTypeId),
}

impl Archetype {
    /// Short kind label, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Archetype::Node(_) => "node",
            Archetype::Edge(_) => "edge",
            Archetype::Walker(_) => "walker",
        }
    }
}

impl From<TypeId> for Archetype {
    fn from(id: TypeId) -> Self {
        Archetype::Node(id)
    }
}

impl From<EdgeTypeId> for Archetype {
    fn from(id: EdgeTypeId) -> Self {
        Archetype::Edge(id)
    }
}

impl From<WalkerTypeId> for Archetype {
    fn from(id: WalkerTypeId) -> Self {
        Archetype::Walker(id)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::Node(id) => write!(f, "{}", id),
            Archetype::Edge(id) => write!(f, "{}", id),
            Archetype::Walker(id) => write!(f, "{}", id),
        }
    }
}
