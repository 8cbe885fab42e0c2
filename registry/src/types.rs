//! Schema and ability definition types.

use osp_core::{Archetype, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute definition within an archetype.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrDef {
    /// Attribute name.
    pub name: String,
    /// Value type name (String, Int, Float, Bool, NodeRef, EdgeRef, List, Map, Any).
    pub type_name: String,
    /// Whether this attribute must be present and non-null.
    pub required: bool,
    /// Default value if not provided.
    pub default: Option<Value>,
}

impl AttrDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Check whether a value of type `actual` may be stored here.
    pub fn accepts(&self, actual: &str) -> bool {
        types_compatible(&self.type_name, actual)
    }
}

/// Check if a value type fits an attribute type.
pub fn types_compatible(expected: &str, actual: &str) -> bool {
    if expected == actual || expected == "Any" {
        return true;
    }
    // Null is compatible with anything; `required` is checked separately.
    if actual == "Null" {
        return true;
    }
    // Int can be used where Float is expected
    expected == "Float" && actual == "Int"
}

/// A registered node, edge or walker type.
#[derive(Debug, Clone)]
pub struct ArchetypeDef {
    /// Unique identifier, tagged with the kind.
    pub archetype: Archetype,
    /// Type name, unique across all kinds.
    pub name: String,
    /// Attribute definitions.
    pub attributes: BTreeMap<String, AttrDef>,
}

impl ArchetypeDef {
    pub fn new(archetype: Archetype, name: impl Into<String>) -> Self {
        Self {
            archetype,
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Get an attribute definition by name.
    pub fn get_attr(&self, name: &str) -> Option<&AttrDef> {
        self.attributes.get(name)
    }

    /// Check if this type declares an attribute.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// When an ability fires relative to a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// On arrival at a location.
    Entry,
    /// On departure from a location.
    Exit,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Entry => write!(f, "entry"),
            Trigger::Exit => write!(f, "exit"),
        }
    }
}

/// Identifier for a registered ability. Ids follow registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbilityId(pub u32);

impl AbilityId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ab{}", self.0)
    }
}

/// A registered ability: a body bound to an owner archetype and trigger,
/// optionally restricted to one counterpart archetype.
///
/// The body type is left to the executor; the registry only stores it.
pub struct Ability<B> {
    /// Unique identifier.
    pub id: AbilityId,
    /// Ability name, for diagnostics and direct invocation.
    pub name: String,
    /// The type the ability belongs to.
    pub owner: Archetype,
    /// Entry or exit.
    pub trigger: Trigger,
    /// Counterpart type the ability is restricted to, if any.
    pub guard: Option<Archetype>,
    /// Executable body.
    pub body: B,
}

impl<B> Ability<B> {
    /// Returns true if the ability fires against `counterpart`.
    pub fn applies_to(&self, counterpart: Archetype) -> bool {
        match self.guard {
            None => true,
            Some(guard) => guard == counterpart,
        }
    }
}

impl<B> fmt::Debug for Ability<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("trigger", &self.trigger)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
