//! RegistryBuilder for constructing an immutable Registry.

use crate::error::{RegistryError, RegistryResult};
use crate::{Ability, AbilityId, ArchetypeDef, AttrDef, Registry, Trigger};
use osp_core::{Archetype, EdgeTypeId, TypeId, WalkerTypeId};
use std::collections::{BTreeMap, HashMap};

/// Name of the pre-registered root node type.
pub const ROOT_TYPE_NAME: &str = "Root";

/// An ability whose owner and guard are still names.
struct PendingAbility<B> {
    name: String,
    owner_name: String,
    trigger: Trigger,
    guard_name: Option<String>,
    body: B,
}

/// Builder for constructing an immutable Registry.
pub struct RegistryBuilder<B> {
    /// Next node type ID to allocate. 0 is the root type.
    next_type_id: u32,
    /// Next edge type ID to allocate.
    next_edge_type_id: u32,
    /// Next walker type ID to allocate.
    next_walker_type_id: u32,

    /// Archetypes being built.
    archetypes: HashMap<Archetype, ArchetypeDef>,
    /// Name to archetype mapping, shared by all kinds.
    names: HashMap<String, Archetype>,

    /// Abilities in registration order.
    abilities: Vec<PendingAbility<B>>,
}

impl<B> Default for RegistryBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> RegistryBuilder<B> {
    /// Create a new builder with the root node type already registered.
    pub fn new() -> Self {
        let root = Archetype::Node(TypeId::ROOT);
        let mut archetypes = HashMap::new();
        archetypes.insert(root, ArchetypeDef::new(root, ROOT_TYPE_NAME));
        let mut names = HashMap::new();
        names.insert(ROOT_TYPE_NAME.to_string(), root);

        Self {
            next_type_id: TypeId::ROOT.raw() + 1,
            next_edge_type_id: 0,
            next_walker_type_id: 0,
            archetypes,
            names,
            abilities: Vec::new(),
        }
    }

    /// Add a node type definition.
    pub fn add_node_type(&mut self, name: impl Into<String>) -> ArchetypeBuilder<'_, B> {
        let archetype = Archetype::Node(TypeId::new(self.next_type_id));
        self.next_type_id += 1;
        ArchetypeBuilder::new(self, archetype, name.into())
    }

    /// Add an edge type definition.
    pub fn add_edge_type(&mut self, name: impl Into<String>) -> ArchetypeBuilder<'_, B> {
        let archetype = Archetype::Edge(EdgeTypeId::new(self.next_edge_type_id));
        self.next_edge_type_id += 1;
        ArchetypeBuilder::new(self, archetype, name.into())
    }

    /// Add a walker type definition.
    pub fn add_walker_type(&mut self, name: impl Into<String>) -> ArchetypeBuilder<'_, B> {
        let archetype = Archetype::Walker(WalkerTypeId::new(self.next_walker_type_id));
        self.next_walker_type_id += 1;
        ArchetypeBuilder::new(self, archetype, name.into())
    }

    /// Register an ability on the type named `owner`.
    ///
    /// Owner and guard names are resolved by [`RegistryBuilder::build`], so
    /// abilities may be declared before the types they mention.
    pub fn add_ability(
        &mut self,
        name: impl Into<String>,
        owner: impl Into<String>,
        trigger: Trigger,
    ) -> AbilityBuilder<'_, B> {
        AbilityBuilder {
            builder: self,
            name: name.into(),
            owner_name: owner.into(),
            trigger,
            guard_name: None,
            body: None,
        }
    }

    /// Build the immutable Registry and its dispatch table.
    pub fn build(self) -> RegistryResult<Registry<B>> {
        let mut abilities = Vec::with_capacity(self.abilities.len());
        let mut dispatch: HashMap<(Archetype, Trigger), Vec<usize>> = HashMap::new();

        for (i, pending) in self.abilities.into_iter().enumerate() {
            let owner = *self
                .names
                .get(&pending.owner_name)
                .ok_or_else(|| RegistryError::unknown_type(&pending.owner_name))?;
            let guard = match &pending.guard_name {
                Some(guard_name) => Some(
                    *self
                        .names
                        .get(guard_name)
                        .ok_or_else(|| RegistryError::unknown_type(guard_name))?,
                ),
                None => None,
            };

            dispatch
                .entry((owner, pending.trigger))
                .or_default()
                .push(i);
            abilities.push(Ability {
                id: AbilityId(i as u32),
                name: pending.name,
                owner,
                trigger: pending.trigger,
                guard,
                body: pending.body,
            });
        }

        Ok(Registry::new(self.archetypes, self.names, abilities, dispatch))
    }
}

/// Builder for a node, edge or walker type definition.
pub struct ArchetypeBuilder<'a, B> {
    builder: &'a mut RegistryBuilder<B>,
    archetype: Archetype,
    name: String,
    attributes: BTreeMap<String, AttrDef>,
}

impl<'a, B> ArchetypeBuilder<'a, B> {
    fn new(builder: &'a mut RegistryBuilder<B>, archetype: Archetype, name: String) -> Self {
        Self {
            builder,
            archetype,
            name,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute.
    pub fn attr(mut self, attr: AttrDef) -> Self {
        self.attributes.insert(attr.name.clone(), attr);
        self
    }

    /// Finish building this type.
    pub fn done(self) -> RegistryResult<Archetype> {
        if self.builder.names.contains_key(&self.name) {
            return Err(RegistryError::DuplicateTypeName(self.name));
        }

        for attr in self.attributes.values() {
            if let Some(default) = &attr.default {
                if !attr.accepts(default.type_name()) {
                    return Err(RegistryError::type_mismatch(
                        format!("default of {}.{}", self.name, attr.name),
                        &attr.type_name,
                        default.type_name(),
                    ));
                }
            }
        }

        let def = ArchetypeDef {
            archetype: self.archetype,
            name: self.name.clone(),
            attributes: self.attributes,
        };
        self.builder.names.insert(self.name, self.archetype);
        self.builder.archetypes.insert(self.archetype, def);

        Ok(self.archetype)
    }
}

/// Builder for an ability registration.
pub struct AbilityBuilder<'a, B> {
    builder: &'a mut RegistryBuilder<B>,
    name: String,
    owner_name: String,
    trigger: Trigger,
    guard_name: Option<String>,
    body: Option<B>,
}

impl<'a, B> AbilityBuilder<'a, B> {
    /// Only fire against the type named `counterpart`.
    pub fn guard(mut self, counterpart: impl Into<String>) -> Self {
        self.guard_name = Some(counterpart.into());
        self
    }

    /// Set the executable body.
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Finish this registration.
    pub fn done(self) -> RegistryResult<AbilityId> {
        let body = self
            .body
            .ok_or_else(|| RegistryError::MissingBody(self.name.clone()))?;
        let id = AbilityId(self.builder.abilities.len() as u32);
        self.builder.abilities.push(PendingAbility {
            name: self.name,
            owner_name: self.owner_name,
            trigger: self.trigger,
            guard_name: self.guard_name,
            body,
        });
        Ok(id)
    }
}
