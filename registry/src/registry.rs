//! The Registry - immutable schema and ability lookup.

use crate::error::{RegistryError, RegistryResult};
use crate::{Ability, AbilityId, ArchetypeDef, Trigger};
use osp_core::{Archetype, Attributes, EdgeTypeId, TypeId, Value, WalkerTypeId};
use std::collections::HashMap;

/// The Registry provides runtime lookup of archetypes and abilities.
/// It is immutable after construction.
pub struct Registry<B> {
    /// Archetype definitions by id.
    archetypes: HashMap<Archetype, ArchetypeDef>,
    /// Archetype lookup by name.
    names: HashMap<String, Archetype>,

    /// Ability definitions in registration order.
    abilities: Vec<Ability<B>>,
    /// Abilities indexed by (owner, trigger), in registration order.
    dispatch: HashMap<(Archetype, Trigger), Vec<usize>>,
}

impl<B> Registry<B> {
    pub(crate) fn new(
        archetypes: HashMap<Archetype, ArchetypeDef>,
        names: HashMap<String, Archetype>,
        abilities: Vec<Ability<B>>,
        dispatch: HashMap<(Archetype, Trigger), Vec<usize>>,
    ) -> Self {
        Self {
            archetypes,
            names,
            abilities,
            dispatch,
        }
    }

    // ==================== Type Lookups ====================

    /// Get an archetype by name.
    pub fn archetype(&self, name: &str) -> Option<Archetype> {
        self.names.get(name).copied()
    }

    /// Get an archetype definition.
    pub fn archetype_def(&self, archetype: Archetype) -> Option<&ArchetypeDef> {
        self.archetypes.get(&archetype)
    }

    /// Name of an archetype.
    pub fn name_of(&self, archetype: Archetype) -> Option<&str> {
        self.archetypes.get(&archetype).map(|def| def.name.as_str())
    }

    /// Get a node type id by name.
    pub fn node_type_id(&self, name: &str) -> Option<TypeId> {
        match self.archetype(name)? {
            Archetype::Node(id) => Some(id),
            _ => None,
        }
    }

    /// Get an edge type id by name.
    pub fn edge_type_id(&self, name: &str) -> Option<EdgeTypeId> {
        match self.archetype(name)? {
            Archetype::Edge(id) => Some(id),
            _ => None,
        }
    }

    /// Get a walker type id by name.
    pub fn walker_type_id(&self, name: &str) -> Option<WalkerTypeId> {
        match self.archetype(name)? {
            Archetype::Walker(id) => Some(id),
            _ => None,
        }
    }

    /// Get the number of archetypes, root included.
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    fn display_name(&self, archetype: Archetype) -> String {
        self.name_of(archetype)
            .map(str::to_string)
            .unwrap_or_else(|| archetype.to_string())
    }

    // ==================== Ability Lookups ====================

    /// Abilities of `owner` for `trigger` that fire against `counterpart`:
    /// unguarded ones and those guarded by exactly `counterpart`, in
    /// registration order.
    pub fn lookup(
        &self,
        owner: Archetype,
        trigger: Trigger,
        counterpart: Archetype,
    ) -> Vec<&Ability<B>> {
        self.dispatch
            .get(&(owner, trigger))
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &self.abilities[i])
                    .filter(|ability| ability.applies_to(counterpart))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get an ability by id.
    pub fn ability(&self, id: AbilityId) -> Option<&Ability<B>> {
        self.abilities.get(id.raw() as usize)
    }

    /// Find an ability of `owner` by name, first registered wins.
    pub fn ability_by_name(&self, owner: Archetype, name: &str) -> RegistryResult<&Ability<B>> {
        self.abilities
            .iter()
            .find(|ability| ability.owner == owner && ability.name == name)
            .ok_or_else(|| RegistryError::unknown_ability(self.display_name(owner), name))
    }

    /// Check that `ability` may run against `counterpart`.
    ///
    /// Normal dispatch never calls a mismatched body; this guards callers that
    /// invoke an ability directly.
    pub fn check_guard(&self, ability: &Ability<B>, counterpart: Archetype) -> RegistryResult<()> {
        match ability.guard {
            Some(guard) if guard != counterpart => Err(RegistryError::type_mismatch(
                format!("guard of ability '{}'", ability.name),
                self.display_name(guard),
                self.display_name(counterpart),
            )),
            _ => Ok(()),
        }
    }

    /// Get all abilities in registration order.
    pub fn abilities(&self) -> impl Iterator<Item = &Ability<B>> {
        self.abilities.iter()
    }

    // ==================== Attribute Validation ====================

    /// Validate a full attribute bag for a new entity, filling in defaults.
    pub fn validate_attrs(&self, archetype: Archetype, attrs: &mut Attributes) -> RegistryResult<()> {
        let def = self
            .archetypes
            .get(&archetype)
            .ok_or_else(|| RegistryError::unknown_type(archetype.to_string()))?;

        for (name, value) in attrs.iter() {
            check_value(def, name, value)?;
        }

        for attr in def.attributes.values() {
            if !attrs.contains_key(&attr.name) {
                if let Some(default) = &attr.default {
                    attrs.insert(attr.name.clone(), default.clone());
                }
            }
            let present = attrs.get(&attr.name).map_or(false, |v| !v.is_null());
            if attr.required && !present {
                return Err(RegistryError::missing_required(&def.name, &attr.name));
            }
        }
        Ok(())
    }

    /// Validate a single attribute assignment on an existing entity.
    pub fn validate_attr(&self, archetype: Archetype, name: &str, value: &Value) -> RegistryResult<()> {
        let def = self
            .archetypes
            .get(&archetype)
            .ok_or_else(|| RegistryError::unknown_type(archetype.to_string()))?;
        check_value(def, name, value)?;
        if value.is_null() && def.get_attr(name).map_or(false, |attr| attr.required) {
            return Err(RegistryError::missing_required(&def.name, name));
        }
        Ok(())
    }
}

fn check_value(def: &ArchetypeDef, name: &str, value: &Value) -> RegistryResult<()> {
    let attr = def
        .get_attr(name)
        .ok_or_else(|| RegistryError::unknown_attribute(&def.name, name))?;
    if !attr.accepts(value.type_name()) {
        return Err(RegistryError::type_mismatch(
            format!("{}.{}", def.name, name),
            &attr.type_name,
            value.type_name(),
        ));
    }
    Ok(())
}

impl<B> std::fmt::Debug for Registry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("archetypes", &self.archetypes.len())
            .field("abilities", &self.abilities)
            .finish()
    }
}
