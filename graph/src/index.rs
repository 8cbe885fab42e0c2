//! Slot arena and secondary indexes for the graph store.

use osp_core::{NodeId, TypeId};
use std::collections::{BTreeSet, HashMap};

/// One arena slot. The generation increments every time the slot is freed.
#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational arena addressed by `(index, generation)` pairs.
///
/// A lookup succeeds only when the slot is occupied and its generation matches,
/// so ids issued before a slot was freed never resolve again.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a slot; `make` receives the index and generation of the new id.
    pub fn insert_with(&mut self, make: impl FnOnce(u32, u32) -> T) -> (u32, u32) {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.value = Some(make(index, slot.generation));
        self.len += 1;
        (index, slot.generation)
    }

    pub fn contains(&self, index: u32, generation: u32) -> bool {
        self.get(index, generation).is_some()
    }

    pub fn get(&self, index: u32, generation: u32) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Occupied values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }

    /// Current generation of every slot, occupied or not.
    pub fn generations(&self) -> Vec<u32> {
        self.slots.iter().map(|slot| slot.generation).collect()
    }

    /// Rebuild an arena from slot generations and occupied
    /// `(index, generation, value)` entries.
    ///
    /// Fails with the offending `(index, generation)` if an entry names an
    /// index outside `generations`, disagrees with its slot's generation, or
    /// lands on a slot that is already occupied.
    pub fn from_parts(
        generations: Vec<u32>,
        values: impl IntoIterator<Item = (u32, u32, T)>,
    ) -> Result<Self, (u32, u32)> {
        let mut slots: Vec<Slot<T>> = generations
            .into_iter()
            .map(|generation| Slot {
                generation,
                value: None,
            })
            .collect();
        let mut len = 0;
        for (index, generation, value) in values {
            match slots.get_mut(index as usize) {
                Some(slot) if slot.generation == generation && slot.value.is_none() => {
                    slot.value = Some(value);
                    len += 1;
                }
                _ => return Err((index, generation)),
            }
        }
        // Reverse so the lowest free index is handed out first.
        let free = (0..slots.len() as u32)
            .rev()
            .filter(|&i| slots[i as usize].value.is_none())
            .collect();
        Ok(Self { slots, free, len })
    }
}

/// Type index: TypeId -> ordered set of NodeIds
#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    index: HashMap<TypeId, BTreeSet<NodeId>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_id: TypeId, node_id: NodeId) {
        self.index.entry(type_id).or_default().insert(node_id);
    }

    pub fn remove(&mut self, type_id: TypeId, node_id: NodeId) {
        if let Some(set) = self.index.get_mut(&type_id) {
            set.remove(&node_id);
            if set.is_empty() {
                self.index.remove(&type_id);
            }
        }
    }

    pub fn get(&self, type_id: TypeId) -> impl Iterator<Item = NodeId> + '_ {
        self.index
            .get(&type_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
