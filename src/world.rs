//! Entity storage owned by the game loop
//!
//! Entities live in an arena keyed by stable ids. Removal only marks a slot
//! dead; dead slots are compacted by [`World::flush`] at the end of a pass, so
//! hooks may add and remove entities while the loop walks a snapshot of ids.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Stable handle to an entity; never reused within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    id: EntityId,
    alive: bool,
    entity: Entity,
}

/// Order-irrelevant entity collection with deferred removal
#[derive(Debug, Clone)]
pub struct World {
    /// Sorted by id, since ids are handed out in increasing order
    slots: Vec<Slot>,
    next_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 1,
        }
    }

    /// Add an entity; it joins iteration snapshots taken after this call
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            alive: true,
            entity,
        });
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.slots.binary_search_by_key(&id, |slot| slot.id).ok()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id)
            .map(|i| &self.slots[i])
            .filter(|slot| slot.alive)
            .map(|slot| &slot.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let i = self.index_of(id)?;
        let slot = &mut self.slots[i];
        if slot.alive { Some(&mut slot.entity) } else { None }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Mark an entity dead. Returns false if it was already gone.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.index_of(id) {
            Some(i) if self.slots[i].alive => {
                self.slots[i].alive = false;
                true
            }
            _ => false,
        }
    }

    /// Mark every entity dead
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.alive = false;
        }
    }

    /// Drop dead slots
    pub fn flush(&mut self) {
        self.slots.retain(|slot| slot.alive);
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the live entities at this moment
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .filter(|slot| slot.alive)
            .map(|slot| (slot.id, &slot.entity))
    }
}
