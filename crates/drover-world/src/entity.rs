//! Entity handles and their allocation.
//!
//! Every unit, item and building in a [`World`](crate::world::World) is named
//! by an [`EntityId`]. Tasks refer to their targets by id rather than by
//! reference, so a task queued against an item that has since been removed
//! holds a dead handle instead of a dangling pointer. A slot's generation is
//! bumped when its entity is removed, so a dead handle never resolves to a
//! newer entity sharing its slot.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Names one entity for as long as it lives in the world.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    slot: u32,
    generation: u32,
}

impl EntityId {
    pub fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Position in the allocator's slot table.
    pub fn slot(self) -> u32 {
        self.slot
    }

    /// How many entities held this slot before this one.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.slot, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Occupied { generation: u32 },
    Vacant { next_generation: u32 },
}

/// Slot table behind the world's ids. Vacated slots are refilled oldest first.
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    slots: Vec<Slot>,
    vacant: VecDeque<u32>,
}

impl EntityAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        if let Some(slot) = self.vacant.pop_front() {
            let cell = &mut self.slots[slot as usize];
            let generation = match *cell {
                Slot::Vacant { next_generation } => next_generation,
                Slot::Occupied { generation } => generation.wrapping_add(1),
            };
            *cell = Slot::Occupied { generation };
            return EntityId::new(slot, generation);
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot::Occupied { generation: 0 });
        EntityId::new(slot, 0)
    }

    /// Vacate the slot of `id`. Returns `false` if `id` is not live.
    pub(crate) fn release(&mut self, id: EntityId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.slots[id.slot as usize] = Slot::Vacant {
            next_generation: id.generation.wrapping_add(1),
        };
        self.vacant.push_back(id.slot);
        true
    }

    pub(crate) fn is_live(&self, id: EntityId) -> bool {
        matches!(
            self.slots.get(id.slot as usize),
            Some(Slot::Occupied { generation }) if *generation == id.generation
        )
    }
}
