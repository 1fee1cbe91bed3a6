//! The holder/held relation between units and items.
//!
//! A unit holds at most one item and an item has at most one owner. Both
//! directions are stored here and only ever changed together, so
//! `held_by(u) == Some(i)` exactly when `owner_of(i) == Some(u)`.

use std::collections::HashMap;

use crate::entity::EntityId;

/// Who holds what. Owned by the [`World`](crate::world::World).
#[derive(Debug, Default, Clone)]
pub struct Possession {
    /// unit -> item
    held: HashMap<EntityId, EntityId>,
    /// item -> unit
    owners: HashMap<EntityId, EntityId>,
}

impl Possession {
    /// An empty relation: nobody holds anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `item` to `unit`. Does nothing and returns `false` if the unit
    /// already holds something or the item is already taken.
    pub fn bind(&mut self, unit: EntityId, item: EntityId) -> bool {
        if self.held.contains_key(&unit) || self.owners.contains_key(&item) {
            return false;
        }
        self.held.insert(unit, item);
        self.owners.insert(item, unit);
        true
    }

    /// Free whatever `unit` holds. Returns the released item.
    pub fn release_unit(&mut self, unit: EntityId) -> Option<EntityId> {
        let item = self.held.remove(&unit)?;
        self.owners.remove(&item);
        Some(item)
    }

    /// Free `item` from its owner. Returns the former owner.
    pub fn release_item(&mut self, item: EntityId) -> Option<EntityId> {
        let unit = self.owners.remove(&item)?;
        self.held.remove(&unit);
        Some(unit)
    }

    pub fn held_by(&self, unit: EntityId) -> Option<EntityId> {
        self.held.get(&unit).copied()
    }

    pub fn owner_of(&self, item: EntityId) -> Option<EntityId> {
        self.owners.get(&item).copied()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// `(unit, item)` pairs in unspecified order.
    pub fn pairs(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.held.iter().map(|(&unit, &item)| (unit, item))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
