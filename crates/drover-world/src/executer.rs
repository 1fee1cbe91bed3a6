//! The executing unit's view of the world during a task call.
//!
//! An [`Executer`] borrows the executing unit's body and motion mutably,
//! the item store mutably (for take/drop), and the rest of the world read-only.
//! The unit's own task queue is deliberately not reachable from here: a task
//! never sees the queue it sits in.

use std::collections::HashMap;

use tracing::debug;

use crate::entity::EntityId;
use crate::math::Vector2;
use crate::model::{Body, Building, Item, Motion};
use crate::possession::Possession;

/// Borrowed context a task runs against: the executing unit plus the parts of
/// the world a task may touch.
pub struct Executer<'a> {
    pub(crate) id: EntityId,
    pub(crate) body: &'a mut Body,
    pub(crate) motion: &'a mut Motion,
    pub(crate) items: &'a mut HashMap<EntityId, Item>,
    pub(crate) buildings: &'a HashMap<EntityId, Building>,
    pub(crate) possession: &'a mut Possession,
}

impl Executer<'_> {
    /// Id of the executing unit.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Vector2 {
        self.body.position
    }

    pub fn set_position(&mut self, position: Vector2) {
        self.body.position = position;
    }

    pub fn speed(&self) -> f32 {
        self.motion.speed()
    }

    /// Clamped to `[0, MAX_SPEED]`.
    pub fn set_speed(&mut self, speed: f32) {
        self.motion.set_speed(speed);
    }

    pub fn direction(&self) -> Vector2 {
        self.motion.direction()
    }

    /// Zero-length input keeps the current heading.
    pub fn set_direction(&mut self, towards: Vector2) {
        self.motion.set_direction(towards);
    }

    /// Position of a live item.
    pub fn item_position(&self, item: EntityId) -> Option<Vector2> {
        self.items
            .get(&item)
            .filter(|i| i.is_alive())
            .map(Item::position)
    }

    /// The live item this unit holds.
    pub fn held_item(&self) -> Option<EntityId> {
        self.possession
            .held_by(self.id)
            .filter(|&item| self.item_position(item).is_some())
    }

    /// True if `item` is alive and either free or already held by this unit.
    pub fn can_take(&self, item: EntityId) -> bool {
        self.item_position(item).is_some()
            && self
                .possession
                .owner_of(item)
                .map_or(true, |owner| owner == self.id)
    }

    pub fn building_exists(&self, building: EntityId) -> bool {
        self.buildings.get(&building).is_some_and(Building::is_alive)
    }

    /// Bind `item` to this unit. No-op returning `false` when the unit
    /// already carries something or the item is taken or gone.
    pub fn take_item(&mut self, item: EntityId) -> bool {
        if self.item_position(item).is_none() {
            return false;
        }
        let bound = self.possession.bind(self.id, item);
        if bound {
            debug!(unit = %self.id, item = %item, "item taken");
        }
        bound
    }

    /// Release the held item, which stops where it is.
    pub fn drop_item(&mut self) -> Option<EntityId> {
        let item = self.possession.release_unit(self.id)?;
        if let Some(dropped) = self.items.get_mut(&item) {
            dropped.motion.set_speed(0.0);
        }
        debug!(unit = %self.id, item = %item, "item dropped");
        Some(item)
    }
}
