//! The [`World`] is the authoritative registry of live entities.
//!
//! It owns every unit, item and building, the possession relation between
//! units and items, and the registry order. [`World::step`] advances every
//! entity once, in registry order, and removes the ones whose update reports
//! death.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::entity::{EntityAllocator, EntityId};
use crate::executer::Executer;
use crate::math::Vector2;
use crate::model::{
    Building, Entity, Item, Unit, CHASE_GAIN, CHASE_STANDOFF, MAX_HUNGER,
};
use crate::possession::Possession;
use crate::task::{Task, TaskStatus};
use crate::WorldError;

// ---------------------------------------------------------------------------
// StepReport
// ---------------------------------------------------------------------------

/// What happened during one [`World::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Entities removed this step, in the order they were visited.
    pub removed: Vec<EntityId>,
    /// Number of entities updated (including those then removed).
    pub updated: usize,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The entity registry: every live unit, item and building, their possession
/// relation and the simulation counters.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    /// Registry order: update order and draw order.
    order: Vec<EntityId>,
    units: HashMap<EntityId, Unit>,
    items: HashMap<EntityId, Item>,
    buildings: HashMap<EntityId, Building>,
    possession: Possession,
    /// Hunger each unit loses per simulated second.
    hunger_decay: f32,
    tick_counter: u64,
    sim_time: f64,
}

impl World {
    /// An empty world at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hunger each unit loses per simulated second. Negative and NaN
    /// rates are treated as 0.
    pub fn set_hunger_decay(&mut self, per_second: f32) {
        self.hunger_decay = if per_second.is_nan() {
            0.0
        } else {
            per_second.max(0.0)
        };
    }

    pub fn hunger_decay(&self) -> f32 {
        self.hunger_decay
    }

    // -- world building -----------------------------------------------------

    /// Add an entity to the end of the registry.
    pub fn spawn(&mut self, entity: impl Into<Entity>) -> EntityId {
        let id = self.allocator.allocate();
        let kind = match entity.into() {
            Entity::Unit(unit) => {
                self.units.insert(id, unit);
                "unit"
            }
            Entity::Item(item) => {
                self.items.insert(id, item);
                "item"
            }
            Entity::Building(building) => {
                self.buildings.insert(id, building);
                "building"
            }
        };
        self.order.push(id);
        debug!(entity = %id, kind, "entity spawned");
        id
    }

    /// Append `task` to the back of `unit`'s queue.
    pub fn enqueue_task(&mut self, unit: EntityId, task: Task) -> Result<(), WorldError> {
        let target = self.live_unit_mut(unit)?;
        target.tasks.push_back(task);
        Ok(())
    }

    /// Build a [`Task::move_item_to_building`] from the current positions of
    /// `item` and `building`.
    pub fn move_item_to_building(
        &self,
        item: EntityId,
        building: EntityId,
    ) -> Result<Task, WorldError> {
        let item_position = self
            .item(item)
            .ok_or_else(|| self.kind_error(item, "item"))?
            .position();
        let building_position = self
            .building(building)
            .ok_or_else(|| self.kind_error(building, "building"))?
            .position();
        Ok(Task::move_item_to_building(
            item,
            item_position,
            building,
            building_position,
        ))
    }

    /// Mark an entity dead. It is removed on the next [`step`](Self::step).
    pub fn kill(&mut self, id: EntityId) -> Result<(), WorldError> {
        let body = if let Some(unit) = self.units.get_mut(&id) {
            &mut unit.body
        } else if let Some(item) = self.items.get_mut(&id) {
            &mut item.body
        } else if let Some(building) = self.buildings.get_mut(&id) {
            &mut building.body
        } else {
            return Err(WorldError::UnknownEntity { entity: id });
        };
        body.alive = false;
        Ok(())
    }

    /// Run one `proceed` call of a task that is not in any queue, with
    /// `unit` as executer. Activates the task first if needed. Does not
    /// integrate movement.
    pub fn run_task(
        &mut self,
        unit: EntityId,
        task: &mut Task,
        dt: f32,
    ) -> Result<TaskStatus, WorldError> {
        self.live_unit_mut(unit)?;
        let World {
            units,
            items,
            buildings,
            possession,
            ..
        } = self;
        let Some(target) = units.get_mut(&unit) else {
            return Err(WorldError::UnknownEntity { entity: unit });
        };
        let mut executer = Executer {
            id: unit,
            body: &mut target.body,
            motion: &mut target.motion,
            items: &mut *items,
            buildings: &*buildings,
            possession: &mut *possession,
        };
        task.activate(&executer);
        Ok(task.proceed(dt, &mut executer))
    }

    // -- simulation ---------------------------------------------------------

    /// Advance every entity by `dt` seconds, in registry order.
    ///
    /// An entity whose update reports death is removed immediately; entities
    /// after it are still visited this step, in their original order.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let mut report = StepReport::default();
        let mut index = 0;
        while index < self.order.len() {
            let id = self.order[index];
            report.updated += 1;
            if self.update_entity(id, dt) {
                index += 1;
            } else {
                self.order.remove(index);
                self.remove(id);
                report.removed.push(id);
            }
        }
        self.tick_counter += 1;
        self.sim_time += f64::from(dt);
        report
    }

    fn update_entity(&mut self, id: EntityId, dt: f32) -> bool {
        if self.units.contains_key(&id) {
            self.update_unit(id, dt)
        } else if self.items.contains_key(&id) {
            self.update_item(id, dt)
        } else if let Some(building) = self.buildings.get(&id) {
            building.body.alive
        } else {
            false
        }
    }

    fn update_unit(&mut self, id: EntityId, dt: f32) -> bool {
        let World {
            units,
            items,
            buildings,
            possession,
            hunger_decay,
            ..
        } = self;
        let Some(unit) = units.get_mut(&id) else {
            return false;
        };
        if unit.hunger <= 0.0 {
            unit.body.alive = false;
        }
        if !unit.body.alive {
            return false;
        }

        let Unit {
            body,
            motion,
            hunger,
            tasks,
        } = unit;

        if let Some(front) = tasks.front_mut() {
            let mut executer = Executer {
                id,
                body: &mut *body,
                motion: &mut *motion,
                items: &mut *items,
                buildings: &*buildings,
                possession: &mut *possession,
            };
            front.activate(&executer);
            let status = front.proceed(dt, &mut executer);
            trace!(unit = %id, task = front.name(), ?status, "task proceeded");
            if status.is_done() {
                if let Some(done) = tasks.pop_front() {
                    debug!(unit = %id, task = done.name(), ?status, "task dequeued");
                }
                if let Some(next) = tasks.front_mut() {
                    next.activate(&executer);
                }
            }
        }

        body.position = motion.integrate(body.position, dt);
        *hunger = (*hunger - *hunger_decay * dt).clamp(0.0, MAX_HUNGER);
        body.alive
    }

    fn update_item(&mut self, id: EntityId, dt: f32) -> bool {
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if !item.body.alive {
            return false;
        }
        let Some(owner) = self.possession.owner_of(id) else {
            return true;
        };
        let Some(owner_position) = self.units.get(&owner).map(Unit::position) else {
            self.possession.release_item(id);
            return true;
        };

        let offset = owner_position - item.body.position;
        item.motion.set_direction(offset);
        // Clamped to MAX_SPEED like any other motion.
        item.motion
            .set_speed(((offset.length() - CHASE_STANDOFF) * CHASE_GAIN).max(0.0));
        item.body.position = item.motion.integrate(item.body.position, dt);
        true
    }

    fn remove(&mut self, id: EntityId) {
        if self.units.remove(&id).is_some() {
            if let Some(item) = self.possession.release_unit(id) {
                if let Some(dropped) = self.items.get_mut(&item) {
                    dropped.motion.set_speed(0.0);
                }
            }
        } else if self.items.remove(&id).is_some() {
            self.possession.release_item(id);
        } else {
            self.buildings.remove(&id);
        }
        self.allocator.release(id);
        debug!(entity = %id, "entity removed");
    }

    // -- lookups ------------------------------------------------------------

    fn live_unit_mut(&mut self, id: EntityId) -> Result<&mut Unit, WorldError> {
        if !self.units.contains_key(&id) {
            return Err(self.kind_error(id, "unit"));
        }
        match self.units.get_mut(&id) {
            Some(unit) if unit.body.alive => Ok(unit),
            _ => Err(WorldError::DeadEntity { entity: id }),
        }
    }

    fn kind_error(&self, id: EntityId, expected: &'static str) -> WorldError {
        if self.contains(id) {
            WorldError::WrongKind {
                entity: id,
                expected,
            }
        } else {
            WorldError::UnknownEntity { entity: id }
        }
    }

    /// Whether `id` is in the registry (it may already be marked dead).
    pub fn contains(&self, id: EntityId) -> bool {
        self.allocator.is_live(id)
    }

    /// Entity ids in registry order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Mutable access to a unit, for hunger changes or marking queued tasks
    /// stale.
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn item(&self, id: EntityId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn building(&self, id: EntityId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    /// Position of any entity.
    pub fn position(&self, id: EntityId) -> Option<Vector2> {
        self.units
            .get(&id)
            .map(Unit::position)
            .or_else(|| self.items.get(&id).map(Item::position))
            .or_else(|| self.buildings.get(&id).map(Building::position))
    }

    /// The item `unit` is carrying.
    pub fn held_item(&self, unit: EntityId) -> Option<EntityId> {
        self.possession.held_by(unit)
    }

    /// The unit carrying `item`.
    pub fn owner_of(&self, item: EntityId) -> Option<EntityId> {
        self.possession.owner_of(item)
    }

    pub fn possession(&self) -> &Possession {
        &self.possession
    }

    /// Number of completed steps.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Sum of every `dt` passed to [`step`](Self::step), in seconds.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildingKind, ItemKind};

    // -- 1. Registry --------------------------------------------------------

    #[test]
    fn spawn_preserves_insertion_order() {
        let mut world = World::new();
        let a = world.spawn(Unit::new(0.0, 0.0));
        let b = world.spawn(Item::new(ItemKind::RawMeat, 1.0, 1.0));
        let c = world.spawn(Building::new(BuildingKind::CookFactory, 2.0, 2.0));
        assert_eq!(world.ids(), &[a, b, c]);
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn enqueue_rejects_non_units() {
        let mut world = World::new();
        let item = world.spawn(Item::new(ItemKind::RawMeat, 0.0, 0.0));
        let err = world.enqueue_task(item, Task::drop_item(true)).unwrap_err();
        assert!(matches!(err, WorldError::WrongKind { expected: "unit", .. }));
    }

    #[test]
    fn enqueue_rejects_unknown_and_dead() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        world.kill(unit).unwrap();
        assert!(matches!(
            world.enqueue_task(unit, Task::drop_item(true)),
            Err(WorldError::DeadEntity { .. })
        ));
        world.step(0.1);
        assert!(matches!(
            world.enqueue_task(unit, Task::drop_item(true)),
            Err(WorldError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn kill_unknown_is_error() {
        let mut world = World::new();
        assert!(world.kill(EntityId::new(9, 0)).is_err());
    }

    // -- 2. Unit update -----------------------------------------------------

    #[test]
    fn starving_unit_dies_and_is_removed() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0).with_hunger(0.0));
        let report = world.step(0.1);
        assert_eq!(report.removed, vec![unit]);
        assert!(world.unit(unit).is_none());
        assert!(!world.contains(unit));
    }

    #[test]
    fn hunger_decay_kills_on_the_following_update() {
        let mut world = World::new();
        world.set_hunger_decay(10.0);
        let unit = world.spawn(Unit::new(0.0, 0.0).with_hunger(5.0));

        let first = world.step(1.0);
        assert!(first.removed.is_empty());
        assert_eq!(world.unit(unit).unwrap().hunger(), 0.0);

        let second = world.step(1.0);
        assert_eq!(second.removed, vec![unit]);
    }

    #[test]
    fn finished_task_is_dequeued_and_next_activated() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        world.enqueue_task(unit, Task::drop_item(true)).unwrap();
        world.enqueue_task(unit, Task::go_to((10.0, 0.0))).unwrap();

        world.step(0.1);

        let u = world.unit(unit).unwrap();
        assert_eq!(u.tasks().len(), 1);
        assert!(u.active_task().unwrap().is_activated());
        // The GoTo has not been proceeded yet: still at rest.
        assert_eq!(u.speed(), 0.0);
    }

    #[test]
    fn queued_task_goes_stale_when_its_item_dies() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        let item = world.spawn(Item::new(ItemKind::RawMeat, 1.0, 0.0));
        world.enqueue_task(unit, Task::drop_item(true)).unwrap();
        world.enqueue_task(unit, Task::take_item(item)).unwrap();

        world.kill(item).unwrap();
        world.step(0.1);

        let queued = world.unit(unit).unwrap().active_task().unwrap();
        assert!(queued.is_stale());

        world.step(0.1);
        assert!(!world.unit(unit).unwrap().is_busy());
        assert_eq!(world.held_item(unit), None);
    }

    // -- 3. Possession cleanup ----------------------------------------------

    #[test]
    fn removing_holder_frees_item() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        let item = world.spawn(Item::new(ItemKind::RawMeat, 1.0, 0.0));
        world.run_task(unit, &mut Task::take_item(item), 0.1).unwrap();
        assert_eq!(world.owner_of(item), Some(unit));

        world.kill(unit).unwrap();
        world.step(0.1);

        assert_eq!(world.owner_of(item), None);
        assert!(world.possession().is_empty());
        assert!(world.item(item).is_some());
    }

    #[test]
    fn removing_held_item_clears_holder() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        let item = world.spawn(Item::new(ItemKind::RawMeat, 1.0, 0.0));
        world.run_task(unit, &mut Task::take_item(item), 0.1).unwrap();

        world.kill(item).unwrap();
        world.step(0.1);

        assert_eq!(world.held_item(unit), None);
    }

    // -- 4. Item chase ------------------------------------------------------

    #[test]
    fn free_item_does_not_move() {
        let mut world = World::new();
        let item = world.spawn(Item::new(ItemKind::CookedMeat, 3.0, 3.0));
        world.step(1.0);
        assert_eq!(world.item(item).unwrap().position(), Vector2::new(3.0, 3.0));
    }

    #[test]
    fn held_item_within_standoff_stays_put() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        let item = world.spawn(Item::new(ItemKind::CookedMeat, 4.0, 0.0));
        world.run_task(unit, &mut Task::take_item(item), 0.1).unwrap();

        world.step(1.0);

        let i = world.item(item).unwrap();
        assert_eq!(i.speed(), 0.0);
        assert_eq!(i.position(), Vector2::new(4.0, 0.0));
    }

    #[test]
    fn held_item_approaches_proportionally() {
        let mut world = World::new();
        let unit = world.spawn(Unit::new(0.0, 0.0));
        let item = world.spawn(Item::new(ItemKind::CookedMeat, 1.0, 0.0));
        world.run_task(unit, &mut Task::take_item(item), 0.1).unwrap();
        // Teleport the unit 15 away via an immediate GoTo snap.
        world.run_task(unit, &mut Task::go_to((16.0, 0.0)), 1.0).unwrap();
        world.run_task(unit, &mut Task::go_to((16.0, 0.0)), 1.0).unwrap();

        world.step(0.5);

        // Speed (15 - 5) * 1.5 = 15, moves 7.5 towards the owner.
        let i = world.item(item).unwrap();
        assert_eq!(i.speed(), 15.0);
        assert_eq!(i.position(), Vector2::new(8.5, 0.0));
    }

    // -- 5. Bookkeeping -----------------------------------------------------

    #[test]
    fn step_counts_ticks_and_time() {
        let mut world = World::new();
        world.step(0.25);
        world.step(0.5);
        assert_eq!(world.tick_count(), 2);
        assert_eq!(world.sim_time(), 0.75);
    }
}
