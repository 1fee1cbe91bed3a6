//! The entity model: what a unit, an item and a building are made of.
//!
//! Every entity has a [`Body`] (position and liveness). Units and items also
//! have a [`Motion`] (clamped speed and a unit-length heading). The per-tick
//! behavior of each kind lives in [`World::step`](crate::world::World::step),
//! which needs access to more than one entity at a time.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::math::Vector2;
use crate::task::Task;

/// Upper bound of every movable entity's speed, in world units per second.
pub const MAX_SPEED: f32 = 50.0;

/// Hunger of a freshly spawned unit, and the upper clamp bound.
pub const MAX_HUNGER: f32 = 100.0;

/// Drawing and culling radius of a unit.
pub const UNIT_RADIUS: f32 = 5.0;

/// An item stops approaching its owner once it is this close.
pub const CHASE_STANDOFF: f32 = 5.0;

/// Proportional gain of the chase: speed per unit of distance beyond the
/// standoff.
pub const CHASE_GAIN: f32 = 1.5;

// ---------------------------------------------------------------------------
// Body / Motion
// ---------------------------------------------------------------------------

/// Position and liveness, shared by every entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub(crate) position: Vector2,
    pub(crate) alive: bool,
}

impl Body {
    /// A live body at `position`.
    pub fn new(position: Vector2) -> Self {
        Self {
            position,
            alive: true,
        }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Speed and heading of a movable entity.
///
/// `speed` always lies in `[0, MAX_SPEED]` and `direction` always has unit
/// length.
#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    speed: f32,
    direction: Vector2,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            speed: 0.0,
            direction: Vector2::UNIT_X,
        }
    }
}

impl Motion {
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn direction(&self) -> Vector2 {
        self.direction
    }

    /// Set the speed, clamped to `[0, MAX_SPEED]`. NaN is treated as 0.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() {
            0.0
        } else {
            speed.clamp(0.0, MAX_SPEED)
        };
    }

    /// Point the heading along `towards`. A zero-length input leaves the
    /// heading unchanged.
    pub fn set_direction(&mut self, towards: Vector2) {
        if let Some(direction) = towards.normalized() {
            self.direction = direction;
        }
    }

    /// `position + speed * direction * dt`.
    pub fn integrate(&self, position: Vector2, dt: f32) -> Vector2 {
        Vector2::new(
            position.x + self.speed * self.direction.x * dt,
            position.y + self.speed * self.direction.y * dt,
        )
    }
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// An autonomous agent executing a FIFO queue of tasks.
///
/// The item a unit carries is not stored here; see
/// [`World::held_item`](crate::world::World::held_item).
#[derive(Debug, Clone)]
pub struct Unit {
    pub(crate) body: Body,
    pub(crate) motion: Motion,
    pub(crate) hunger: f32,
    pub(crate) tasks: VecDeque<Task>,
}

impl Unit {
    /// An idle unit at `(x, y)` at rest with full hunger.
    pub fn new(x: f32, y: f32) -> Self {
        Self::at(Vector2::new(x, y))
    }

    pub fn at(position: Vector2) -> Self {
        Self {
            body: Body::new(position),
            motion: Motion::default(),
            hunger: MAX_HUNGER,
            tasks: VecDeque::new(),
        }
    }

    /// Builder-style hunger override, clamped like [`set_hunger`](Self::set_hunger).
    pub fn with_hunger(mut self, hunger: f32) -> Self {
        self.set_hunger(hunger);
        self
    }

    pub fn position(&self) -> Vector2 {
        self.body.position
    }

    pub fn speed(&self) -> f32 {
        self.motion.speed()
    }

    pub fn direction(&self) -> Vector2 {
        self.motion.direction()
    }

    pub fn hunger(&self) -> f32 {
        self.hunger
    }

    /// Set hunger, clamped to `[0, MAX_HUNGER]`. NaN is ignored.
    pub fn set_hunger(&mut self, hunger: f32) {
        if !hunger.is_nan() {
            self.hunger = hunger.clamp(0.0, MAX_HUNGER);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    /// True while the unit has at least one queued task.
    pub fn is_busy(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// The active task (front of the queue), if any.
    pub fn active_task(&self) -> Option<&Task> {
        self.tasks.front()
    }

    /// All queued tasks, front first.
    pub fn tasks(&self) -> &VecDeque<Task> {
        &self.tasks
    }

    /// Mutable access to a queued task, e.g. to mark it stale.
    pub fn task_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.tasks.get_mut(index)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// What an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Input for a cook factory.
    RawMeat,
    /// Food for units.
    CookedMeat,
}

impl ItemKind {
    pub fn title(self) -> &'static str {
        match self {
            ItemKind::RawMeat => "raw meat",
            ItemKind::CookedMeat => "cooked meat",
        }
    }

    pub fn radius(self) -> f32 {
        5.0
    }
}

/// A carriable resource. While taken it chases its owner.
#[derive(Debug, Clone)]
pub struct Item {
    pub(crate) body: Body,
    pub(crate) motion: Motion,
    pub(crate) kind: ItemKind,
}

impl Item {
    /// An unowned item of `kind` at rest at `(x, y)`.
    pub fn new(kind: ItemKind, x: f32, y: f32) -> Self {
        Self::at(kind, Vector2::new(x, y))
    }

    pub fn at(kind: ItemKind, position: Vector2) -> Self {
        Self {
            body: Body::new(position),
            motion: Motion::default(),
            kind,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn position(&self) -> Vector2 {
        self.body.position
    }

    pub fn speed(&self) -> f32 {
        self.motion.speed()
    }

    pub fn direction(&self) -> Vector2 {
        self.motion.direction()
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// What a building is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Turns raw meat into cooked meat. Production is not simulated yet.
    CookFactory,
}

impl BuildingKind {
    pub fn radius(self) -> f32 {
        match self {
            BuildingKind::CookFactory => 20.0,
        }
    }
}

/// A static structure. Its update only reports liveness.
#[derive(Debug, Clone)]
pub struct Building {
    pub(crate) body: Body,
    pub(crate) kind: BuildingKind,
}

impl Building {
    pub fn new(kind: BuildingKind, x: f32, y: f32) -> Self {
        Self::at(kind, Vector2::new(x, y))
    }

    pub fn at(kind: BuildingKind, position: Vector2) -> Self {
        Self {
            body: Body::new(position),
            kind,
        }
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn position(&self) -> Vector2 {
        self.body.position
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Any entity, as handed to [`World::spawn`](crate::world::World::spawn).
#[derive(Debug, Clone)]
pub enum Entity {
    Unit(Unit),
    Item(Item),
    Building(Building),
}

impl From<Unit> for Entity {
    fn from(unit: Unit) -> Self {
        Entity::Unit(unit)
    }
}

impl From<Item> for Entity {
    fn from(item: Item) -> Self {
        Entity::Item(item)
    }
}

impl From<Building> for Entity {
    fn from(building: Building) -> Self {
        Entity::Building(building)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_clamped() {
        let mut motion = Motion::default();
        motion.set_speed(120.0);
        assert_eq!(motion.speed(), MAX_SPEED);
        motion.set_speed(-3.0);
        assert_eq!(motion.speed(), 0.0);
        motion.set_speed(f32::NAN);
        assert_eq!(motion.speed(), 0.0);
        motion.set_speed(f32::INFINITY);
        assert_eq!(motion.speed(), MAX_SPEED);
    }

    #[test]
    fn zero_direction_is_ignored() {
        let mut motion = Motion::default();
        motion.set_direction(Vector2::new(0.0, 4.0));
        motion.set_direction(Vector2::ZERO);
        assert_eq!(motion.direction(), Vector2::new(0.0, 1.0));
    }

    #[test]
    fn default_direction_is_positive_x() {
        assert_eq!(Motion::default().direction(), Vector2::UNIT_X);
    }

    #[test]
    fn integrate_moves_along_heading() {
        let mut motion = Motion::default();
        motion.set_speed(10.0);
        motion.set_direction(Vector2::new(0.0, -1.0));
        let moved = motion.integrate(Vector2::new(1.0, 1.0), 0.5);
        assert_eq!(moved, Vector2::new(1.0, -4.0));
    }

    #[test]
    fn hunger_defaults_full_and_clamps() {
        let mut unit = Unit::new(0.0, 0.0);
        assert_eq!(unit.hunger(), MAX_HUNGER);
        unit.set_hunger(250.0);
        assert_eq!(unit.hunger(), MAX_HUNGER);
        unit.set_hunger(-1.0);
        assert_eq!(unit.hunger(), 0.0);
        unit.set_hunger(f32::NAN);
        assert_eq!(unit.hunger(), 0.0);
    }

    #[test]
    fn fresh_unit_is_idle() {
        let unit = Unit::new(3.0, 4.0);
        assert!(!unit.is_busy());
        assert!(unit.active_task().is_none());
        assert!(unit.is_alive());
    }

    #[test]
    fn kind_titles_and_radii() {
        assert_eq!(ItemKind::RawMeat.title(), "raw meat");
        assert_eq!(ItemKind::CookedMeat.title(), "cooked meat");
        assert_eq!(BuildingKind::CookFactory.radius(), 20.0);
    }
}
