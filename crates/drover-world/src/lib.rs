//! Drover World -- Units, items and buildings driven by hierarchical tasks.
//!
//! This crate is the simulation core of Drover. A [`World`](world::World)
//! holds every entity in registry order. Units execute a FIFO queue of
//! [`Task`](task::Task)s, which are either atomic moves (go to a point, take
//! an item, drop it) or composites built from them. Items that a unit has
//! taken chase their owner on every step.
//!
//! Nothing here knows about threads, clocks or drawing; the engine crate
//! drives [`World::step`](world::World::step) and renders
//! [`WorldSnapshot`](snapshot::WorldSnapshot)s.
//!
//! # Quick Start
//!
//! ```
//! use drover_world::prelude::*;
//!
//! let mut world = World::new();
//! let unit = world.spawn(Unit::new(0.0, 0.0));
//! let meat = world.spawn(Item::new(ItemKind::RawMeat, 10.0, 0.0));
//! let factory = world.spawn(Building::new(BuildingKind::CookFactory, 10.0, 10.0));
//!
//! let delivery = world.move_item_to_building(meat, factory).unwrap();
//! world.enqueue_task(unit, delivery).unwrap();
//!
//! for _ in 0..8 {
//!     world.step(1.0);
//! }
//! assert!(!world.unit(unit).unwrap().is_busy());
//! assert_eq!(world.owner_of(meat), None);
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod executer;
pub mod math;
pub mod model;
pub mod possession;
pub mod snapshot;
pub mod task;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by world operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// The id was never allocated, or its entity has been removed.
    #[error("entity {entity} does not exist (removed or never allocated)")]
    UnknownEntity { entity: entity::EntityId },

    /// The entity exists but is not of the kind the operation needs.
    #[error("entity {entity} is not a {expected}")]
    WrongKind {
        entity: entity::EntityId,
        expected: &'static str,
    },

    /// The entity is marked dead and will be removed on the next step.
    #[error("entity {entity} is dead")]
    DeadEntity { entity: entity::EntityId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::EntityId;
    pub use crate::executer::Executer;
    pub use crate::math::Vector2;
    pub use crate::model::{
        Building, BuildingKind, Entity, Item, ItemKind, Unit, MAX_HUNGER, MAX_SPEED, UNIT_RADIUS,
    };
    pub use crate::possession::Possession;
    pub use crate::snapshot::{EntityView, ViewKind, WorldSnapshot};
    pub use crate::task::{
        Script, Task, TaskKind, TaskStatus, CRUISE_SPEED, DROP_RANGE, TAKE_RANGE,
    };
    pub use crate::world::{StepReport, World};
    pub use crate::WorldError;
}
