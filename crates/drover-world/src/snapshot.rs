//! Immutable, serializable views of the world.
//!
//! A [`WorldSnapshot`] carries everything a renderer needs (positions,
//! kinds, who carries what) in registry order, detached from the live
//! [`World`]. The simulation thread captures one after each step and hands it
//! to readers, which never see the world mid-update.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::math::Vector2;
use crate::model::{BuildingKind, ItemKind, UNIT_RADIUS};
use crate::world::World;

/// Kind-specific part of an [`EntityView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewKind {
    Unit {
        hunger: f32,
        speed: f32,
        busy: bool,
        /// Position of the carried item, if any.
        carrying: Option<Vector2>,
    },
    Item {
        item: ItemKind,
        owned: bool,
    },
    Building {
        building: BuildingKind,
    },
}

/// One entity as of the end of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub position: Vector2,
    #[serde(flatten)]
    pub kind: ViewKind,
}

impl EntityView {
    /// Drawing and culling radius.
    pub fn radius(&self) -> f32 {
        match &self.kind {
            ViewKind::Unit { .. } => UNIT_RADIUS,
            ViewKind::Item { item, .. } => item.radius(),
            ViewKind::Building { building } => building.radius(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// [`World::tick_count`] at capture time.
    pub tick: u64,
    /// Live entities, in registry order.
    pub entities: Vec<EntityView>,
}

impl WorldSnapshot {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// BLAKE3 hex digest of the serialized snapshot. Equal worlds give equal
    /// hashes, which is how determinism tests compare runs.
    pub fn content_hash(&self) -> String {
        let bytes =
            serde_json::to_vec(self).expect("WorldSnapshot should always be JSON-serializable");
        blake3::hash(&bytes).to_hex().to_string()
    }
}

impl World {
    /// Capture the live entities in registry order.
    pub fn snapshot(&self) -> WorldSnapshot {
        let entities = self
            .ids()
            .iter()
            .filter_map(|&id| self.view(id))
            .collect();
        WorldSnapshot {
            tick: self.tick_count(),
            entities,
        }
    }

    fn view(&self, id: EntityId) -> Option<EntityView> {
        if let Some(unit) = self.unit(id) {
            let carrying = self
                .held_item(id)
                .and_then(|item| self.item(item))
                .map(|item| item.position());
            return unit.is_alive().then(|| EntityView {
                id,
                position: unit.position(),
                kind: ViewKind::Unit {
                    hunger: unit.hunger(),
                    speed: unit.speed(),
                    busy: unit.is_busy(),
                    carrying,
                },
            });
        }
        if let Some(item) = self.item(id) {
            return item.is_alive().then(|| EntityView {
                id,
                position: item.position(),
                kind: ViewKind::Item {
                    item: item.kind(),
                    owned: self.owner_of(id).is_some(),
                },
            });
        }
        let building = self.building(id)?;
        building.is_alive().then(|| EntityView {
            id,
            position: building.position(),
            kind: ViewKind::Building {
                building: building.kind(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
