//! World bootstrap from a scenario description.
//!
//! A [`Scenario`] lists entities (optionally named) and per-unit task lists
//! that refer to entities by name. [`Scenario::build`] spawns everything in
//! listed order, which becomes registry order, and then enqueues the tasks.
//!
//! ```json
//! {
//!   "entities": [
//!     { "kind": "unit", "name": "hauler", "x": 0, "y": 0 },
//!     { "kind": "item", "name": "meat", "item": "raw_meat", "x": 10, "y": 0 },
//!     { "kind": "building", "name": "factory", "building": "cook_factory", "x": 10, "y": 10 }
//!   ],
//!   "assignments": [
//!     { "unit": "hauler", "tasks": [
//!       { "task": "move_item_to_building", "item": "meat", "building": "factory" },
//!       { "task": "go_to", "x": 30, "y": 20 }
//!     ] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use drover_world::entity::EntityId;
use drover_world::math::Vector2;
use drover_world::model::{Building, BuildingKind, Item, ItemKind, Unit};
use drover_world::task::Task;
use drover_world::world::World;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::EngineError;

/// Width and height of the field [`Scenario::crowd`] scatters entities over.
const CROWD_FIELD: (f32, f32) = (600.0, 400.0);

/// Units per cook factory in [`Scenario::crowd`].
const UNITS_PER_FACTORY: usize = 10;

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitySpec {
    Unit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        x: f32,
        y: f32,
        /// Starting hunger; full when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hunger: Option<f32>,
    },
    Item {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        item: ItemKind,
        x: f32,
        y: f32,
    },
    Building {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        building: BuildingKind,
        x: f32,
        y: f32,
    },
}

impl EntitySpec {
    pub fn name(&self) -> Option<&str> {
        match self {
            EntitySpec::Unit { name, .. }
            | EntitySpec::Item { name, .. }
            | EntitySpec::Building { name, .. } => name.as_deref(),
        }
    }

    fn spawn(&self, world: &mut World) -> EntityId {
        match self {
            EntitySpec::Unit { x, y, hunger, .. } => {
                let mut unit = Unit::new(*x, *y);
                if let Some(hunger) = hunger {
                    unit.set_hunger(*hunger);
                }
                world.spawn(unit)
            }
            EntitySpec::Item { item, x, y, .. } => world.spawn(Item::new(*item, *x, *y)),
            EntitySpec::Building { building, x, y, .. } => {
                world.spawn(Building::new(*building, *x, *y))
            }
        }
    }
}

fn default_ignore_abort() -> bool {
    true
}

/// A task, with targets named by entity name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskSpec {
    GoTo { x: f32, y: f32 },
    GoByPath { points: Vec<[f32; 2]> },
    TakeItem { item: String },
    DropItem {
        #[serde(default = "default_ignore_abort")]
        ignore_abort: bool,
    },
    MoveItemToBuilding { item: String, building: String },
    Sequence { tasks: Vec<TaskSpec> },
}

/// Tasks queued on one unit, front first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub unit: String,
    pub tasks: Vec<TaskSpec>,
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// A built scenario: the world plus the ids of named entities.
#[derive(Debug)]
pub struct ScenarioWorld {
    pub world: World,
    pub names: BTreeMap<String, EntityId>,
}

impl ScenarioWorld {
    pub fn id(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|source| EngineError::Config {
            what: "scenario",
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// One hauler carrying raw meat to a cook factory, then heading to
    /// (30, 20), with a piece of cooked meat lying nearby.
    pub fn demo() -> Self {
        Self {
            entities: vec![
                EntitySpec::Unit {
                    name: Some("hauler".to_owned()),
                    x: 200.0,
                    y: 200.0,
                    hunger: None,
                },
                EntitySpec::Item {
                    name: Some("meat".to_owned()),
                    item: ItemKind::RawMeat,
                    x: 100.0,
                    y: 100.0,
                },
                EntitySpec::Building {
                    name: Some("factory".to_owned()),
                    building: BuildingKind::CookFactory,
                    x: 200.0,
                    y: 300.0,
                },
                EntitySpec::Item {
                    name: None,
                    item: ItemKind::CookedMeat,
                    x: 200.0,
                    y: 100.0,
                },
            ],
            assignments: vec![Assignment {
                unit: "hauler".to_owned(),
                tasks: vec![
                    TaskSpec::MoveItemToBuilding {
                        item: "meat".to_owned(),
                        building: "factory".to_owned(),
                    },
                    TaskSpec::GoTo { x: 30.0, y: 20.0 },
                ],
            }],
        }
    }

    /// `units` haulers and as many pieces of raw meat scattered over the
    /// field, with a cook factory per ten haulers. Hauler `i` delivers meat
    /// `i` and then walks back to where it started.
    pub fn crowd(units: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let (width, height) = CROWD_FIELD;
        let mut point = move || (rng.gen_range(0.0..width), rng.gen_range(0.0..height));

        let factories = units.div_ceil(UNITS_PER_FACTORY);
        let mut scenario = Self::default();
        for f in 0..factories {
            let (x, y) = point();
            scenario.entities.push(EntitySpec::Building {
                name: Some(format!("factory-{f}")),
                building: BuildingKind::CookFactory,
                x,
                y,
            });
        }
        for i in 0..units {
            let (x, y) = point();
            let (meat_x, meat_y) = point();
            scenario.entities.push(EntitySpec::Unit {
                name: Some(format!("unit-{i}")),
                x,
                y,
                hunger: None,
            });
            scenario.entities.push(EntitySpec::Item {
                name: Some(format!("meat-{i}")),
                item: ItemKind::RawMeat,
                x: meat_x,
                y: meat_y,
            });
            scenario.assignments.push(Assignment {
                unit: format!("unit-{i}"),
                tasks: vec![
                    TaskSpec::MoveItemToBuilding {
                        item: format!("meat-{i}"),
                        building: format!("factory-{}", i % factories),
                    },
                    TaskSpec::GoTo { x, y },
                ],
            });
        }
        scenario
    }

    /// Spawn every entity in order, then enqueue every assignment.
    pub fn build(&self) -> Result<ScenarioWorld, EngineError> {
        let mut world = World::new();
        let mut names = BTreeMap::new();
        for spec in &self.entities {
            let id = spec.spawn(&mut world);
            if let Some(name) = spec.name() {
                if names.insert(name.to_owned(), id).is_some() {
                    return Err(EngineError::Scenario(format!(
                        "entity name '{name}' is defined twice"
                    )));
                }
            }
        }

        for assignment in &self.assignments {
            let unit = lookup(&names, &assignment.unit)?;
            for spec in &assignment.tasks {
                let task = build_task(spec, &names, &world)?;
                world.enqueue_task(unit, task)?;
            }
            debug!(unit = %assignment.unit, tasks = assignment.tasks.len(), "assignment queued");
        }
        info!(
            entities = world.len(),
            assignments = self.assignments.len(),
            "scenario built"
        );
        Ok(ScenarioWorld { world, names })
    }
}

fn lookup(names: &BTreeMap<String, EntityId>, name: &str) -> Result<EntityId, EngineError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| EngineError::Scenario(format!("unknown entity name '{name}'")))
}

fn build_task(
    spec: &TaskSpec,
    names: &BTreeMap<String, EntityId>,
    world: &World,
) -> Result<Task, EngineError> {
    let task = match spec {
        TaskSpec::GoTo { x, y } => Task::go_to((*x, *y)),
        TaskSpec::GoByPath { points } => {
            Task::go_by_path(points.iter().map(|&p| Vector2::from(p)))
        }
        TaskSpec::TakeItem { item } => Task::take_item(lookup(names, item)?),
        TaskSpec::DropItem { ignore_abort } => Task::drop_item(*ignore_abort),
        TaskSpec::MoveItemToBuilding { item, building } => {
            world.move_item_to_building(lookup(names, item)?, lookup(names, building)?)?
        }
        TaskSpec::Sequence { tasks } => Task::sequence(
            tasks
                .iter()
                .map(|child| build_task(child, names, world))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    Ok(task)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
