//! Scenario loading and bootstrap.

use drover_engine::prelude::*;

const DELIVERY: &str = r#"{
  "entities": [
    { "kind": "unit", "name": "hauler", "x": 0, "y": 0 },
    { "kind": "item", "name": "meat", "item": "raw_meat", "x": 10, "y": 0 },
    { "kind": "building", "name": "factory", "building": "cook_factory", "x": 10, "y": 10 }
  ],
  "assignments": [
    { "unit": "hauler", "tasks": [
      { "task": "move_item_to_building", "item": "meat", "building": "factory" }
    ] }
  ]
}"#;

// -- 1. Parsing -------------------------------------------------------------

#[test]
fn parses_every_task_kind() {
    let scenario = Scenario::from_json(
        r#"{
          "entities": [
            { "kind": "unit", "name": "u", "x": 1, "y": 2, "hunger": 40 },
            { "kind": "item", "name": "i", "item": "cooked_meat", "x": 0, "y": 0 }
          ],
          "assignments": [
            { "unit": "u", "tasks": [
              { "task": "go_to", "x": 3, "y": 4 },
              { "task": "go_by_path", "points": [[0, 0], [5, 5]] },
              { "task": "take_item", "item": "i" },
              { "task": "drop_item", "ignore_abort": false },
              { "task": "sequence", "tasks": [{ "task": "drop_item" }] }
            ] }
          ]
        }"#,
    )
    .unwrap();

    let built = scenario.build().unwrap();
    let unit = built.world.unit(built.id("u").unwrap()).unwrap();
    assert_eq!(unit.hunger(), 40.0);
    let names: Vec<_> = unit.tasks().iter().map(Task::name).collect();
    assert_eq!(
        names,
        vec!["go_to", "go_by_path", "take_item", "drop_item", "sequence"]
    );
}

#[test]
fn assignments_are_optional() {
    let scenario =
        Scenario::from_json(r#"{ "entities": [{ "kind": "unit", "x": 0, "y": 0 }] }"#).unwrap();
    let built = scenario.build().unwrap();
    assert_eq!(built.world.len(), 1);
    assert!(built.names.is_empty());
}

#[test]
fn unknown_kind_is_config_error() {
    let err = Scenario::from_json(r#"{ "entities": [{ "kind": "tree", "x": 0, "y": 0 }] }"#)
        .unwrap_err();
    assert!(matches!(err, EngineError::Config { what: "scenario", .. }));
}

// -- 2. Name resolution -----------------------------------------------------

#[test]
fn unknown_name_is_scenario_error() {
    let mut scenario = Scenario::from_json(DELIVERY).unwrap();
    scenario.assignments[0].tasks.push(TaskSpec::TakeItem {
        item: "ghost".to_owned(),
    });
    let err = scenario.build().unwrap_err();
    assert!(matches!(err, EngineError::Scenario(ref msg) if msg.contains("ghost")));
}

#[test]
fn duplicate_name_is_scenario_error() {
    let mut scenario = Scenario::from_json(DELIVERY).unwrap();
    scenario.entities.push(EntitySpec::Unit {
        name: Some("hauler".to_owned()),
        x: 0.0,
        y: 0.0,
        hunger: None,
    });
    assert!(matches!(scenario.build(), Err(EngineError::Scenario(_))));
}

#[test]
fn tasks_on_a_non_unit_are_world_errors() {
    let mut scenario = Scenario::from_json(DELIVERY).unwrap();
    scenario.assignments[0].unit = "factory".to_owned();
    assert!(matches!(
        scenario.build(),
        Err(EngineError::World(WorldError::WrongKind { expected: "unit", .. }))
    ));
}

#[test]
fn delivery_targets_must_have_the_right_kind() {
    let mut scenario = Scenario::from_json(DELIVERY).unwrap();
    scenario.assignments[0].tasks = vec![TaskSpec::MoveItemToBuilding {
        item: "factory".to_owned(),
        building: "meat".to_owned(),
    }];
    assert!(matches!(
        scenario.build(),
        Err(EngineError::World(WorldError::WrongKind { expected: "item", .. }))
    ));
}

// -- 3. Running -------------------------------------------------------------

#[test]
fn loaded_delivery_completes_at_one_second_steps() {
    let built = Scenario::from_json(DELIVERY).unwrap().build().unwrap();
    let hauler = built.id("hauler").unwrap();
    let meat = built.id("meat").unwrap();
    let mut tick_loop = TickLoop::new(built.world, &EngineConfig::default());

    tick_loop.run_ticks(8, 1.0);

    let world = tick_loop.world();
    let unit = world.unit(hauler).unwrap();
    assert!(!unit.is_busy());
    assert_eq!(unit.position(), Vector2::new(10.0, 10.0));
    assert_eq!(world.owner_of(meat), None);
    assert!(world.item(meat).unwrap().position().distance(unit.position()) < DROP_RANGE);
}

#[test]
fn demo_hauler_delivers_then_walks_off() {
    let built = Scenario::demo().build().unwrap();
    let hauler = built.id("hauler").unwrap();
    let meat = built.id("meat").unwrap();
    let mut tick_loop = TickLoop::new(built.world, &EngineConfig::default());

    for _ in 0..2_000 {
        tick_loop.tick_with(0.05);
        if !tick_loop.world().unit(hauler).unwrap().is_busy() {
            break;
        }
    }

    let world = tick_loop.world();
    assert!(!world.unit(hauler).unwrap().is_busy());
    assert_eq!(world.unit(hauler).unwrap().position(), Vector2::new(30.0, 20.0));
    assert_eq!(world.owner_of(meat), None);
    let factory = world.position(built_factory(&world)).unwrap();
    assert!(world.item(meat).unwrap().position().distance(factory) < DROP_RANGE + 1.0);
}

fn built_factory(world: &World) -> EntityId {
    world
        .ids()
        .iter()
        .copied()
        .find(|&id| world.building(id).is_some())
        .unwrap()
}

#[test]
fn crowd_runs_to_completion() {
    let ScenarioWorld { world, .. } = Scenario::crowd(30, 11).build().unwrap();
    let mut tick_loop = TickLoop::new(world, &EngineConfig::default());

    for _ in 0..4_000 {
        tick_loop.tick_with(0.05);
    }

    let world = tick_loop.world();
    let busy = world
        .ids()
        .iter()
        .filter(|&&id| world.unit(id).is_some_and(Unit::is_busy))
        .count();
    assert_eq!(busy, 0);
    assert!(world.possession().is_empty());
}

#[test]
fn scenario_json_roundtrip() {
    let demo = Scenario::demo();
    let json = serde_json::to_string(&demo).unwrap();
    assert_eq!(Scenario::from_json(&json).unwrap(), demo);
}
