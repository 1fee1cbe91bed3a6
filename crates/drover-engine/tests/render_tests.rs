//! Frame drawing through the recording canvas: culling, order and camera.

use drover_engine::prelude::*;

fn polygons(canvas: &RecordingCanvas) -> Vec<(Vec<Vector2>, Color)> {
    canvas
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Polygon { points, color } => Some((points.clone(), *color)),
            _ => None,
        })
        .collect()
}

#[test]
fn entities_outside_the_view_issue_no_draw_calls() {
    let mut world = World::new();
    world.spawn(Unit::new(300.0, 200.0));
    world.spawn(Unit::new(-6.0, 200.0));
    world.spawn(Item::new(ItemKind::RawMeat, 300.0, 406.0));
    // Center outside, but the radius reaches into the view.
    world.spawn(Building::new(BuildingKind::CookFactory, 615.0, 200.0));

    let mut canvas = RecordingCanvas::new();
    let stats = draw_frame(&world.snapshot(), &Camera::default(), &mut canvas);

    assert_eq!(stats.drawn, 2);
    assert_eq!(stats.culled, 2);
    let colors: Vec<_> = polygons(&canvas).into_iter().map(|(_, c)| c).collect();
    assert_eq!(colors, vec![Color::BLACK, Color::COOK_FACTORY]);
}

#[test]
fn draw_order_is_registry_order() {
    let mut world = World::new();
    world.spawn(Building::new(BuildingKind::CookFactory, 100.0, 100.0));
    world.spawn(Item::new(ItemKind::CookedMeat, 100.0, 100.0));
    world.spawn(Unit::new(100.0, 100.0));

    let mut canvas = RecordingCanvas::new();
    draw_frame(&world.snapshot(), &Camera::default(), &mut canvas);

    let colors: Vec<_> = polygons(&canvas).into_iter().map(|(_, c)| c).collect();
    assert_eq!(
        colors,
        vec![Color::COOK_FACTORY, Color::COOKED_MEAT, Color::BLACK]
    );
}

#[test]
fn camera_offset_moves_view_and_shapes() {
    let config = EngineConfig::from_json(r#"{ "camera": { "x": 1000, "y": 500 } }"#).unwrap();
    let camera = Camera::from_config(&config);

    let mut world = World::new();
    world.spawn(Item::new(ItemKind::RawMeat, 1010.0, 520.0));
    world.spawn(Item::new(ItemKind::RawMeat, 10.0, 20.0));

    let mut canvas = RecordingCanvas::new();
    let stats = draw_frame(&world.snapshot(), &camera, &mut canvas);

    assert_eq!(stats.drawn, 1);
    let (points, _) = &polygons(&canvas)[0];
    assert_eq!(
        points,
        &vec![
            Vector2::new(5.0, 15.0),
            Vector2::new(15.0, 15.0),
            Vector2::new(15.0, 25.0),
            Vector2::new(5.0, 25.0),
        ]
    );
}

#[test]
fn idle_unit_draws_no_tether() {
    let mut world = World::new();
    world.spawn(Unit::new(50.0, 50.0));
    world.spawn(Item::new(ItemKind::RawMeat, 52.0, 50.0));

    let mut canvas = RecordingCanvas::new();
    draw_frame(&world.snapshot(), &Camera::default(), &mut canvas);

    assert!(!canvas
        .commands()
        .iter()
        .any(|c| matches!(c, DrawCommand::Line { .. })));
}

// -- Culling properties -----------------------------------------------------

mod culling {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn drawn_iff_inside_the_expanded_view(
            x in -100.0f32..700.0,
            y in -100.0f32..500.0,
            cam_x in -50.0f32..50.0,
            cam_y in -50.0f32..50.0,
        ) {
            let camera = Camera { x: cam_x, y: cam_y, width: 600.0, height: 400.0 };
            let mut world = World::new();
            world.spawn(Building::new(BuildingKind::CookFactory, x, y));

            let mut canvas = RecordingCanvas::new();
            let stats = draw_frame(&world.snapshot(), &camera, &mut canvas);

            let r = BuildingKind::CookFactory.radius();
            let inside = x >= cam_x - r
                && x <= cam_x + 600.0 + r
                && y >= cam_y - r
                && y <= cam_y + 400.0 + r;
            prop_assert_eq!(stats.drawn == 1, inside);
            // Only the clear command when culled.
            prop_assert_eq!(canvas.commands().len(), if inside { 2 } else { 1 });
        }
    }
}
