//! Drawing world snapshots.
//!
//! The renderer does not own a window. Each frame the driver takes the latest
//! [`WorldSnapshot`] and calls [`draw_frame`] with a [`Camera`] and a
//! [`Canvas`]. Entities are drawn in registry order. Each one is culled
//! against the camera rectangle expanded by its own radius and issues no draw
//! call when fully outside.
//!
//! | Entity | Shape | Radius | Color |
//! |--------|-------|--------|-------|
//! | Unit | 8-gon | 5 | black, plus a 3px tether to its item |
//! | Raw meat | square | 5 | red |
//! | Cooked meat | triangle | 5 | yellow |
//! | Cook factory | 12-gon | 20 | dark olive |

pub mod canvas;

pub use canvas::{Canvas, Color, DrawCommand, RecordingCanvas};

use std::f32::consts::TAU;

use drover_world::math::Vector2;
use drover_world::model::{BuildingKind, ItemKind};
use drover_world::snapshot::{EntityView, ViewKind, WorldSnapshot};

use crate::config::EngineConfig;

const UNIT_SIDES: usize = 8;
const COOK_FACTORY_SIDES: usize = 12;
const TETHER_WIDTH: f32 = 3.0;

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// The visible world rectangle `[x, x + width] x [y, y + height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            x: config.camera.x,
            y: config.camera.y,
            width: config.viewport.width,
            height: config.viewport.height,
        }
    }

    /// Whether a shape of `radius` centered at `position` touches the view.
    pub fn is_visible(&self, position: Vector2, radius: f32) -> bool {
        position.x >= self.x - radius
            && position.x <= self.x + self.width + radius
            && position.y >= self.y - radius
            && position.y <= self.y + self.height + radius
    }

    /// World to screen coordinates.
    pub fn to_screen(&self, world: Vector2) -> Vector2 {
        Vector2::new(world.x - self.x, world.y - self.y)
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Counts for one drawn frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub tick: u64,
    pub drawn: usize,
    pub culled: usize,
}

/// Clear the canvas and draw every entity of `snapshot`.
pub fn draw_frame(snapshot: &WorldSnapshot, camera: &Camera, canvas: &mut dyn Canvas) -> FrameStats {
    canvas.clear(Color::BACKGROUND);
    let mut stats = FrameStats {
        tick: snapshot.tick,
        ..Default::default()
    };
    for entity in &snapshot.entities {
        if draw_entity(entity, camera, canvas) {
            stats.drawn += 1;
        } else {
            stats.culled += 1;
        }
    }
    stats
}

/// Draw one entity. Returns `false` if it was culled.
pub fn draw_entity(entity: &EntityView, camera: &Camera, canvas: &mut dyn Canvas) -> bool {
    let radius = entity.radius();
    if !camera.is_visible(entity.position, radius) {
        return false;
    }
    let center = camera.to_screen(entity.position);
    match &entity.kind {
        ViewKind::Unit { carrying, .. } => {
            canvas.fill_polygon(&regular_polygon(center, radius, UNIT_SIDES), Color::BLACK);
            if let Some(item) = carrying {
                canvas.line(center, camera.to_screen(*item), TETHER_WIDTH, Color::TETHER);
            }
        }
        ViewKind::Item {
            item: ItemKind::RawMeat,
            ..
        } => {
            let square = [
                center + Vector2::new(-radius, -radius),
                center + Vector2::new(radius, -radius),
                center + Vector2::new(radius, radius),
                center + Vector2::new(-radius, radius),
            ];
            canvas.fill_polygon(&square, Color::RAW_MEAT);
        }
        ViewKind::Item {
            item: ItemKind::CookedMeat,
            ..
        } => {
            let triangle = [
                center + Vector2::new(-radius, -radius),
                center + Vector2::new(radius, -radius),
                center + Vector2::new(0.0, radius),
            ];
            canvas.fill_polygon(&triangle, Color::COOKED_MEAT);
        }
        ViewKind::Building {
            building: BuildingKind::CookFactory,
        } => {
            canvas.fill_polygon(
                &regular_polygon(center, radius, COOK_FACTORY_SIDES),
                Color::COOK_FACTORY,
            );
        }
    }
    true
}

/// `sides` vertices on the circle of `radius` around `center`, starting on
/// the positive x axis.
fn regular_polygon(center: Vector2, radius: f32, sides: usize) -> Vec<Vector2> {
    (0..sides)
        .map(|i| {
            let angle = TAU * i as f32 / sides as f32;
            center + Vector2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
