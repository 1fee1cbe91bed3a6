//! The drawing surface the renderer talks to.
//!
//! A windowing backend implements [`Canvas`]; everything in this crate only
//! issues draw calls through it. [`RecordingCanvas`] keeps the calls as
//! [`DrawCommand`]s, for headless runs and tests.

use drover_world::math::Vector2;
use serde::{Deserialize, Serialize};

/// RGBA color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Ground.
    pub const BACKGROUND: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const RAW_MEAT: Self = Self::rgb(1.0, 0.2, 0.2);
    pub const COOKED_MEAT: Self = Self::rgb(0.7, 0.7, 0.1);
    pub const COOK_FACTORY: Self = Self::rgb(0.3, 0.3, 0.05);
    /// Line between a unit and the item it carries.
    pub const TETHER: Self = Self::rgb(0.7, 0.3, 0.8);
}

/// A draw call, in screen coordinates (camera already subtracted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear(Color),
    Polygon { points: Vec<Vector2>, color: Color },
    Line {
        from: Vector2,
        to: Vector2,
        width: f32,
        color: Color,
    },
}

pub trait Canvas {
    fn clear(&mut self, color: Color);

    /// Fill the convex polygon through `points`.
    fn fill_polygon(&mut self, points: &[Vector2], color: Color);

    fn line(&mut self, from: Vector2, to: Vector2, width: f32, color: Color);
}

#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over the recorded commands, leaving the canvas empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_polygon(&mut self, points: &[Vector2], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn line(&mut self, from: Vector2, to: Vector2, width: f32, color: Color) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }
}
