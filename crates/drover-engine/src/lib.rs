//! Drover Engine -- Background simulation driver, snapshot publication and
//! the render/input contracts.
//!
//! This crate builds on [`drover_world`] to run the simulation: a wall-clock
//! [`TickLoop`](tick::TickLoop) steps the world on a dedicated thread owned by
//! a [`Simulation`](lifecycle::Simulation), which publishes an immutable
//! [`WorldSnapshot`](drover_world::snapshot::WorldSnapshot) after every tick.
//! Readers (the renderer) take the latest snapshot at frame start and never
//! touch the live world.
//!
//! # Quick Start
//!
//! ```
//! use drover_engine::prelude::*;
//!
//! let mut world = World::new();
//! let unit = world.spawn(Unit::new(0.0, 0.0));
//! world.enqueue_task(unit, Task::go_to((10.0, 0.0))).unwrap();
//!
//! let mut tick_loop = TickLoop::new(world, &EngineConfig::default());
//! tick_loop.tick_with(1.0);
//! tick_loop.tick_with(1.0);
//!
//! let snapshot = tick_loop.world().snapshot();
//! assert_eq!(snapshot.get(unit).unwrap().position, Vector2::new(10.0, 0.0));
//! assert_eq!(tick_loop.tick_count(), 2);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod frame;
pub mod input;
pub mod lifecycle;
pub mod render;
pub mod scenario;
pub mod tick;

/// Re-export the world crate for convenience.
pub use drover_world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A config or scenario document is not valid JSON for its schema.
    #[error("failed to parse {what}: {source}")]
    Config {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A config value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Reading a file failed.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A scenario refers to a name it never defines, or defines one twice.
    #[error("scenario error: {0}")]
    Scenario(String),

    #[error(transparent)]
    World(#[from] drover_world::WorldError),

    /// The simulation thread panicked; observed when joining it.
    #[error("simulation thread panicked")]
    SimulationPanicked,

    /// The OS refused to start the simulation thread.
    #[error("failed to spawn simulation thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use drover_world::prelude::*;

    pub use crate::config::{CameraConfig, EngineConfig, ViewportConfig};
    pub use crate::frame::{FramePublisher, FrameReader};
    pub use crate::input::{handle_key_release, InputOutcome, Key};
    pub use crate::lifecycle::{RunFlag, Simulation};
    pub use crate::render::{
        draw_frame, Camera, Canvas, Color, DrawCommand, FrameStats, RecordingCanvas,
    };
    pub use crate::scenario::{Assignment, EntitySpec, Scenario, ScenarioWorld, TaskSpec};
    pub use crate::tick::{TickDiagnostics, TickLoop};
    pub use crate::EngineError;
}
