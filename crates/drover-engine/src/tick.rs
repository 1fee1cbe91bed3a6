//! Wall-clock tick loop.
//!
//! The [`TickLoop`] drives a [`World`] forward. Each tick:
//!
//! 1. `dt` is the wall-clock time since the previous tick (capped by
//!    `max_dt` when configured; the first tick measures from construction).
//! 2. [`World::step`] advances every entity in registry order.
//! 3. Diagnostics for the tick are recorded.
//!
//! [`TickLoop::tick_with`] skips the clock and steps by an explicit `dt`,
//! which is what tests and replays use.
//!
//! # Example
//!
//! ```
//! use drover_engine::config::EngineConfig;
//! use drover_engine::tick::TickLoop;
//! use drover_world::prelude::*;
//!
//! let mut world = World::new();
//! world.spawn(Unit::new(0.0, 0.0).with_hunger(0.0));
//! let mut tick_loop = TickLoop::new(world, &EngineConfig::default());
//!
//! tick_loop.tick_with(0.5);
//! assert_eq!(tick_loop.last_diagnostics().removed, 1);
//! assert!(tick_loop.world().is_empty());
//! ```

use std::time::{Duration, Instant};

use drover_world::world::World;
use tracing::{trace, warn};

use crate::config::EngineConfig;
use crate::frame::FramePublisher;
use crate::lifecycle::RunFlag;

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Diagnostics for the last tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickDiagnostics {
    /// Simulated seconds the tick advanced by.
    pub dt: f32,
    /// Entities removed during the tick.
    pub removed: usize,
    /// Entities updated during the tick.
    pub updated: usize,
    /// Wall-clock time spent inside `World::step`.
    pub step_time: Duration,
}

// ---------------------------------------------------------------------------
// TickLoop
// ---------------------------------------------------------------------------

/// Steps a [`World`] forward, measuring `dt` on the wall clock.
///
/// Tracks the diagnostics of the most recent tick. The world's own counters
/// hold the tick count and accumulated simulated time.
pub struct TickLoop {
    world: World,
    /// Wall-clock instant of the previous tick.
    last_tick: Instant,
    /// Upper bound on a measured `dt`, if any.
    max_dt: Option<f32>,
    last_diagnostics: TickDiagnostics,
}

impl TickLoop {
    /// Wrap `world`, applying the world-level settings in `config`.
    pub fn new(mut world: World, config: &EngineConfig) -> Self {
        world.set_hunger_decay(config.hunger_decay_per_second);
        Self {
            world,
            last_tick: Instant::now(),
            max_dt: config.max_dt,
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    /// Execute one tick with `dt` taken from the wall clock.
    pub fn tick(&mut self) -> &TickDiagnostics {
        let now = Instant::now();
        let mut dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        if let Some(max_dt) = self.max_dt {
            dt = dt.min(max_dt);
        }
        self.tick_with(dt)
    }

    /// Execute one tick of exactly `dt` seconds.
    pub fn tick_with(&mut self, dt: f32) -> &TickDiagnostics {
        let start = Instant::now();
        let report = self.world.step(dt);
        self.last_diagnostics = TickDiagnostics {
            dt,
            removed: report.removed.len(),
            updated: report.updated,
            step_time: start.elapsed(),
        };
        trace!(
            tick = self.world.tick_count(),
            dt,
            updated = report.updated,
            removed = report.removed.len(),
            "tick"
        );
        &self.last_diagnostics
    }

    /// Run `count` ticks of `dt` seconds each.
    pub fn run_ticks(&mut self, count: u64, dt: f32) {
        for _ in 0..count {
            self.tick_with(dt);
        }
    }

    /// Tick on the wall clock until `flag` is cleared, publishing a snapshot
    /// after every tick and sleeping `yield_interval` between iterations.
    /// Clearing the flag exits after the current iteration.
    pub fn run(&mut self, flag: &RunFlag, publisher: &FramePublisher, yield_interval: Duration) {
        // dt of the first iteration starts here, not at construction.
        self.last_tick = Instant::now();
        while flag.is_running() {
            let diagnostics = self.tick();
            if diagnostics.dt > 1.0 {
                warn!(dt = diagnostics.dt, "long tick; simulation is falling behind");
            }
            publisher.publish(self.world.snapshot());
            if !yield_interval.is_zero() {
                std::thread::sleep(yield_interval);
            }
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.world.tick_count()
    }

    /// Simulated seconds elapsed.
    pub fn sim_time(&self) -> f64 {
        self.world.sim_time()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for setup and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
