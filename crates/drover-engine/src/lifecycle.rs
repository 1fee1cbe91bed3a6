//! The background simulation thread and its running flag.
//!
//! [`Simulation::start`] moves a [`TickLoop`] onto a thread named
//! `simulation`, which ticks until the shared [`RunFlag`] is cleared. The
//! shutdown sequence is always [`request_stop`](Simulation::request_stop)
//! followed by [`join`](Simulation::join); `join` returns the tick loop (and
//! with it the world) once the thread has exited, so nothing the thread
//! touches is released while it still runs.
//!
//! Dropping a `Simulation` without joining performs the same sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info};

use crate::frame::{FramePublisher, FrameReader};
use crate::tick::TickLoop;
use crate::EngineError;

// ---------------------------------------------------------------------------
// RunFlag
// ---------------------------------------------------------------------------

/// Shared "keep running" flag. Starts set; once cleared it stays cleared.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl Default for RunFlag {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the simulation should keep ticking.
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Ask the simulation to exit after its current iteration.
    pub fn request_stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// A [`TickLoop`] running on its own thread.
///
/// The thread ticks until its [`RunFlag`] is cleared and hands the loop back
/// through [`join`](Self::join). Dropping the handle stops and joins it.
pub struct Simulation {
    flag: RunFlag,
    publisher: FramePublisher,
    handle: Option<JoinHandle<TickLoop>>,
}

impl Simulation {
    /// Spawn the simulation thread. A snapshot of the initial world is
    /// published before the thread starts, so readers never see an empty
    /// frame.
    pub fn start(tick_loop: TickLoop, yield_interval: Duration) -> Result<Self, EngineError> {
        let flag = RunFlag::new();
        let publisher = FramePublisher::with_initial(tick_loop.world().snapshot());
        let entities = tick_loop.world().len();

        let handle = {
            let flag = flag.clone();
            let publisher = publisher.clone();
            let mut tick_loop = tick_loop;
            thread::Builder::new()
                .name("simulation".to_owned())
                .spawn(move || {
                    tick_loop.run(&flag, &publisher, yield_interval);
                    tick_loop
                })
                .map_err(EngineError::ThreadSpawn)?
        };
        info!(entities, ?yield_interval, "simulation thread started");

        Ok(Self {
            flag,
            publisher,
            handle: Some(handle),
        })
    }

    /// A reader of the snapshots this simulation publishes.
    pub fn reader(&self) -> FrameReader {
        self.publisher.reader()
    }

    /// A handle to the running flag, e.g. for an input handler.
    pub fn flag(&self) -> RunFlag {
        self.flag.clone()
    }

    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// Clear the running flag. The thread exits after its current iteration.
    pub fn request_stop(&self) {
        if self.flag.is_running() {
            info!("simulation stop requested");
        }
        self.flag.request_stop();
    }

    /// Block until the thread has exited and hand back its tick loop.
    /// Call [`request_stop`](Self::request_stop) first, or this waits until
    /// someone else clears the flag.
    pub fn join(mut self) -> Result<TickLoop, EngineError> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<TickLoop, EngineError> {
        let Some(handle) = self.handle.take() else {
            return Err(EngineError::SimulationPanicked);
        };
        match handle.join() {
            Ok(tick_loop) => {
                info!(ticks = tick_loop.tick_count(), "simulation thread joined");
                Ok(tick_loop)
            }
            Err(_) => {
                error!("simulation thread panicked");
                Err(EngineError::SimulationPanicked)
            }
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.request_stop();
            let _ = self.join_inner();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
