//! Hand-off of world snapshots from the simulation thread to readers.
//!
//! The simulation thread [`publish`](FramePublisher::publish)es a fresh
//! [`WorldSnapshot`] after every tick. A [`FrameReader`] takes the latest one
//! at frame start as a cheap `Arc` clone and keeps drawing from it while the
//! simulation moves on. The lock is held only for the pointer swap.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use drover_world::snapshot::WorldSnapshot;
use tracing::warn;

type Slot = RwLock<Arc<WorldSnapshot>>;

/// Writer side. Cloning yields another handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct FramePublisher {
    slot: Arc<Slot>,
}

impl FramePublisher {
    /// A publisher holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(snapshot: WorldSnapshot) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Replace the latest snapshot.
    pub fn publish(&self, snapshot: WorldSnapshot) {
        *write(&self.slot) = Arc::new(snapshot);
    }

    pub fn reader(&self) -> FrameReader {
        FrameReader {
            slot: Arc::clone(&self.slot),
        }
    }
}

/// Reader side.
#[derive(Debug, Clone)]
pub struct FrameReader {
    slot: Arc<Slot>,
}

impl FrameReader {
    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<WorldSnapshot> {
        Arc::clone(&read(&self.slot))
    }
}

// The guarded value is a whole `Arc`, so a poisoned lock still holds a
// complete snapshot.
fn read(slot: &Slot) -> RwLockReadGuard<'_, Arc<WorldSnapshot>> {
    slot.read().unwrap_or_else(|poisoned| {
        warn!("snapshot lock poisoned; recovering");
        poisoned.into_inner()
    })
}

fn write(slot: &Slot) -> RwLockWriteGuard<'_, Arc<WorldSnapshot>> {
    slot.write().unwrap_or_else(|poisoned| {
        warn!("snapshot lock poisoned; recovering");
        poisoned.into_inner()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
