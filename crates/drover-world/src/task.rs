//! Hierarchical unit tasks.
//!
//! A [`Task`] is either *atomic* (it manipulates the executing unit directly:
//! [`TaskKind::GoTo`], [`TaskKind::TakeItem`], [`TaskKind::DropItem`]) or
//! *composite* ([`TaskKind::Composite`], an ordered queue of child tasks run
//! front to back). Every call to [`Task::proceed`] answers with a
//! [`TaskStatus`]:
//!
//! - `Finished`: done, the holder dequeues it.
//! - `Proceed`: call again next tick.
//! - `Aborted`: failed. A composite receiving `Aborted` from a child clears
//!   its remaining children and aborts too, so failure propagates to the top
//!   without running later siblings. Nothing is retried.
//!
//! A composite only notices that its queue is empty at the *start* of a call,
//! so after its last child finishes it reports `Proceed` once more and
//! `Finished` on the following call.
//!
//! # Staleness
//!
//! A task can be marked stale before it starts. On activation (just before
//! its first `proceed`) the holder re-checks the task's targets; a stale task
//! aborts on its first call without touching anything.
//!
//! ```
//! use drover_world::prelude::*;
//!
//! let mut world = World::new();
//! let unit = world.spawn(Unit::new(0.0, 0.0));
//! world.enqueue_task(unit, Task::go_to(Vector2::new(30.0, 0.0))).unwrap();
//!
//! world.step(1.0); // heads off at cruise speed, overshooting to x = 50
//! world.step(1.0); // within reach: snaps onto the target
//! let u = world.unit(unit).unwrap();
//! assert_eq!(u.position(), Vector2::new(30.0, 0.0));
//! assert!(!u.is_busy());
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityId;
use crate::executer::Executer;
use crate::math::Vector2;

/// Speed a unit travels at while executing [`TaskKind::GoTo`].
pub const CRUISE_SPEED: f32 = 50.0;

/// An item must be strictly closer than this to be taken.
pub const TAKE_RANGE: f32 = 5.0;

/// A held item must be strictly closer than this to be dropped.
pub const DROP_RANGE: f32 = 7.0;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Result of one [`Task::proceed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Finished,
    Proceed,
    Aborted,
}

impl TaskStatus {
    /// `Finished` or `Aborted`: the holder should dequeue the task.
    pub fn is_done(self) -> bool {
        !matches!(self, TaskStatus::Proceed)
    }
}

// ---------------------------------------------------------------------------
// TaskKind
// ---------------------------------------------------------------------------

/// What a composite task was built as. Decides its staleness check.
#[derive(Debug, Clone, PartialEq)]
pub enum Script {
    /// An arbitrary ordered list of tasks.
    Sequence,
    /// One `GoTo` per waypoint.
    GoByPath,
    /// Walk to the item, take it, walk to the building, drop it there.
    MoveItemToBuilding { item: EntityId, building: EntityId },
}

/// What a task does when it proceeds.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Travel in a straight line and stop exactly on `target`.
    GoTo { target: Vector2 },
    /// Take `item` if it is within [`TAKE_RANGE`]; abort otherwise.
    TakeItem { item: EntityId },
    /// Wait for the held item to come within [`DROP_RANGE`], then drop it.
    /// With no item held: finish if `ignore_abort`, else abort.
    DropItem { ignore_abort: bool },
    /// Run `children` front to back.
    Composite {
        script: Script,
        children: VecDeque<Task>,
    },
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One entry of a unit's task queue.
///
/// A task may be marked stale while it waits in the queue. Once activated
/// (right before its first `proceed`) the flag is frozen, and a stale task
/// aborts without acting.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    kind: TaskKind,
    stale: bool,
    activated: bool,
}

impl Task {
    fn from_kind(kind: TaskKind) -> Self {
        Self {
            kind,
            stale: false,
            activated: false,
        }
    }

    fn composite(script: Script, children: impl IntoIterator<Item = Task>) -> Self {
        Self::from_kind(TaskKind::Composite {
            script,
            children: children.into_iter().collect(),
        })
    }

    /// Walk to `target`, snapping onto it once it is within one step.
    pub fn go_to(target: impl Into<Vector2>) -> Self {
        Self::from_kind(TaskKind::GoTo {
            target: target.into(),
        })
    }

    /// Take `item`. Aborts unless it is within [`TAKE_RANGE`] on the first call.
    pub fn take_item(item: EntityId) -> Self {
        Self::from_kind(TaskKind::TakeItem { item })
    }

    /// Drop the held item. `ignore_abort` decides the outcome when there is
    /// nothing to drop (the usual choice is `true`).
    pub fn drop_item(ignore_abort: bool) -> Self {
        Self::from_kind(TaskKind::DropItem { ignore_abort })
    }

    /// Visit `points` in order.
    pub fn go_by_path(points: impl IntoIterator<Item = Vector2>) -> Self {
        Self::composite(Script::GoByPath, points.into_iter().map(Task::go_to))
    }

    /// Visit the points of a flat `[x1, y1, x2, y2, ...]` list. A trailing
    /// unpaired value is ignored.
    pub fn go_by_flat_path(coords: &[f32]) -> Self {
        Self::go_by_path(
            coords
                .chunks_exact(2)
                .map(|pair| Vector2::new(pair[0], pair[1])),
        )
    }

    /// Run `children` in order as one task.
    pub fn sequence(children: impl IntoIterator<Item = Task>) -> Self {
        Self::composite(Script::Sequence, children)
    }

    /// Carry `item` (currently at `item_position`) to `building` (at
    /// `building_position`). The final drop aborts if the item was lost on
    /// the way.
    ///
    /// [`World::move_item_to_building`](crate::world::World::move_item_to_building)
    /// builds this from the current positions.
    pub fn move_item_to_building(
        item: EntityId,
        item_position: Vector2,
        building: EntityId,
        building_position: Vector2,
    ) -> Self {
        Self::composite(
            Script::MoveItemToBuilding { item, building },
            [
                Task::go_to(item_position),
                Task::take_item(item),
                Task::go_to(building_position),
                Task::drop_item(false),
            ],
        )
    }

    // -- accessors ----------------------------------------------------------

    /// What this task does.
    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Remaining children of a composite; `None` for atomic tasks.
    pub fn children(&self) -> Option<&VecDeque<Task>> {
        match &self.kind {
            TaskKind::Composite { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether the task has been activated (its first `proceed` is due or done).
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            TaskKind::GoTo { .. } => "go_to",
            TaskKind::TakeItem { .. } => "take_item",
            TaskKind::DropItem { .. } => "drop_item",
            TaskKind::Composite { script, .. } => match script {
                Script::Sequence => "sequence",
                Script::GoByPath => "go_by_path",
                Script::MoveItemToBuilding { .. } => "move_item_to_building",
            },
        }
    }

    /// Mark the task as no longer worth doing. Only possible before the task
    /// has been activated; returns whether the flag is now set.
    pub fn mark_stale(&mut self) -> bool {
        if !self.activated {
            self.stale = true;
        }
        self.stale
    }

    // -- staleness ----------------------------------------------------------

    /// Whether the task's goal is known to be invalid.
    ///
    /// Atomic moves and sequences only report the flag. Tasks aimed at an
    /// item or building also go stale when their target is gone, or when
    /// the item is held by a different unit.
    pub fn check_targets(&self, executer: &Executer<'_>) -> bool {
        if self.stale {
            return true;
        }
        match &self.kind {
            TaskKind::TakeItem { item } => !executer.can_take(*item),
            TaskKind::Composite {
                script: Script::MoveItemToBuilding { item, building },
                ..
            } => !executer.can_take(*item) || !executer.building_exists(*building),
            _ => false,
        }
    }

    /// Runs the staleness check once, right before the first `proceed`.
    pub(crate) fn activate(&mut self, executer: &Executer<'_>) {
        if self.activated {
            return;
        }
        if self.check_targets(executer) {
            debug!(unit = %executer.id(), task = self.name(), "task is stale");
            self.stale = true;
        }
        self.activated = true;
    }

    // -- execution ----------------------------------------------------------

    /// Advance the task by `dt` seconds on behalf of `executer`.
    pub fn proceed(&mut self, dt: f32, executer: &mut Executer<'_>) -> TaskStatus {
        if self.stale {
            return TaskStatus::Aborted;
        }
        match &mut self.kind {
            TaskKind::GoTo { target } => go_to(*target, dt, executer),
            TaskKind::TakeItem { item } => take_item(*item, executer),
            TaskKind::DropItem { ignore_abort } => drop_item(*ignore_abort, executer),
            TaskKind::Composite { children, .. } => {
                let Some(front) = children.front_mut() else {
                    return TaskStatus::Finished;
                };
                front.activate(executer);
                match front.proceed(dt, executer) {
                    TaskStatus::Finished => {
                        children.pop_front();
                        TaskStatus::Proceed
                    }
                    TaskStatus::Aborted => {
                        children.clear();
                        TaskStatus::Aborted
                    }
                    TaskStatus::Proceed => TaskStatus::Proceed,
                }
            }
        }
    }
}

fn go_to(target: Vector2, dt: f32, executer: &mut Executer<'_>) -> TaskStatus {
    let position = executer.position();
    if position.distance(target) <= executer.speed() * dt {
        executer.set_position(target);
        executer.set_speed(0.0);
        return TaskStatus::Finished;
    }
    executer.set_speed(CRUISE_SPEED);
    executer.set_direction(target - position);
    TaskStatus::Proceed
}

fn take_item(item: EntityId, executer: &mut Executer<'_>) -> TaskStatus {
    match executer.item_position(item) {
        Some(at) if executer.position().distance(at) < TAKE_RANGE => {
            executer.take_item(item);
            TaskStatus::Finished
        }
        _ => TaskStatus::Aborted,
    }
}

fn drop_item(ignore_abort: bool, executer: &mut Executer<'_>) -> TaskStatus {
    let Some(item) = executer.held_item() else {
        return if ignore_abort {
            TaskStatus::Finished
        } else {
            TaskStatus::Aborted
        };
    };
    match executer.item_position(item) {
        Some(at) if executer.position().distance(at) < DROP_RANGE => {
            executer.drop_item();
            TaskStatus::Finished
        }
        _ => TaskStatus::Proceed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
