use std::sync::{Arc, Mutex, MutexGuard};

use maze_patrol_core::{Command, Event, Grid};
use tracing::warn;

use crate::{apply, query, World};

/// Thread-safe handle to the world shared by patrol threads and the
/// move-intent handler.
///
/// Every command runs to completion under a single lock, so player state,
/// hostile state and contact resolution are never observed half-updated.
/// The grid is immutable and reachable without taking the lock.
#[derive(Clone, Debug)]
pub struct SharedWorld {
    world: Arc<Mutex<World>>,
    grid: Arc<Grid>,
}

impl SharedWorld {
    /// Moves the world behind a lock.
    #[must_use]
    pub fn new(world: World) -> Self {
        let grid = Arc::clone(query::grid(&world));
        Self {
            world: Arc::new(Mutex::new(world)),
            grid,
        }
    }

    /// Applies a command atomically and returns the resulting events.
    pub fn apply(&self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(&mut *self.lock(), command, &mut events);
        events
    }

    /// Runs `read` against a consistent view of the world.
    pub fn read<T>(&self, read: impl FnOnce(&World) -> T) -> T {
        read(&*self.lock())
    }

    /// Runs `update` with exclusive access to the world.
    ///
    /// Use this when a command and the snapshot describing its result must
    /// be taken inside the same critical section.
    pub fn update<T>(&self, update: impl FnOnce(&mut World) -> T) -> T {
        update(&mut *self.lock())
    }

    /// The immutable grid, readable without locking.
    #[must_use]
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(|poisoned| {
            warn!("world lock poisoned by a panicking holder; recovering");
            poisoned.into_inner()
        })
    }
}
