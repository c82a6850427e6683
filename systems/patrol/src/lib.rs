#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hostile scheduler that runs one supervised patrol thread per hostile.
//!
//! Every thread repeats the same tick until shutdown: step the hostile,
//! wait for its period, push a fresh hostile snapshot to the presentation
//! context, then resolve contact with the player. Each of those world
//! accesses is a separate critical section on the [`SharedWorld`] lock, so no
//! thread ever sleeps while holding it. Snapshots are sent before the lock is
//! released, which keeps the notification channel in mutation order.

mod notifier;

use std::{
    io,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use maze_patrol_core::{Command, HostileId};
use maze_patrol_world::{self as world, query, SharedWorld};
use thiserror::Error;
use tracing::{debug, error, info};

pub use notifier::Notifier;

/// Errors raised while starting the patrol.
#[derive(Debug, Error)]
pub enum PatrolError {
    /// The operating system refused to start a patrol thread.
    #[error("failed to spawn patrol thread for hostile {hostile}")]
    Spawn {
        /// Hostile whose thread could not be started.
        hostile: HostileId,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

/// Owns the patrol threads of every hostile in a world.
///
/// Dropping the patrol stops and joins every thread, same as
/// [`Patrol::shutdown`].
#[derive(Debug)]
pub struct Patrol {
    shutdown: Option<Sender<()>>,
    workers: Vec<Worker>,
}

impl Patrol {
    /// Starts one patrol thread for every hostile currently in the world.
    ///
    /// If any thread fails to start, the ones already running are stopped
    /// before the error is returned.
    pub fn spawn(world: &SharedWorld, notifier: &Notifier) -> Result<Self, PatrolError> {
        let (shutdown, signal) = channel::bounded::<()>(0);
        let roster = world.read(|world| query::hostile_view(world).into_vec());

        let mut patrol = Self {
            shutdown: Some(shutdown),
            workers: Vec::with_capacity(roster.len()),
        };

        for hostile in roster {
            let task = PatrolTask {
                hostile: hostile.id,
                period: hostile.period,
                world: world.clone(),
                notifier: notifier.clone(),
                signal: signal.clone(),
            };
            let handle = thread::Builder::new()
                .name(format!("patrol-{}", hostile.id))
                .spawn(move || task.run())
                .map_err(|source| PatrolError::Spawn {
                    hostile: hostile.id,
                    source,
                })?;
            patrol.workers.push(Worker {
                hostile: hostile.id,
                handle,
            });
        }

        info!(hostiles = patrol.workers.len(), "patrol started");
        Ok(patrol)
    }

    /// Number of running patrol threads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Reports whether the world had no hostiles to patrol.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Stops every patrol thread and waits for all of them to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the only sender disconnects every waiting receiver.
        drop(self.shutdown.take());

        let stopped = self.workers.len();
        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                error!(hostile = %worker.hostile, "patrol thread panicked");
            }
        }
        if stopped > 0 {
            info!(hostiles = stopped, "patrol stopped");
        }
    }
}

impl Drop for Patrol {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug)]
struct Worker {
    hostile: HostileId,
    handle: JoinHandle<()>,
}

struct PatrolTask {
    hostile: HostileId,
    period: Duration,
    world: SharedWorld,
    notifier: Notifier,
    signal: Receiver<()>,
}

impl PatrolTask {
    fn run(self) {
        let hostile = self.hostile;
        debug!(%hostile, period = ?self.period, "patrol thread running");

        loop {
            let _ = self.world.apply(Command::StepHostile { hostile });

            if !self.wait() {
                break;
            }

            // Notifications leave under the lock so they reach the presenter
            // in the order the world changed.
            self.world
                .read(|world| self.notifier.send(Notifier::hostiles_changed(world)));

            self.world.update(|world| {
                let mut events = Vec::new();
                world::apply(world, Command::ResolveContact { hostile }, &mut events);
                self.notifier.publish(Notifier::collect(world, &events));
            });
        }

        debug!(%hostile, "patrol thread finished");
    }

    /// Sleeps for one period. Returns `false` once shutdown was requested.
    fn wait(&self) -> bool {
        match self.signal.recv_timeout(self.period) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}
