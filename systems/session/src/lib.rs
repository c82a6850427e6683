#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session tying the shared world, the hostile patrol and the renderer
//! feed together.
//!
//! The session is the renderer-facing entry point: move intents and game-over
//! acknowledgements run synchronously on the caller's thread, while hostiles
//! keep patrolling on their own threads until [`Session::shutdown`].

use std::sync::Arc;

use maze_patrol_core::{Command, Direction, Event, Grid, HostileView, PlayerSnapshot};
use maze_patrol_system_patrol::{Notifier, Patrol, PatrolError};
use maze_patrol_world::{self as world, query, SharedWorld, World};
use tracing::{debug, info};

/// Running game: the shared world plus the threads patrolling it.
#[derive(Debug)]
pub struct Session {
    world: SharedWorld,
    notifier: Notifier,
    patrol: Patrol,
}

impl Session {
    /// Shares the world, publishes the first frame and starts the patrol.
    pub fn start(world: World, notifier: Notifier) -> Result<Self, PatrolError> {
        let world = SharedWorld::new(world);

        world.read(|world| {
            notifier.send(Notifier::player_changed(world));
            notifier.send(Notifier::hostiles_changed(world));
        });

        let patrol = Patrol::spawn(&world, &notifier)?;
        info!(hostiles = patrol.len(), "session started");

        Ok(Self {
            world,
            notifier,
            patrol,
        })
    }

    /// Moves the player one cell if the maze allows it and reports what
    /// happened.
    ///
    /// Intents are ignored while a game over awaits acknowledgement.
    pub fn request_move(&self, direction: Direction) -> Vec<Event> {
        let events = self.run(Command::MovePlayer { direction });
        if events.is_empty() {
            debug!(?direction, "move intent had no effect");
        }
        events
    }

    /// Resets the round if a game over is pending.
    ///
    /// Returns `true` when the reset was applied.
    pub fn acknowledge_game_over(&self) -> bool {
        self.world.update(|world| {
            if !query::awaiting_acknowledgement(world) {
                return false;
            }
            let mut events = Vec::new();
            world::apply(world, Command::Reset, &mut events);
            self.notifier.publish(Notifier::collect(world, &events));
            true
        })
    }

    /// Reports whether move intents are disabled until acknowledgement.
    #[must_use]
    pub fn awaiting_acknowledgement(&self) -> bool {
        self.world.read(query::awaiting_acknowledgement)
    }

    /// Current player snapshot.
    #[must_use]
    pub fn player(&self) -> PlayerSnapshot {
        self.world.read(query::player)
    }

    /// Current hostile snapshots.
    #[must_use]
    pub fn hostiles(&self) -> HostileView {
        self.world.read(query::hostile_view)
    }

    /// The maze being played.
    #[must_use]
    pub fn grid(&self) -> &Arc<Grid> {
        self.world.grid()
    }

    /// Stops the patrol and waits for every hostile thread to finish.
    pub fn shutdown(self) {
        self.patrol.shutdown();
        info!("session ended");
    }

    /// Applies `command` and publishes its notifications before the lock is
    /// released, so the presenter sees changes in the order they happened.
    fn run(&self, command: Command) -> Vec<Event> {
        self.world.update(|world| {
            let mut events = Vec::new();
            world::apply(world, command, &mut events);
            self.notifier.publish(Notifier::collect(world, &events));
            events
        })
    }
}
