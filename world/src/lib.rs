#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Patrol.
//!
//! The [`World`] is the single authority deciding whether an entity may move,
//! and the only place player health or any position is mutated. Patrol
//! threads and the move-intent handler reach it through [`SharedWorld`], which
//! serializes every command behind one lock.

mod shared;

use std::{sync::Arc, time::Duration};

use maze_patrol_core::{
    CellKind, Command, DamageSource, Direction, Event, GameOutcome, Grid, HostileId, HostileKind,
    HostileProfile, HostileSnapshot, Position, Rules,
};
use thiserror::Error;
use tracing::{debug, info, trace};

pub use shared::SharedWorld;

/// Errors raised while constructing a [`World`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The grid contains no start cell for the player.
    #[error("map has no start cell")]
    MissingStart,
    /// The configured maximum health would leave the player dead on arrival.
    #[error("max_health must be positive (received {0})")]
    InvalidMaxHealth(i32),
    /// A damage value would heal the player instead of hurting them.
    #[error("damage must not be negative (received {0})")]
    NegativeDamage(i32),
    /// A hostile kind would patrol without pausing between ticks.
    #[error("{0:?} period must be longer than zero")]
    ZeroPeriod(HostileKind),
}

/// Represents the authoritative Maze Patrol world state.
#[derive(Debug)]
pub struct World {
    grid: Arc<Grid>,
    rules: Rules,
    start: Position,
    player: Player,
    hostiles: Vec<Hostile>,
    intents_enabled: bool,
}

impl World {
    /// Creates a world from a loaded grid, placing the player on the first
    /// start cell and one hostile on every spawn marker.
    pub fn new(grid: Arc<Grid>, rules: Rules) -> Result<Self, WorldError> {
        validate(&rules)?;

        let start = grid
            .positions_of(CellKind::Start)
            .first()
            .copied()
            .ok_or(WorldError::MissingStart)?;

        let mut hostiles = Vec::new();
        for kind in HostileKind::ALL {
            let profile = rules.profile(kind);
            for spawn in grid.positions_of(kind.spawn_cell()) {
                let id = HostileId::new(u32::try_from(hostiles.len()).unwrap_or(u32::MAX));
                hostiles.push(Hostile::from_spawn(id, kind, spawn, profile));
            }
        }

        info!(
            width = grid.width(),
            height = grid.height(),
            hostiles = hostiles.len(),
            %start,
            "world constructed"
        );

        Ok(Self {
            player: Player::at(start, rules.max_health),
            grid,
            rules,
            start,
            hostiles,
            intents_enabled: true,
        })
    }

    /// Reports whether an entity standing on `position` may step in `direction`.
    ///
    /// The target must lie within the grid and must not be a wall. Every
    /// entity is frozen while the player is dead.
    #[must_use]
    pub fn can_move(&self, position: Position, direction: Direction) -> bool {
        if !self.player.is_alive() {
            return false;
        }

        position
            .step(direction)
            .filter(|target| self.grid.contains(*target))
            .and_then(|target| self.grid.cell_at(target).ok())
            .map_or(false, CellKind::is_passable)
    }

    /// Moves the player one cell, applying hazard damage on arrival.
    ///
    /// Does nothing when [`World::can_move`] refuses the step.
    pub fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.player.position;
        if !self.can_move(from, direction) {
            trace!(?direction, %from, "player move refused");
            return;
        }
        let Some(to) = from.step(direction) else {
            return;
        };

        self.player.position = to;
        out_events.push(Event::PlayerMoved { from, to });
        debug!(?direction, %from, %to, "player moved");

        if self.cell_kind(to) == Some(CellKind::Hazard) {
            self.apply_damage(self.rules.hazard_damage, DamageSource::Hazard, out_events);
        }
    }

    /// Advances a hostile along its patrol, or turns it around when blocked.
    pub fn move_hostile(&mut self, hostile: HostileId, out_events: &mut Vec<Event>) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };

        let current = self.hostiles[index];
        let target = if self.can_move(current.position, current.direction) {
            current.position.step(current.direction)
        } else {
            None
        };

        let entry = &mut self.hostiles[index];
        match target {
            Some(to) => {
                entry.position = to;
                out_events.push(Event::HostileAdvanced {
                    hostile,
                    from: current.position,
                    to,
                });
                trace!(%hostile, from = %current.position, %to, "hostile advanced");
            }
            None => {
                entry.direction = entry.kind.axis().toggle(entry.direction);
                out_events.push(Event::HostileTurned {
                    hostile,
                    direction: entry.direction,
                });
                trace!(%hostile, direction = ?entry.direction, "hostile turned");
            }
        }
    }

    /// First hostile, in identifier order, standing on the player's cell.
    #[must_use]
    pub fn check_contact(&self) -> Option<HostileId> {
        self.hostiles
            .iter()
            .find(|hostile| hostile.position == self.player.position)
            .map(|hostile| hostile.id)
    }

    /// Subtracts `amount` from the player's health. No floor is enforced.
    pub fn apply_damage(&mut self, amount: i32, source: DamageSource, out_events: &mut Vec<Event>) {
        self.player.health = self.player.health.saturating_sub(amount);
        out_events.push(Event::PlayerDamaged {
            amount,
            health: self.player.health,
            source,
        });
        info!(amount, health = self.player.health, ?source, "player damaged");
    }

    /// Reports whether the player stands on the exit.
    #[must_use]
    pub fn is_player_at_exit(&self) -> bool {
        self.cell_kind(self.player.position) == Some(CellKind::End)
    }

    /// Returns the player to the start with full health, sends every hostile
    /// back to its spawn and re-enables move intents.
    pub fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.player = Player::at(self.start, self.rules.max_health);
        for hostile in &mut self.hostiles {
            hostile.respawn();
        }
        self.intents_enabled = true;
        out_events.push(Event::GameReset);
        info!(start = %self.start, "world reset");
    }

    fn resolve_contact(&mut self, hostile: HostileId, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() || self.check_contact() != Some(hostile) {
            return;
        }
        let Some(damage) = self
            .hostile_index(hostile)
            .map(|index| self.hostiles[index].damage)
        else {
            return;
        };

        self.apply_damage(damage, DamageSource::Hostile(hostile), out_events);
        self.settle_outcome(out_events);
    }

    fn settle_outcome(&mut self, out_events: &mut Vec<Event>) {
        if !self.intents_enabled {
            return;
        }

        let outcome = if !self.player.is_alive() {
            GameOutcome::Died
        } else if self.is_player_at_exit() {
            GameOutcome::Won
        } else {
            return;
        };

        self.intents_enabled = false;
        out_events.push(Event::GameOver { outcome });
        info!(?outcome, health = self.player.health, "round over");
    }

    fn hostile_index(&self, hostile: HostileId) -> Option<usize> {
        let index = usize::try_from(hostile.get()).ok()?;
        self.hostiles
            .get(index)
            .filter(|entry| entry.id == hostile)
            .map(|_| index)
    }

    fn cell_kind(&self, position: Position) -> Option<CellKind> {
        let kind = self.grid.cell_at(position);
        debug_assert!(kind.is_ok(), "entity escaped the grid: {kind:?}");
        kind.ok()
    }
}

fn validate(rules: &Rules) -> Result<(), WorldError> {
    if rules.max_health <= 0 {
        return Err(WorldError::InvalidMaxHealth(rules.max_health));
    }
    if rules.hazard_damage < 0 {
        return Err(WorldError::NegativeDamage(rules.hazard_damage));
    }
    for kind in HostileKind::ALL {
        let profile = rules.profile(kind);
        if profile.damage < 0 {
            return Err(WorldError::NegativeDamage(profile.damage));
        }
        if profile.period.is_zero() {
            return Err(WorldError::ZeroPeriod(kind));
        }
    }
    Ok(())
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePlayer { direction } => {
            if !world.intents_enabled {
                trace!(?direction, "move intent ignored while game over is pending");
                return;
            }
            world.move_player(direction, out_events);
            world.settle_outcome(out_events);
        }
        Command::StepHostile { hostile } => world.move_hostile(hostile, out_events),
        Command::ResolveContact { hostile } => world.resolve_contact(hostile, out_events),
        Command::Reset => world.reset(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::sync::Arc;

    use super::World;
    use maze_patrol_core::{
        Grid, HostileId, HostileSnapshot, HostileView, PlayerSnapshot, Position,
    };

    /// Captures the player's position and health.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            health: world.player.health,
            max_health: world.rules.max_health,
        }
    }

    /// Captures a read-only view of the hostiles patrolling the maze.
    #[must_use]
    pub fn hostile_view(world: &World) -> HostileView {
        HostileView::from_snapshots(world.hostiles.iter().map(|hostile| hostile.snapshot()).collect())
    }

    /// Captures a single hostile, if it exists.
    #[must_use]
    pub fn hostile(world: &World, id: HostileId) -> Option<HostileSnapshot> {
        world
            .hostile_index(id)
            .map(|index| world.hostiles[index].snapshot())
    }

    /// Provides shared access to the immutable grid.
    #[must_use]
    pub fn grid(world: &World) -> &Arc<Grid> {
        &world.grid
    }

    /// Cell the player returns to on reset.
    #[must_use]
    pub fn start(world: &World) -> Position {
        world.start
    }

    /// Reports whether a game over awaits acknowledgement, which keeps move
    /// intents disabled.
    #[must_use]
    pub fn awaiting_acknowledgement(world: &World) -> bool {
        !world.intents_enabled
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Position,
    health: i32,
}

impl Player {
    const fn at(position: Position, health: i32) -> Self {
        Self { position, health }
    }

    const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[derive(Clone, Copy, Debug)]
struct Hostile {
    id: HostileId,
    kind: HostileKind,
    spawn: Position,
    position: Position,
    direction: Direction,
    damage: i32,
    period: Duration,
}

impl Hostile {
    fn from_spawn(id: HostileId, kind: HostileKind, spawn: Position, profile: HostileProfile) -> Self {
        Self {
            id,
            kind,
            spawn,
            position: spawn,
            direction: kind.axis().initial_direction(),
            damage: profile.damage,
            period: profile.period,
        }
    }

    fn respawn(&mut self) {
        self.position = self.spawn;
        self.direction = self.kind.axis().initial_direction();
    }

    fn snapshot(&self) -> HostileSnapshot {
        HostileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            direction: self.direction,
            damage: self.damage,
            period: self.period,
        }
    }
}
