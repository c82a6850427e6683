#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Patrol engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the patrol threads. Callers submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point and reports [`Event`] values describing what
//! changed. Events are then translated into [`Notification`] values that the
//! presentation context consumes to redraw.

mod grid;
mod rules;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use grid::{CellKind, Grid, GridError};
pub use rules::{HostileProfile, Rules, DEFAULT_HAZARD_DAMAGE, DEFAULT_MAX_HEALTH};

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player advance a single cell in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Requests that a hostile advance along its patrol or turn around.
    StepHostile {
        /// Identifier of the hostile attempting to move.
        hostile: HostileId,
    },
    /// Requests that contact between the player and a hostile be resolved.
    ///
    /// Damage is applied only when the player is alive and the named hostile
    /// is the first one found on the player's cell.
    ResolveContact {
        /// Identifier of the hostile that just completed a tick.
        hostile: HostileId,
    },
    /// Restores the player and hostiles to their starting state.
    Reset,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after the move.
        to: Position,
    },
    /// Reports that the player lost health.
    PlayerDamaged {
        /// Amount of health subtracted.
        amount: i32,
        /// Health remaining after the damage was applied.
        health: i32,
        /// What caused the damage.
        source: DamageSource,
    },
    /// Confirms that a hostile advanced one cell along its axis.
    HostileAdvanced {
        /// Identifier of the hostile that advanced.
        hostile: HostileId,
        /// Cell the hostile occupied before moving.
        from: Position,
        /// Cell the hostile occupies after moving.
        to: Position,
    },
    /// Reports that a blocked hostile reversed its direction without moving.
    HostileTurned {
        /// Identifier of the hostile that turned around.
        hostile: HostileId,
        /// Direction the hostile will attempt on its next tick.
        direction: Direction,
    },
    /// Announces that the round ended. Move intents stay disabled until reset.
    GameOver {
        /// How the round ended.
        outcome: GameOutcome,
    },
    /// Confirms that the world returned to its starting state.
    GameReset,
}

/// Push messages delivered to the presentation context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Hostile positions changed; carries a consistent snapshot of all hostiles.
    HostilesChanged {
        /// Every hostile in the world, ordered by identifier.
        hostiles: Vec<HostileSnapshot>,
    },
    /// Player position or health changed.
    PlayerChanged {
        /// Snapshot of the player after the change.
        player: PlayerSnapshot,
    },
    /// The round ended and the renderer should present a notice.
    GameOver {
        /// How the round ended.
        outcome: GameOutcome,
    },
}

/// Cause of a [`Event::PlayerDamaged`] event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// The player stepped onto a hazard cell.
    Hazard,
    /// The player shares a cell with the identified hostile.
    Hostile(HostileId),
}

/// Terminal state of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The player reached the exit.
    Won,
    /// The player ran out of health.
    Died,
}

impl GameOutcome {
    /// Headline shown when the round ends.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Won => "YOU WON",
            Self::Died => "YOU DIED",
        }
    }

    /// Longer message shown beneath the headline.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Won => "Congratulations for reaching the end!",
            Self::Died => "Oh, no! You ran out of HP!",
        }
    }
}

/// Cardinal movement directions available to every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit offset applied to `(x, y)` when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction pointing the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }
}

/// Axis a hostile is confined to while patrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Left and right only.
    Horizontal,
    /// Up and down only.
    Vertical,
}

impl Axis {
    /// Direction a freshly spawned hostile on this axis attempts first.
    #[must_use]
    pub const fn initial_direction(self) -> Direction {
        match self {
            Self::Horizontal => Direction::Left,
            Self::Vertical => Direction::Up,
        }
    }

    /// Flips `direction` to the other pole of this axis.
    ///
    /// A direction that does not belong to the axis is replaced with the
    /// axis' initial direction, so the result always lies on the axis.
    #[must_use]
    pub const fn toggle(self, direction: Direction) -> Direction {
        match (self, direction) {
            (Self::Horizontal, Direction::Left) => Direction::Right,
            (Self::Horizontal, _) => Direction::Left,
            (Self::Vertical, Direction::Up) => Direction::Down,
            (Self::Vertical, _) => Direction::Up,
        }
    }
}

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Adjacent position in `direction`, or `None` when it would fall below zero.
    ///
    /// The upper bound is not checked here; only the grid knows its extents.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self::new(x, y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to a hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostileId(u32);

impl HostileId {
    /// Creates a new hostile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for HostileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of hostile that patrol the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostileKind {
    /// Crawls left and right.
    Spider,
    /// Buzzes up and down.
    Fly,
}

impl HostileKind {
    /// Every hostile kind, in the order hostiles are created.
    pub const ALL: [Self; 2] = [Self::Spider, Self::Fly];

    /// Axis this kind patrols along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Spider => Axis::Horizontal,
            Self::Fly => Axis::Vertical,
        }
    }

    /// Map marker that spawns this kind.
    #[must_use]
    pub const fn spawn_cell(self) -> CellKind {
        match self {
            Self::Spider => CellKind::SpiderSpawn,
            Self::Fly => CellKind::FlySpawn,
        }
    }
}

/// Immutable representation of the player used for queries and redraws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Cell currently occupied by the player.
    pub position: Position,
    /// Current health. May be zero or negative once the player died.
    pub health: i32,
    /// Health restored on reset.
    pub max_health: i32,
}

impl PlayerSnapshot {
    /// Reports whether the captured player was alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Immutable representation of a single hostile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostileSnapshot {
    /// Unique identifier assigned to the hostile.
    pub id: HostileId,
    /// Kind tag consulted by renderers.
    pub kind: HostileKind,
    /// Grid cell currently occupied by the hostile.
    pub position: Position,
    /// Direction the hostile will attempt on its next tick.
    pub direction: Direction,
    /// Damage dealt on contact.
    pub damage: i32,
    /// Delay between two ticks of this hostile.
    pub period: Duration,
}

/// Read-only snapshot describing all hostiles within the maze.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostileView {
    snapshots: Vec<HostileSnapshot>,
}

impl HostileView {
    /// Creates a new hostile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HostileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &HostileSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single hostile.
    #[must_use]
    pub fn get(&self, id: HostileId) -> Option<&HostileSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured hostiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no hostiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HostileSnapshot> {
        self.snapshots
    }
}
