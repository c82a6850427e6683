use std::sync::Arc;

use maze_patrol_core::{
    CellKind, GameOutcome, Grid, HostileKind, HostileSnapshot, PlayerSnapshot, Position,
};

/// Number of segments drawn in the health bar.
const HEALTH_BAR_WIDTH: i64 = 10;

/// Immutable drawable snapshot of everything a frame shows.
///
/// The scene only ever holds snapshots delivered by notifications, so a frame
/// never mixes half-applied moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    grid: Arc<Grid>,
    player: Option<PlayerSnapshot>,
    hostiles: Vec<HostileSnapshot>,
    outcome: Option<GameOutcome>,
}

impl Scene {
    /// Creates an empty scene over the provided maze.
    #[must_use]
    pub fn new(grid: Arc<Grid>) -> Self {
        Self {
            grid,
            player: None,
            hostiles: Vec::new(),
            outcome: None,
        }
    }

    /// Replaces the player snapshot.
    ///
    /// A living player away from the exit means a new round has begun, which
    /// dismisses any pending game-over notice.
    pub fn set_player(&mut self, player: PlayerSnapshot) {
        let on_exit = matches!(self.grid.cell_at(player.position), Ok(CellKind::End));
        if player.is_alive() && !on_exit {
            self.outcome = None;
        }
        self.player = Some(player);
    }

    /// Replaces every hostile snapshot.
    pub fn set_hostiles(&mut self, hostiles: &[HostileSnapshot]) {
        self.hostiles.clear();
        self.hostiles.extend_from_slice(hostiles);
    }

    /// Records the outcome of the finished round.
    pub fn set_outcome(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
    }

    /// Last player snapshot received, if any.
    #[must_use]
    pub const fn player(&self) -> Option<PlayerSnapshot> {
        self.player
    }

    /// Last hostile snapshots received.
    #[must_use]
    pub fn hostiles(&self) -> &[HostileSnapshot] {
        &self.hostiles
    }

    /// Outcome awaiting acknowledgement, if any.
    #[must_use]
    pub const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Renders the maze as one string per grid row.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        self.grid
            .rows()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, kind)| {
                        // Dimensions always fit in u32, see `Grid::new`.
                        let position = Position::new(x as u32, y as u32);
                        self.glyph_at(position, *kind)
                    })
                    .collect()
            })
            .collect()
    }

    /// Renders the health bar, e.g. `HP [#####-----] 5/10`.
    #[must_use]
    pub fn health_bar(&self) -> Option<String> {
        let player = self.player?;
        let max = i64::from(player.max_health.max(1));
        let filled = i64::from(player.health).clamp(0, max) * HEALTH_BAR_WIDTH / max;
        let bar: String = (0..HEALTH_BAR_WIDTH)
            .map(|segment| if segment < filled { '#' } else { '-' })
            .collect();
        Some(format!("HP [{bar}] {}/{}", player.health.max(0), player.max_health))
    }

    /// Lines of the game-over notice, empty while the round is running.
    #[must_use]
    pub fn notice(&self) -> Vec<String> {
        self.outcome
            .map(|outcome| {
                vec![
                    outcome.title().to_owned(),
                    outcome.message().to_owned(),
                    "Press Enter to play again.".to_owned(),
                ]
            })
            .unwrap_or_default()
    }

    /// Every line of the frame: board, health bar and notice.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.rows();
        lines.extend(self.health_bar());
        lines.extend(self.notice());
        lines
    }

    fn glyph_at(&self, position: Position, kind: CellKind) -> char {
        if self.player.map(|player| player.position) == Some(position) {
            return '@';
        }
        if let Some(hostile) = self
            .hostiles
            .iter()
            .find(|hostile| hostile.position == position)
        {
            return hostile_glyph(hostile.kind);
        }
        cell_glyph(kind)
    }
}

const fn hostile_glyph(kind: HostileKind) -> char {
    match kind {
        HostileKind::Spider => 's',
        HostileKind::Fly => 'f',
    }
}

const fn cell_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Wall => '#',
        CellKind::Start => 'S',
        CellKind::End => 'E',
        CellKind::Hazard => '^',
        CellKind::Empty | CellKind::SpiderSpawn | CellKind::FlySpawn => '.',
    }
}
