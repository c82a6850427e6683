use std::{io::Write, sync::Arc};

use anyhow::{Context, Result as AnyResult};
use maze_patrol_core::{GameOutcome, Grid, HostileSnapshot, PlayerSnapshot};
use tracing::{trace, warn};

use crate::{Renderer, Scene};

/// ANSI sequence that clears the terminal and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renderer that redraws the whole [`Scene`] as text after every change.
#[derive(Debug)]
pub struct TextBoard<W> {
    scene: Scene,
    out: W,
    clear_screen: bool,
    frames: u64,
}

impl<W: Write> TextBoard<W> {
    /// Creates a board over `grid` that appends frames to `out`.
    #[must_use]
    pub fn new(grid: Arc<Grid>, out: W) -> Self {
        Self {
            scene: Scene::new(grid),
            out,
            clear_screen: false,
            frames: 0,
        }
    }

    /// Clears the terminal before each frame instead of appending.
    #[must_use]
    pub fn clearing(mut self) -> Self {
        self.clear_screen = true;
        self
    }

    /// Scene currently on display.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of frames written successfully.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Consumes the board, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self) {
        match self.draw() {
            Ok(()) => {
                self.frames += 1;
                trace!(frame = self.frames, "frame drawn");
            }
            Err(error) => warn!("skipping frame: {error:#}"),
        }
    }

    fn draw(&mut self) -> AnyResult<()> {
        let mut frame = String::new();
        if self.clear_screen {
            frame.push_str(CLEAR_SCREEN);
        }
        for line in self.scene.lines() {
            frame.push_str(&line);
            frame.push('\n');
        }
        frame.push('\n');

        self.out
            .write_all(frame.as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}

impl<W: Write> Renderer for TextBoard<W> {
    fn on_hostiles_changed(&mut self, hostiles: &[HostileSnapshot]) {
        self.scene.set_hostiles(hostiles);
        self.redraw();
    }

    fn on_player_changed(&mut self, player: PlayerSnapshot) {
        self.scene.set_player(player);
        self.redraw();
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        self.scene.set_outcome(outcome);
        self.redraw();
    }
}
