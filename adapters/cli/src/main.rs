#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Maze Patrol in a terminal.

mod map_file;
mod rules_file;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{anyhow, Context, Result as AnyResult};
use clap::Parser;
use maze_patrol_core::{Direction, Rules};
use maze_patrol_rendering::{Presenter, TextBoard};
use maze_patrol_system_patrol::Notifier;
use maze_patrol_system_session::Session;
use maze_patrol_world::World;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the Maze Patrol terminal game.
#[derive(Debug, Parser)]
#[command(
    name = "maze-patrol",
    about = "Walk the maze to the exit while spiders and flies patrol it.",
    after_help = "Controls: w/a/s/d or up/left/down/right then Enter to move, q to quit.\n\
                  After a game over any line starts the next round."
)]
struct CliArgs {
    /// Map text file to play. A built-in maze is used when omitted.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,
    /// TOML file overriding health, hazard damage and hostile profiles.
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    log_level: String,
}

/// One line of terminal input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Intent {
    Move(Direction),
    Quit,
}

/// Entry point for the Maze Patrol command-line interface.
fn main() -> AnyResult<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level);

    let grid = match &args.map {
        Some(path) => map_file::load_map(path)?,
        None => map_file::parse_map(map_file::DEMO_MAP).context("built-in map is invalid")?,
    };
    let rules = match &args.rules {
        Some(path) => rules_file::load_rules(path)?,
        None => Rules::default(),
    };

    let world = World::new(Arc::new(grid), rules).context("failed to build the maze")?;

    // The channel buffers the first frame until the presenter is running.
    let (notifier, receiver) = Notifier::channel();
    let session = Session::start(world, notifier).context("failed to start the session")?;

    let grid = Arc::clone(session.grid());
    let presenter = thread::Builder::new()
        .name("presenter".to_owned())
        .spawn(move || {
            let mut board = TextBoard::new(grid, io::stdout()).clearing();
            Presenter::new(receiver).run(&mut board)
        })
        .context("failed to start the presenter thread")?;

    let played = play(&session, io::stdin().lock());

    // Shutting down drops the last notifier, which lets the presenter finish.
    session.shutdown();
    let frames = presenter
        .join()
        .map_err(|_| anyhow!("presenter thread panicked"))?;
    info!(frames, "presenter finished");

    played
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Feeds input lines to the session until `q` or end of input.
fn play<R: BufRead>(session: &Session, input: R) -> AnyResult<()> {
    for line in input.lines() {
        let line = line.context("failed to read terminal input")?;
        match parse_intent(&line) {
            Some(Intent::Quit) => break,
            // While a game over is pending, any other line starts the next round.
            _ if session.acknowledge_game_over() => debug!("game over acknowledged"),
            Some(Intent::Move(direction)) => {
                let _ = session.request_move(direction);
            }
            None => debug!(input = line.trim(), "ignoring unrecognised input"),
        }
    }
    Ok(())
}

fn parse_intent(line: &str) -> Option<Intent> {
    let intent = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => Intent::Move(Direction::Up),
        "a" | "left" => Intent::Move(Direction::Left),
        "s" | "down" => Intent::Move(Direction::Down),
        "d" | "right" => Intent::Move(Direction::Right),
        "q" | "quit" => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}
