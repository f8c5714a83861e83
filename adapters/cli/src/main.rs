#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Lantern level.

mod maze;
mod script;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use lantern_core::{CellCoord, SessionStatus};
use lantern_system_session::{Session, SimulationConfig};
use lantern_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::maze::{MazeLayout, DEMO_MAZE};

/// Plays a maze with a scripted sequence of player moves.
#[derive(Debug, Parser)]
#[command(name = "lantern", version, about)]
struct CliArgs {
    /// TOML file with simulation settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// ASCII maze to play instead of the built-in demo.
    #[arg(long, value_name = "PATH")]
    maze: Option<PathBuf>,
    /// Moves to play: w/a/s/d step, i/j/k/l turn, '.' waits.
    #[arg(long, default_value = "")]
    moves: String,
    /// Print the final state as JSON instead of a map.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Lantern command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;
    let MazeLayout {
        walls,
        player,
        facing,
        exit,
        agents,
    } = load_maze(args.maze.as_deref())?;
    let inputs = script::parse_moves(&args.moves).context("failed to parse move script")?;

    let mut session = Session::new(config).context("invalid simulation config")?;
    let _ = session.configure(walls, player, facing, exit);
    for cell in agents {
        if let Err(reason) = session.spawn(cell) {
            warn!(?cell, %reason, "skipping agent");
        }
    }

    for input in inputs {
        let report = session.tick(input);
        if report.status != SessionStatus::Sneaking {
            break;
        }
    }
    info!(ticks = query::tick_index(session.world()), "script finished");

    if args.json {
        let summary = serde_json::to_string_pretty(&session.summary())
            .context("failed to serialise session summary")?;
        println!("{summary}");
    } else {
        print!("{}", render(&session));
        println!("{}", describe(session.status()));
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    SimulationConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config file {}", path.display()))
}

fn load_maze(path: Option<&Path>) -> Result<MazeLayout> {
    let Some(path) = path else {
        return MazeLayout::parse(DEMO_MAZE).context("failed to parse demo maze");
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read maze file {}", path.display()))?;
    MazeLayout::parse(&contents)
        .with_context(|| format!("failed to parse maze file {}", path.display()))
}

fn render(session: &Session) -> String {
    let world = session.world();
    let walls = query::walls(world);
    let lights = query::lights(world);
    let agents = query::agent_view(world);
    let player = query::player_cell(world);
    let exit = query::exit(world);

    let mut map = String::new();
    for row in 0..walls.rows() {
        for column in 0..walls.columns() {
            let cell = CellCoord::new(column, row);
            let tile = if cell == player {
                '@'
            } else if agents.iter().any(|agent| agent.cell == cell) {
                'A'
            } else if !walls.is_open(cell) {
                '#'
            } else if Some(cell) == exit {
                'E'
            } else if lights.current().contains(cell) {
                '*'
            } else {
                '.'
            };
            map.push(tile);
        }
        map.push('\n');
    }
    map
}

fn describe(status: SessionStatus) -> String {
    match status {
        SessionStatus::Sneaking => "still sneaking".to_owned(),
        SessionStatus::Caught { agent } => format!("caught by agent {}", agent.get()),
        SessionStatus::Escaped => "escaped".to_owned(),
    }
}
