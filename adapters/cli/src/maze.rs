use std::{error::Error, fmt};

use lantern_core::{CellCoord, Direction, GridError, WallGrid};

/// Maze played when no maze file is provided.
pub(crate) const DEMO_MAZE: &str = "\
############
#P.....#...#
#.##.#.#.#.#
#....#...#A#
###.####.#.#
#A..#....#.#
#.#.#.##.#.#
#.#...#A...#
#.#####.####
#.........E#
############
";

const WALL: char = '#';
const FLOOR: char = '.';
const PLAYER: char = 'P';
const EXIT: char = 'E';
const AGENT: char = 'A';

/// Level described by an ASCII maze.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MazeLayout {
    /// Static wall table of the maze.
    pub(crate) walls: WallGrid,
    /// Cell the player starts in.
    pub(crate) player: CellCoord,
    /// Initial facing of the player.
    pub(crate) facing: Direction,
    /// Cell that completes the level, if any.
    pub(crate) exit: Option<CellCoord>,
    /// Agent spawn cells in reading order.
    pub(crate) agents: Vec<CellCoord>,
}

impl MazeLayout {
    /// Parses a maze where `#` is a wall, `.` is floor, `P` is the player,
    /// `E` is the exit and `A` is an agent. Blank lines are ignored.
    pub(crate) fn parse(text: &str) -> Result<Self, MazeError> {
        let mut table = Vec::new();
        let mut player = None;
        let mut exit = None;
        let mut agents = Vec::new();

        let rows = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty());
        for (row, line) in rows.enumerate() {
            let mut walls = Vec::with_capacity(line.len());
            for (column, tile) in line.chars().enumerate() {
                let cell = cell_at(column, row)?;
                match tile {
                    WALL => walls.push(true),
                    FLOOR => walls.push(false),
                    PLAYER => {
                        if player.replace(cell).is_some() {
                            return Err(MazeError::DuplicatePlayer);
                        }
                        walls.push(false);
                    }
                    EXIT => {
                        if exit.replace(cell).is_some() {
                            return Err(MazeError::DuplicateExit);
                        }
                        walls.push(false);
                    }
                    AGENT => {
                        agents.push(cell);
                        walls.push(false);
                    }
                    other => {
                        return Err(MazeError::UnknownTile {
                            tile: other,
                            column,
                            row,
                        });
                    }
                }
            }
            table.push(walls);
        }

        let walls = WallGrid::from_rows(&table).map_err(MazeError::InvalidGrid)?;
        let player = player.ok_or(MazeError::MissingPlayer)?;

        Ok(Self {
            walls,
            player,
            facing: Direction::East,
            exit,
            agents,
        })
    }
}

fn cell_at(column: usize, row: usize) -> Result<CellCoord, MazeError> {
    let column = u32::try_from(column).map_err(|_| MazeError::InvalidGrid(GridError::TooLarge))?;
    let row = u32::try_from(row).map_err(|_| MazeError::InvalidGrid(GridError::TooLarge))?;
    Ok(CellCoord::new(column, row))
}

/// Errors that can occur while parsing an ASCII maze.
#[derive(Debug, PartialEq)]
pub(crate) enum MazeError {
    /// A character other than the known tiles was found.
    UnknownTile {
        /// Offending character.
        tile: char,
        /// Column of the character.
        column: usize,
        /// Row of the character.
        row: usize,
    },
    /// The maze has no player tile.
    MissingPlayer,
    /// The maze has more than one player tile.
    DuplicatePlayer,
    /// The maze has more than one exit tile.
    DuplicateExit,
    /// The rows do not form a usable grid.
    InvalidGrid(GridError),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTile { tile, column, row } => {
                write!(f, "unknown tile '{tile}' at column {column}, row {row}")
            }
            Self::MissingPlayer => write!(f, "maze does not contain a player tile"),
            Self::DuplicatePlayer => write!(f, "maze contains more than one player tile"),
            Self::DuplicateExit => write!(f, "maze contains more than one exit tile"),
            Self::InvalidGrid(error) => write!(f, "maze rows do not form a grid: {error}"),
        }
    }
}

impl Error for MazeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidGrid(error) => Some(error),
            _ => None,
        }
    }
}
