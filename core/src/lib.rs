#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lantern stealth engine.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

pub mod grid;

use std::collections::{btree_set, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{GridError, Neighbors, WallGrid};

/// Cardinal directions used for facing, beams and player steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit step expressed as `(column, row)` deltas.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Facing an agent adopts when hopping from `from` to `to`.
    ///
    /// Horizontal motion wins over vertical motion when both axes change.
    /// Returns `None` when the cells coincide.
    #[must_use]
    pub fn toward(from: CellCoord, to: CellCoord) -> Option<Self> {
        if to.column() > from.column() {
            Some(Self::East)
        } else if to.column() < from.column() {
            Some(Self::West)
        } else if to.row() > from.row() {
            Some(Self::South)
        } else if to.row() < from.row() {
            Some(Self::North)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to an agent at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
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

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell displaced by the provided signed deltas, if it remains non-negative.
    #[must_use]
    pub fn offset(self, column_delta: i32, row_delta: i32) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(CellCoord::new(column, row))
    }

    /// Neighbouring cell one step away in `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (column_delta, row_delta) = direction.offset();
        self.offset(column_delta, row_delta)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Straight-line distance between two cell centres.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f64 {
        let dx = f64::from(self.column().abs_diff(other.column()));
        let dy = f64::from(self.row().abs_diff(other.row()));
        dx.hypot(dy)
    }

    /// Reports whether both axes differ, i.e. the step between the cells is diagonal.
    #[must_use]
    pub fn is_diagonal_to(self, other: CellCoord) -> bool {
        self.column != other.column && self.row != other.row
    }

    /// Reports whether the cells touch by edge or corner without coinciding.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self != other
            && self.column.abs_diff(other.column) <= 1
            && self.row.abs_diff(other.row) <= 1
    }
}

/// Search configuration fixed by one of the [`DiagonalLevel`] presets.
///
/// No custom combination can be constructed; callers pick a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchConfig {
    allow_diagonal_step: bool,
    fill_diagonal_on_cut_only: bool,
    fill_diagonal_always: bool,
}

impl SearchConfig {
    /// Whether the search graph contains diagonal edges.
    #[must_use]
    pub const fn allow_diagonal_step(&self) -> bool {
        self.allow_diagonal_step
    }

    /// Whether diagonal steps that would clip a corner are filled in.
    #[must_use]
    pub const fn fill_diagonal_on_cut_only(&self) -> bool {
        self.fill_diagonal_on_cut_only
    }

    /// Whether every diagonal step is filled in, leaving only cardinal moves.
    #[must_use]
    pub const fn fill_diagonal_always(&self) -> bool {
        self.fill_diagonal_always
    }
}

/// Diagonal-acceptance presets understood by the pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagonalLevel {
    /// Level 0: cardinal movement only.
    Cardinal,
    /// Level 1: diagonal search, every diagonal step filled with a corner cell.
    FillAlways,
    /// Level 2: diagonal search, diagonals filled only where a corner would be cut.
    FillCorners,
    /// Level 3: diagonal search, diagonals left untouched.
    Unfilled,
}

impl DiagonalLevel {
    /// Numeric level as accepted by [`TryFrom<u8>`].
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Cardinal => 0,
            Self::FillAlways => 1,
            Self::FillCorners => 2,
            Self::Unfilled => 3,
        }
    }

    /// Search booleans fixed by the preset.
    #[must_use]
    pub const fn config(self) -> SearchConfig {
        let (allow_diagonal_step, fill_diagonal_on_cut_only, fill_diagonal_always) = match self {
            Self::Cardinal => (false, false, false),
            Self::FillAlways => (true, true, true),
            Self::FillCorners => (true, true, false),
            Self::Unfilled => (true, false, false),
        };
        SearchConfig {
            allow_diagonal_step,
            fill_diagonal_on_cut_only,
            fill_diagonal_always,
        }
    }
}

impl TryFrom<u8> for DiagonalLevel {
    type Error = InvalidDiagonalLevel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Cardinal),
            1 => Ok(Self::FillAlways),
            2 => Ok(Self::FillCorners),
            3 => Ok(Self::Unfilled),
            other => Err(InvalidDiagonalLevel(other)),
        }
    }
}

/// Rejected diagonal-acceptance level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("diagonal level must be between 0 and 3, got {0}")]
pub struct InvalidDiagonalLevel(u8);

impl InvalidDiagonalLevel {
    /// Level that was supplied by the caller.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.0
    }
}

/// Frontier ordering used by the pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Dijkstra: order by accumulated cost only.
    UniformCost,
    /// A*: order by accumulated cost plus straight-line distance to the goal.
    Euclidean,
}

impl From<bool> for SearchStrategy {
    fn from(use_heuristic: bool) -> Self {
        if use_heuristic {
            Self::Euclidean
        } else {
            Self::UniformCost
        }
    }
}

/// Ordered set of illuminated cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LitSet {
    cells: BTreeSet<CellCoord>,
}

impl LitSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether `cell` is illuminated.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Marks `cell` as illuminated, returning whether it was newly added.
    pub fn insert(&mut self, cell: CellCoord) -> bool {
        self.cells.insert(cell)
    }

    /// Removes every cell while keeping the set itself.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of illuminated cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is illuminated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the illuminated cells in coordinate order.
    pub fn iter(&self) -> btree_set::Iter<'_, CellCoord> {
        self.cells.iter()
    }
}

impl Extend<CellCoord> for LitSet {
    fn extend<I: IntoIterator<Item = CellCoord>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

impl FromIterator<CellCoord> for LitSet {
    fn from_iter<I: IntoIterator<Item = CellCoord>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LitSet {
    type Item = &'a CellCoord;
    type IntoIter = btree_set::Iter<'a, CellCoord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Player intent captured by the input layer for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayerInput {
    /// Facing the player is aiming toward, if any.
    pub turn: Option<Direction>,
    /// Direction of the step the player attempts, if any.
    pub step: Option<Direction>,
}

impl PlayerInput {
    /// Input that neither turns nor steps.
    #[must_use]
    pub const fn wait() -> Self {
        Self {
            turn: None,
            step: None,
        }
    }

    /// Input that only turns the player.
    #[must_use]
    pub const fn turn(direction: Direction) -> Self {
        Self {
            turn: Some(direction),
            step: None,
        }
    }

    /// Input that only steps the player.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Self {
            turn: None,
            step: Some(direction),
        }
    }
}

/// Progress of the current level from the core's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SessionStatus {
    /// The player is still sneaking through the maze.
    Sneaking,
    /// An agent reached the player's cell.
    Caught {
        /// Agent that reached the player.
        agent: AgentId,
    },
    /// The player reached the exit without being caught.
    Escaped,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the level layout and resets every piece of dynamic state.
    ConfigureLevel {
        /// Static wall table of the level.
        walls: WallGrid,
        /// Cell the player starts in.
        player: CellCoord,
        /// Initial facing of the player's beam.
        facing: Direction,
        /// Cell that completes the level when the player reaches it.
        exit: Option<CellCoord>,
    },
    /// Registers a new agent at the provided cell.
    SpawnAgent {
        /// Cell the agent starts in.
        cell: CellCoord,
    },
    /// Marks an agent as frozen (or releases it) on behalf of the presentation layer.
    SetAgentFrozen {
        /// Agent whose flag changes.
        agent: AgentId,
        /// Whether the agent must stay put regardless of light.
        frozen: bool,
    },
    /// Advances the simulation by one tick using the provided player input.
    Tick {
        /// Turn and step requested by the player.
        input: PlayerInput,
    },
    /// Requests that an agent hop into an adjacent cell.
    StepAgent {
        /// Identifier of the agent attempting to move.
        agent: AgentId,
        /// Destination cell of the hop.
        to: CellCoord,
    },
    /// Resolves capture and exit conditions once every agent has acted.
    ResolveTick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new level layout became active.
    LevelConfigured {
        /// Number of columns in the wall grid.
        columns: u32,
        /// Number of rows in the wall grid.
        rows: u32,
    },
    /// Confirms that an agent was registered.
    AgentSpawned {
        /// Identifier assigned to the agent.
        agent: AgentId,
        /// Cell the agent occupies.
        cell: CellCoord,
    },
    /// Reports that an agent registration was rejected.
    AgentSpawnRejected {
        /// Requested spawn cell.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that the frozen flag of an agent changed.
    AgentFrozenChanged {
        /// Agent whose flag changed.
        agent: AgentId,
        /// New value of the flag.
        frozen: bool,
    },
    /// Indicates that a tick began.
    TickStarted {
        /// Index of the tick, starting at one.
        tick: u64,
    },
    /// Confirms that the player changed facing.
    PlayerTurned {
        /// New facing of the player.
        facing: Direction,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that a requested player step could not be taken.
    PlayerStepRejected {
        /// Direction of the rejected step.
        direction: Direction,
        /// Specific reason the step failed.
        reason: PlayerStepRejection,
    },
    /// Reports a fresh computation of the current light.
    LightRecomputed {
        /// Number of illuminated cells.
        lit: usize,
    },
    /// Signals that the player's part of the tick finished and agents may act.
    TurnResolved {
        /// Index of the tick being resolved.
        tick: u64,
        /// Whether the player changed cells during the tick.
        player_moved: bool,
    },
    /// Confirms that an agent hopped between two cells.
    AgentAdvanced {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after moving.
        to: CellCoord,
    },
    /// Reports that an agent hop was rejected by the world.
    AgentStepRejected {
        /// Identifier of the agent.
        agent: AgentId,
        /// Requested destination.
        to: CellCoord,
        /// Specific reason the hop failed.
        reason: StepRejection,
    },
    /// Announces that an agent reached the player's cell.
    PlayerCaught {
        /// Agent standing on the player's cell.
        agent: AgentId,
    },
    /// Announces that the player reached the exit.
    ExitReached,
}

/// Reasons an agent registration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SpawnError {
    /// The requested cell is a wall or lies outside the grid.
    #[error("spawn cell is not open")]
    Blocked,
    /// The requested cell hosts the player.
    #[error("spawn cell hosts the player")]
    PlayerCell,
    /// Another agent already stands on the requested cell.
    #[error("spawn cell hosts another agent")]
    Occupied,
}

/// Reasons an agent hop may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum StepRejection {
    /// No agent with the provided identifier exists.
    #[error("unknown agent")]
    UnknownAgent,
    /// The destination does not touch the agent's cell.
    #[error("destination is not adjacent")]
    NotAdjacent,
    /// The destination is a wall or lies outside the grid.
    #[error("destination is not open")]
    Blocked,
    /// Another agent already stands on the destination.
    #[error("destination hosts another agent")]
    Occupied,
    /// The level already ended.
    #[error("level is no longer in progress")]
    LevelOver,
}

/// Reasons a player step may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PlayerStepRejection {
    /// The player turned this tick, which locks out stepping.
    #[error("player turned this tick")]
    TurnedThisTick,
    /// The destination is a wall or lies outside the grid.
    #[error("destination is not open")]
    Blocked,
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Grid cell currently occupied by the agent.
    pub cell: CellCoord,
    /// Direction the agent last hopped toward.
    pub facing: Direction,
    /// Whether the presentation layer froze the agent for this tick.
    pub frozen: bool,
}

/// Read-only snapshot describing all agents in registration order.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from snapshots already in registration order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<AgentSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}
