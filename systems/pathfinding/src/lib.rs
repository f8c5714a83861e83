#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted grid search shared by every agent that needs a route.
//!
//! Dijkstra and A* run the same relaxation loop over a [`WallGrid`]; the only
//! difference is whether the straight-line distance to the goal is added to
//! the frontier priority. That distance is measured from the neighbour being
//! queued, not from the cell being expanded, so on near-tie mazes the
//! expansion order can differ from a search that scores the parent cell.
//! Diagonal behaviour is selected through one of the [`DiagonalLevel`]
//! presets, which also decides how diagonal steps are filled in with an
//! intermediate corner cell once the route has been found.

use std::{cmp::Ordering, collections::BinaryHeap};

use lantern_core::{
    CellCoord, DiagonalLevel, InvalidDiagonalLevel, SearchConfig, SearchStrategy, WallGrid,
};
use tracing::{debug, trace};

/// Cost of a single north, east, south or west step.
pub const CARDINAL_STEP_WEIGHT: f64 = 1.0;

/// Cost of a single diagonal step.
pub const DIAGONAL_STEP_WEIGHT: f64 = 1.41;

/// Cost of moving between two adjacent cells.
#[must_use]
pub fn step_weight(from: CellCoord, to: CellCoord) -> f64 {
    if from.is_diagonal_to(to) {
        DIAGONAL_STEP_WEIGHT
    } else {
        CARDINAL_STEP_WEIGHT
    }
}

/// Route from the cell after the start through the goal.
///
/// The start cell is never part of the route; the goal always is, unless the
/// start and goal coincide, in which case the route is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Cells of the route in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// First hop of the route.
    #[must_use]
    pub fn first(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Final cell of the route.
    #[must_use]
    pub fn last(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Number of hops in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the route contains no hops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Consecutive `(from, to)` pairs beginning at `start`.
    pub fn steps(&self, start: CellCoord) -> impl Iterator<Item = (CellCoord, CellCoord)> + '_ {
        std::iter::once(start)
            .chain(self.cells.iter().copied())
            .zip(self.cells.iter().copied())
    }

    /// Summed step weight of the route when walked from `start`.
    #[must_use]
    pub fn weight(&self, start: CellCoord) -> f64 {
        self.steps(start).map(|(from, to)| step_weight(from, to)).sum()
    }

    /// Consumes the route, yielding its cells.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Grid search that keeps its scratch buffers between calls.
#[derive(Debug, Default)]
pub struct Pathfinder {
    workspace: SearchWorkspace,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches for a route from `start` to `end`.
    ///
    /// Returns `None` when either endpoint lies outside the grid or when the
    /// frontier empties without reaching `end`.
    pub fn find_path(
        &mut self,
        grid: &WallGrid,
        start: CellCoord,
        end: CellCoord,
        strategy: SearchStrategy,
        level: DiagonalLevel,
    ) -> Option<Path> {
        self.workspace.prepare(grid.cell_count());

        if !grid.in_bounds(start) || !grid.in_bounds(end) {
            debug!(?start, ?end, "path endpoints outside the grid");
            return None;
        }

        let config = level.config();
        let found = self.workspace.search(grid, start, end, strategy, config);
        debug!(
            ?start,
            ?end,
            ?strategy,
            level = level.level(),
            expanded = self.workspace.expanded,
            found,
            "path search finished"
        );

        found.then(|| self.workspace.reconstruct(grid, start, end, config))
    }

    /// Number of cells finalised by the most recent search.
    #[must_use]
    pub fn last_expanded(&self) -> usize {
        self.workspace.expanded
    }
}

/// Searches once with a throwaway [`Pathfinder`], validating the numeric level.
///
/// `use_heuristic` selects A* over Dijkstra. A level outside `0..=3` is
/// reported without running any search.
pub fn find_path(
    grid: &WallGrid,
    start: CellCoord,
    end: CellCoord,
    use_heuristic: bool,
    diagonal_level: u8,
) -> Result<Option<Path>, InvalidDiagonalLevel> {
    let level = DiagonalLevel::try_from(diagonal_level)?;
    Ok(Pathfinder::new().find_path(grid, start, end, SearchStrategy::from(use_heuristic), level))
}

/// A* restricted to cardinal movement.
#[must_use]
pub fn find_path_cardinal(grid: &WallGrid, start: CellCoord, end: CellCoord) -> Option<Path> {
    Pathfinder::new().find_path(
        grid,
        start,
        end,
        SearchStrategy::Euclidean,
        DiagonalLevel::Cardinal,
    )
}

/// A* over diagonals whose result is filled back in to cardinal moves.
#[must_use]
pub fn find_path_fill_diagonal(grid: &WallGrid, start: CellCoord, end: CellCoord) -> Option<Path> {
    Pathfinder::new().find_path(
        grid,
        start,
        end,
        SearchStrategy::Euclidean,
        DiagonalLevel::FillAlways,
    )
}

/// A* over diagonals that only fills in steps which would clip a corner.
#[must_use]
pub fn find_path_with_diagonal(grid: &WallGrid, start: CellCoord, end: CellCoord) -> Option<Path> {
    Pathfinder::new().find_path(
        grid,
        start,
        end,
        SearchStrategy::Euclidean,
        DiagonalLevel::FillCorners,
    )
}

#[derive(Debug, Default)]
struct SearchWorkspace {
    dist: Vec<f64>,
    visited: Vec<bool>,
    previous: Vec<Option<CellCoord>>,
    frontier: BinaryHeap<FrontierEntry>,
    sequence: u64,
    expanded: usize,
}

impl SearchWorkspace {
    fn prepare(&mut self, cell_count: usize) {
        if self.dist.len() != cell_count {
            self.dist = vec![f64::INFINITY; cell_count];
            self.visited = vec![false; cell_count];
            self.previous = vec![None; cell_count];
        } else {
            self.dist.fill(f64::INFINITY);
            self.visited.fill(false);
            self.previous.fill(None);
        }
        self.frontier.clear();
        self.sequence = 0;
        self.expanded = 0;
    }

    fn push(&mut self, cell: CellCoord, priority: f64) {
        self.frontier.push(FrontierEntry {
            priority,
            sequence: self.sequence,
            cell,
        });
        self.sequence += 1;
    }

    fn search(
        &mut self,
        grid: &WallGrid,
        start: CellCoord,
        end: CellCoord,
        strategy: SearchStrategy,
        config: SearchConfig,
    ) -> bool {
        let Some(start_index) = grid.index(start) else {
            return false;
        };
        self.dist[start_index] = 0.0;
        self.push(start, heuristic(strategy, start, end));

        while let Some(entry) = self.frontier.pop() {
            let Some(index) = grid.index(entry.cell) else {
                continue;
            };
            if self.visited[index] {
                continue;
            }
            if entry.cell == end {
                return true;
            }

            self.visited[index] = true;
            self.expanded += 1;
            let base = self.dist[index];

            for neighbor in grid.neighbors(entry.cell, config.allow_diagonal_step()) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                let candidate = base + step_weight(entry.cell, neighbor);
                if candidate >= self.dist[neighbor_index] {
                    continue;
                }

                self.dist[neighbor_index] = candidate;
                self.previous[neighbor_index] = Some(entry.cell);
                if !self.visited[neighbor_index] {
                    self.push(neighbor, candidate + heuristic(strategy, neighbor, end));
                }
            }
        }

        trace!(expanded = self.expanded, "frontier exhausted");
        false
    }

    fn reconstruct(
        &self,
        grid: &WallGrid,
        start: CellCoord,
        end: CellCoord,
        config: SearchConfig,
    ) -> Path {
        let mut cells = Vec::new();
        let mut current = end;

        while current != start {
            let Some(previous) = grid
                .index(current)
                .and_then(|index| self.previous.get(index).copied().flatten())
            else {
                break;
            };

            cells.push(current);
            if config.fill_diagonal_on_cut_only() && previous.is_diagonal_to(current) {
                if let Some(corner) =
                    corner_fill(grid, previous, current, config.fill_diagonal_always())
                {
                    cells.push(corner);
                }
            }
            current = previous;
        }

        cells.reverse();
        Path { cells }
    }
}

/// Intermediate cell replacing the diagonal step `from -> to`, if one is needed.
///
/// Unless `always` is set, a diagonal with both flanking cells open is kept.
/// The flank in the destination's column is preferred when it is open.
fn corner_fill(grid: &WallGrid, from: CellCoord, to: CellCoord, always: bool) -> Option<CellCoord> {
    let along_row = CellCoord::new(to.column(), from.row());
    let along_column = CellCoord::new(from.column(), to.row());
    let row_open = grid.is_open(along_row);

    if !always && row_open && grid.is_open(along_column) {
        return None;
    }

    if row_open {
        Some(along_row)
    } else {
        Some(along_column)
    }
}

fn heuristic(strategy: SearchStrategy, cell: CellCoord, end: CellCoord) -> f64 {
    match strategy {
        SearchStrategy::UniformCost => 0.0,
        SearchStrategy::Euclidean => cell.euclidean_distance(end),
    }
}

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    priority: f64,
    sequence: u64,
    cell: CellCoord,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the lowest priority, earliest entry first.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
