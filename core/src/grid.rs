//! Static occupancy grid shared by the search, beam and stealth systems.

use thiserror::Error;

use crate::CellCoord;

/// Dense wall table stored in row-major order.
///
/// Cells outside the configured dimensions are treated exactly like walls:
/// neither is open, and neither is an error to query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WallGrid {
    columns: u32,
    rows: u32,
    walls: Vec<bool>,
}

/// Reasons a wall table may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The table contained no rows or no columns.
    #[error("wall table must contain at least one row and one column")]
    Empty,
    /// A row length differed from the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// The table dimensions do not fit the coordinate range.
    #[error("wall table dimensions exceed the coordinate range")]
    TooLarge,
}

impl WallGrid {
    /// Creates a grid of the provided dimensions with no walls.
    ///
    /// Fails with [`GridError::TooLarge`] when the table could not be
    /// allocated on this target.
    pub fn open(columns: u32, rows: u32) -> Result<Self, GridError> {
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows))
            .ok()
            .filter(|&count| isize::try_from(count).is_ok())
            .ok_or(GridError::TooLarge)?;
        Ok(Self {
            columns,
            rows,
            walls: vec![false; cell_count],
        })
    }

    /// Builds a grid from nested rows where `true` marks a wall.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut walls = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(GridError::Ragged {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            walls.extend_from_slice(row);
        }

        let columns = u32::try_from(expected).map_err(|_| GridError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;
        Ok(Self {
            columns,
            rows: row_count,
            walls,
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Provides the `(columns, rows)` dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.walls.len()
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell lies within the grid and is not a wall.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index))
            .is_some_and(|wall| !wall)
    }

    /// Marks or clears a wall. Cells outside the grid are ignored.
    pub fn set_wall(&mut self, cell: CellCoord, wall: bool) {
        if let Some(slot) = self.index(cell).and_then(|index| self.walls.get_mut(index)) {
            *slot = wall;
        }
    }

    /// Copy of the grid with every provided cell marked as a wall.
    #[must_use]
    pub fn with_blocked<I>(&self, cells: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut blocked = self.clone();
        for cell in cells {
            blocked.set_wall(cell, true);
        }
        blocked
    }

    /// Dense row-major index of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterator over every cell coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| CellCoord::new(column, row))
        })
    }

    /// Iterator over the wall cells in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells().filter(move |cell| !self.is_open(*cell))
    }

    /// Open neighbours of `cell`.
    ///
    /// Cardinal neighbours come first in west, north, east, south order. When
    /// `allow_diagonal` is set the open diagonals follow in north-west,
    /// north-east, south-west, south-east order, each emitted only if at least
    /// one of its two flanking cardinal cells is open.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord, allow_diagonal: bool) -> Neighbors {
        let mut neighbors = Neighbors::default();
        let open = |column_delta: i32, row_delta: i32| {
            cell.offset(column_delta, row_delta)
                .filter(|candidate| self.is_open(*candidate))
        };

        let west = open(-1, 0);
        let north = open(0, -1);
        let east = open(1, 0);
        let south = open(0, 1);

        for candidate in [west, north, east, south].into_iter().flatten() {
            neighbors.push(candidate);
        }

        if !allow_diagonal {
            return neighbors;
        }

        let diagonals = [
            (-1, -1, west, north),
            (1, -1, east, north),
            (-1, 1, west, south),
            (1, 1, east, south),
        ];
        for (column_delta, row_delta, horizontal, vertical) in diagonals {
            if horizontal.is_none() && vertical.is_none() {
                continue;
            }
            if let Some(candidate) = open(column_delta, row_delta) {
                neighbors.push(candidate);
            }
        }

        neighbors
    }
}

/// Fixed-capacity iterator over the open neighbours of a cell.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 8],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}
