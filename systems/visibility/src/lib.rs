#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Directional light beam cast from the player and the two-tick light history.

use std::mem;

use lantern_core::{CellCoord, Direction, LitSet, WallGrid};
use tracing::debug;

/// Number of cells the player's beam reaches when nothing blocks it.
pub const DEFAULT_BEAM_LENGTH: u32 = 5;

/// Open cells reached by a straight beam from `origin` toward `direction`.
///
/// The origin itself is never included. The beam stops before the first wall
/// or off-map cell, so the returned cells are nearest first and contiguous.
#[must_use]
pub fn cast_beam(
    grid: &WallGrid,
    origin: CellCoord,
    direction: Direction,
    length: u32,
) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    let mut cursor = origin;

    for _ in 0..length {
        match cursor.step(direction) {
            Some(next) if grid.is_open(next) => {
                cells.push(next);
                cursor = next;
            }
            _ => break,
        }
    }

    cells
}

/// Beam emitted from the player's cell along the player's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityBeam {
    length: u32,
}

impl VisibilityBeam {
    /// Creates a beam reaching at most `length` cells.
    #[must_use]
    pub const fn new(length: u32) -> Self {
        Self { length }
    }

    /// Maximum number of cells the beam reaches.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Adds every cell the beam reaches to `out`.
    pub fn illuminate(
        &self,
        grid: &WallGrid,
        origin: CellCoord,
        facing: Direction,
        out: &mut LitSet,
    ) {
        out.extend(cast_beam(grid, origin, facing, self.length));
    }
}

impl Default for VisibilityBeam {
    fn default() -> Self {
        Self::new(DEFAULT_BEAM_LENGTH)
    }
}

/// Light of the current tick together with the light of the previous one.
///
/// Agents may not step into either set, so a beam that has just swept past a
/// cell still guards it for one more tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LightHistory {
    current: LitSet,
    last: LitSet,
}

impl LightHistory {
    /// Creates a history with both sets empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells illuminated right now.
    #[must_use]
    pub fn current(&self) -> &LitSet {
        &self.current
    }

    /// Cells that were illuminated at the end of the previous tick.
    #[must_use]
    pub fn last(&self) -> &LitSet {
        &self.last
    }

    /// Reports whether `cell` is illuminated now or was on the previous tick.
    #[must_use]
    pub fn guards(&self, cell: CellCoord) -> bool {
        self.current.contains(cell) || self.last.contains(cell)
    }

    /// Moves the current light into the last slot and empties the current one.
    ///
    /// Must run once at the start of every tick, before any agent acts.
    pub fn begin_tick(&mut self) {
        mem::swap(&mut self.current, &mut self.last);
        self.current.clear();
    }

    /// Recomputes the current light from the player's cell and facing.
    ///
    /// The last light is left untouched. Returns the number of lit cells.
    pub fn relight(
        &mut self,
        beam: &VisibilityBeam,
        grid: &WallGrid,
        origin: CellCoord,
        facing: Direction,
    ) -> usize {
        self.current.clear();
        beam.illuminate(grid, origin, facing, &mut self.current);
        debug!(?origin, ?facing, lit = self.current.len(), "light recomputed");
        self.current.len()
    }

    /// Empties both sets.
    pub fn reset(&mut self) {
        self.current.clear();
        self.last.clear();
    }
}
