use lantern_core::{CellCoord, DiagonalLevel, SearchStrategy, WallGrid};
use lantern_system_pathfinding::{step_weight, Pathfinder};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

const LEVELS: [DiagonalLevel; 4] = [
    DiagonalLevel::Cardinal,
    DiagonalLevel::FillAlways,
    DiagonalLevel::FillCorners,
    DiagonalLevel::Unfilled,
];

const STRATEGIES: [SearchStrategy; 2] = [SearchStrategy::UniformCost, SearchStrategy::Euclidean];

#[derive(Clone, Debug)]
struct Scenario {
    grid: WallGrid,
    start: CellCoord,
    end: CellCoord,
}

prop_compose! {
    fn scenario()(columns in 2_u32..8, rows in 2_u32..8)(
        columns in Just(columns),
        walls in proptest::collection::vec(proptest::bool::weighted(0.3), (columns * rows) as usize),
        start in (0..columns, 0..rows),
        end in (0..columns, 0..rows),
    ) -> Scenario {
        let table: Vec<Vec<bool>> = walls
            .chunks(columns as usize)
            .map(<[bool]>::to_vec)
            .collect();
        let start = CellCoord::new(start.0, start.1);
        let end = CellCoord::new(end.0, end.1);
        let mut grid = WallGrid::from_rows(&table).expect("generated table is rectangular");
        grid.set_wall(start, false);
        grid.set_wall(end, false);
        Scenario { grid, start, end }
    }
}

/// Bellman-Ford over the same neighbour relation the search uses.
fn reference_distance(grid: &WallGrid, start: CellCoord, end: CellCoord, diagonal: bool) -> f64 {
    let mut dist = vec![f64::INFINITY; grid.cell_count()];
    dist[grid.index(start).expect("start inside grid")] = 0.0;

    for _ in 0..grid.cell_count() {
        let mut changed = false;
        for cell in grid.cells() {
            let base = dist[grid.index(cell).expect("enumerated cell")];
            if !base.is_finite() {
                continue;
            }
            for neighbor in grid.neighbors(cell, diagonal) {
                let slot = &mut dist[grid.index(neighbor).expect("neighbour inside grid")];
                let candidate = base + step_weight(cell, neighbor);
                if candidate < *slot {
                    *slot = candidate;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    dist[grid.index(end).expect("end inside grid")]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn uniform_cost_routes_are_minimal(scenario in scenario()) {
        let Scenario { grid, start, end } = scenario;
        let mut pathfinder = Pathfinder::new();

        for (level, diagonal) in [(DiagonalLevel::Cardinal, false), (DiagonalLevel::Unfilled, true)] {
            let expected = reference_distance(&grid, start, end, diagonal);
            let found = pathfinder.find_path(&grid, start, end, SearchStrategy::UniformCost, level);
            match found {
                Some(path) => {
                    prop_assert!(
                        (path.weight(start) - expected).abs() < TOLERANCE,
                        "level={level:?} weight={} expected={expected}",
                        path.weight(start)
                    );
                }
                None => prop_assert!(expected.is_infinite(), "level={level:?} missed a route"),
            }
        }
    }

    #[test]
    fn reachability_is_shared_by_every_configuration(scenario in scenario()) {
        let Scenario { grid, start, end } = scenario;
        let reachable = reference_distance(&grid, start, end, true).is_finite();
        let mut pathfinder = Pathfinder::new();

        for level in LEVELS {
            for strategy in STRATEGIES {
                let found = pathfinder.find_path(&grid, start, end, strategy, level);
                prop_assert_eq!(
                    found.is_some(),
                    reachable,
                    "level={:?} strategy={:?}",
                    level,
                    strategy
                );
                if let Some(path) = found {
                    if start != end {
                        prop_assert_eq!(path.last(), Some(end));
                    }
                    prop_assert!(path.cells().iter().all(|cell| grid.is_open(*cell)));
                }
            }
        }
    }

    #[test]
    fn filled_levels_only_move_cardinally(scenario in scenario()) {
        let Scenario { grid, start, end } = scenario;
        let mut pathfinder = Pathfinder::new();

        for level in [DiagonalLevel::Cardinal, DiagonalLevel::FillAlways] {
            for strategy in STRATEGIES {
                if let Some(path) = pathfinder.find_path(&grid, start, end, strategy, level) {
                    for (from, to) in path.steps(start) {
                        prop_assert_eq!(from.manhattan_distance(to), 1, "level={:?}", level);
                    }
                }
            }
        }
    }

    #[test]
    fn diagonals_never_squeeze_between_walls(scenario in scenario()) {
        let Scenario { grid, start, end } = scenario;
        let mut pathfinder = Pathfinder::new();

        for strategy in STRATEGIES {
            if let Some(path) = pathfinder.find_path(&grid, start, end, strategy, DiagonalLevel::Unfilled) {
                for (from, to) in path.steps(start) {
                    prop_assert!(from.is_adjacent_to(to), "{from:?} -> {to:?}");
                    if from.is_diagonal_to(to) {
                        let row_flank = grid.is_open(CellCoord::new(to.column(), from.row()));
                        let column_flank = grid.is_open(CellCoord::new(from.column(), to.row()));
                        prop_assert!(row_flank || column_flank, "{from:?} -> {to:?} clips two walls");
                    }
                }
            }

            if let Some(path) = pathfinder.find_path(&grid, start, end, strategy, DiagonalLevel::FillCorners) {
                for (from, to) in path.steps(start) {
                    if from.is_diagonal_to(to) {
                        prop_assert!(grid.is_open(CellCoord::new(to.column(), from.row())));
                        prop_assert!(grid.is_open(CellCoord::new(from.column(), to.row())));
                    }
                }
            }
        }
    }

    #[test]
    fn repeated_searches_are_stable(scenario in scenario()) {
        let Scenario { grid, start, end } = scenario;
        let mut pathfinder = Pathfinder::new();

        for level in LEVELS {
            for strategy in STRATEGIES {
                let first = pathfinder.find_path(&grid, start, end, strategy, level);
                let second = pathfinder.find_path(&grid, start, end, strategy, level);
                prop_assert_eq!(first, second);
            }
        }
    }
}
