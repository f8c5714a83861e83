use lantern_core::{CellCoord, DiagonalLevel, SearchStrategy, WallGrid};
use lantern_system_pathfinding::{
    find_path, find_path_cardinal, find_path_fill_diagonal, find_path_with_diagonal, Path,
    Pathfinder, CARDINAL_STEP_WEIGHT, DIAGONAL_STEP_WEIGHT,
};

const EPSILON: f64 = 1e-9;

#[test]
fn single_gap_wall_routes_through_gap() {
    let grid = gap_grid();
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(4, 4);
    let gap = CellCoord::new(2, 2);

    for use_heuristic in [false, true] {
        let path = find_path(&grid, start, end, use_heuristic, 0)
            .expect("level 0 is valid")
            .expect("gap connects both halves");
        assert!(
            path.cells().contains(&gap),
            "heuristic={use_heuristic} path skipped the gap: {:?}",
            path.cells()
        );
        assert_eq!(path.last(), Some(end));
        assert!((path.weight(start) - 8.0).abs() < EPSILON);
        assert_cardinal(start, &path);
    }
}

#[test]
fn disconnected_halves_have_no_route() {
    let grid = grid(&[
        "..#..", //
        "..#..", //
        "..#..", //
    ]);
    let start = CellCoord::new(0, 1);
    let end = CellCoord::new(4, 1);

    for use_heuristic in [false, true] {
        for level in 0..=3 {
            let path = find_path(&grid, start, end, use_heuristic, level).expect("valid level");
            assert_eq!(path, None, "heuristic={use_heuristic} level={level}");
        }
    }
}

#[test]
fn diagonal_squeeze_between_walls_is_not_taken() {
    let grid = grid(&[
        ".#", //
        "#.", //
    ]);
    let path = find_path(&grid, CellCoord::new(0, 0), CellCoord::new(1, 1), false, 3)
        .expect("valid level");
    assert_eq!(path, None);
}

#[test]
fn out_of_bounds_endpoints_surface_as_no_route() {
    let grid = WallGrid::open(3, 3).expect("grid fits");
    let inside = CellCoord::new(1, 1);
    let outside = CellCoord::new(3, 1);

    assert_eq!(find_path(&grid, outside, inside, false, 0), Ok(None));
    assert_eq!(find_path(&grid, inside, outside, true, 2), Ok(None));
}

#[test]
fn invalid_diagonal_level_is_reported() {
    let grid = WallGrid::open(3, 3).expect("grid fits");
    let error = find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 2), true, 4)
        .expect_err("level 4 is rejected");
    assert_eq!(error.level(), 4);
}

#[test]
fn walled_goal_is_unreachable() {
    let grid = grid(&[
        "...", //
        "..#", //
    ]);
    let path = find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 1), false, 3)
        .expect("valid level");
    assert_eq!(path, None);
}

#[test]
fn unfilled_level_keeps_open_diagonals() {
    let grid = WallGrid::open(3, 3).expect("grid fits");
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(2, 2);

    let path = find_path(&grid, start, end, false, 3)
        .expect("valid level")
        .expect("open grid");
    assert_eq!(path.cells(), &[CellCoord::new(1, 1), end]);
    assert!((path.weight(start) - 2.0 * DIAGONAL_STEP_WEIGHT).abs() < EPSILON);

    let corner_only = find_path(&grid, start, end, false, 2)
        .expect("valid level")
        .expect("open grid");
    assert_eq!(corner_only.cells(), path.cells());
}

#[test]
fn fill_always_level_replaces_every_diagonal() {
    let grid = WallGrid::open(3, 3).expect("grid fits");
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(2, 2);

    let unfilled = find_path(&grid, start, end, true, 3)
        .expect("valid level")
        .expect("open grid");
    assert!(
        unfilled.steps(start).any(|(from, to)| from.is_diagonal_to(to)),
        "level 3 should move diagonally on an open grid"
    );

    let filled = find_path(&grid, start, end, true, 1)
        .expect("valid level")
        .expect("open grid");
    assert_eq!(
        filled.cells(),
        &[
            CellCoord::new(1, 0),
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            end,
        ]
    );
    assert_cardinal(start, &filled);
}

#[test]
fn corner_level_fills_only_clipped_diagonals() {
    let grid = grid(&[
        "...", //
        ".#.", //
        "...", //
    ]);
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(2, 2);

    let unfilled = find_path(&grid, start, end, false, 3)
        .expect("valid level")
        .expect("route around the pillar");
    let expected = 2.0 * CARDINAL_STEP_WEIGHT + DIAGONAL_STEP_WEIGHT;
    assert!((unfilled.weight(start) - expected).abs() < EPSILON);

    let corner_only = find_path(&grid, start, end, false, 2)
        .expect("valid level")
        .expect("route around the pillar");
    for (from, to) in corner_only.steps(start) {
        if from.is_diagonal_to(to) {
            assert!(grid.is_open(CellCoord::new(to.column(), from.row())));
            assert!(grid.is_open(CellCoord::new(from.column(), to.row())));
        }
    }
    assert_cardinal(start, &corner_only);
    assert_eq!(corner_only.len(), 4);
}

#[test]
fn heuristic_search_expands_fewer_cells_on_open_corridor() {
    let grid = WallGrid::open(20, 20).expect("grid fits");
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(19, 0);
    let mut pathfinder = Pathfinder::new();

    let uniform = pathfinder
        .find_path(
            &grid,
            start,
            end,
            SearchStrategy::UniformCost,
            DiagonalLevel::Cardinal,
        )
        .expect("open grid");
    let uniform_expanded = pathfinder.last_expanded();

    let guided = pathfinder
        .find_path(
            &grid,
            start,
            end,
            SearchStrategy::Euclidean,
            DiagonalLevel::Cardinal,
        )
        .expect("open grid");
    let guided_expanded = pathfinder.last_expanded();

    assert_eq!(uniform.len(), 19);
    assert_eq!(guided.len(), 19);
    assert!(
        guided_expanded < uniform_expanded,
        "A* expanded {guided_expanded}, Dijkstra expanded {uniform_expanded}"
    );
}

#[test]
fn heuristic_scores_the_queued_neighbour() {
    let grid = WallGrid::open(20, 20).expect("grid fits");
    let mut pathfinder = Pathfinder::new();

    let path = pathfinder
        .find_path(
            &grid,
            CellCoord::new(0, 0),
            CellCoord::new(19, 0),
            SearchStrategy::Euclidean,
            DiagonalLevel::Cardinal,
        )
        .expect("open grid");

    // Every cell on the straight row scores exactly the goal distance, so
    // nothing off the row is ever finalised.
    assert_eq!(path.len(), 19);
    assert_eq!(pathfinder.last_expanded(), 19);
}

#[test]
fn repeated_searches_agree_on_weight() {
    let grid = grid(&[
        "......", //
        ".##.#.", //
        "...#..", //
        ".#...#", //
        "......", //
    ]);
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(5, 4);
    let mut pathfinder = Pathfinder::new();

    for level in [
        DiagonalLevel::Cardinal,
        DiagonalLevel::FillAlways,
        DiagonalLevel::FillCorners,
        DiagonalLevel::Unfilled,
    ] {
        for strategy in [SearchStrategy::UniformCost, SearchStrategy::Euclidean] {
            let first = pathfinder
                .find_path(&grid, start, end, strategy, level)
                .expect("maze is connected");
            let second = pathfinder
                .find_path(&grid, start, end, strategy, level)
                .expect("maze is connected");
            assert!((first.weight(start) - second.weight(start)).abs() < EPSILON);
        }
    }
}

#[test]
fn convenience_entry_points_match_presets() {
    let grid = gap_grid();
    let start = CellCoord::new(0, 0);
    let end = CellCoord::new(4, 4);

    let cardinal = find_path_cardinal(&grid, start, end).expect("connected");
    assert_cardinal(start, &cardinal);

    let filled = find_path_fill_diagonal(&grid, start, end).expect("connected");
    assert_cardinal(start, &filled);

    let corner_only = find_path_with_diagonal(&grid, start, end).expect("connected");
    assert_eq!(corner_only.last(), Some(end));
}

fn assert_cardinal(start: CellCoord, path: &Path) {
    for (from, to) in path.steps(start) {
        assert_eq!(
            from.manhattan_distance(to),
            1,
            "non-cardinal step {from:?} -> {to:?} in {:?}",
            path.cells()
        );
    }
}

fn gap_grid() -> WallGrid {
    grid(&[
        ".....", //
        ".....", //
        "##.##", //
        ".....", //
        ".....", //
    ])
}

fn grid(rows: &[&str]) -> WallGrid {
    let table: Vec<Vec<bool>> = rows
        .iter()
        .map(|row| row.chars().map(|tile| tile == '#').collect())
        .collect();
    WallGrid::from_rows(&table).expect("valid grid")
}
