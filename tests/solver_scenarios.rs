//! End-to-end scenarios run across all four engines.

use hashi_sat::solution::{check_connected, check_degrees, recognize};
use hashi_sat::{Algo, Cancel, Grid, solve_grid};

const ENGINES: [Algo; 4] = [Algo::Sat, Algo::AStar, Algo::Backtrack, Algo::Brute];

fn solve_all(text: &str) -> Vec<(Algo, String)> {
    let grid = Grid::from_text(text).unwrap();
    ENGINES
        .iter()
        .map(|&algo| (algo, solve_grid(&grid, algo, &Cancel::new())))
        .collect()
}

/// The rendered output must decode to a layout with the puzzle's islands,
/// matching degrees, and a single connected component.
fn assert_valid_solution(text: &str, algo: Algo, rendered: &str) {
    let grid = Grid::from_text(text).unwrap();
    let islands = grid.islands();
    let (seen_islands, bridges) =
        recognize(rendered).unwrap_or_else(|| panic!("{:?}: unreadable output", algo));
    assert_eq!(seen_islands, islands, "{algo:?}: island mismatch");
    assert!(
        check_degrees(&islands, &bridges),
        "{algo:?}: degree sums do not match"
    );
    assert!(
        check_connected(islands.len(), &bridges),
        "{algo:?}: solution is disconnected"
    );
}

#[test]
fn test_single_bridge_pair() {
    for (algo, rendered) in solve_all("1,0,1") {
        assert_eq!(rendered, "1 - 1", "{algo:?}");
    }
}

#[test]
fn test_double_bridge_pair() {
    for (algo, rendered) in solve_all("2,0,2") {
        assert_eq!(rendered, "2 = 2", "{algo:?}");
    }
}

#[test]
fn test_pair_in_a_larger_grid() {
    // Only the top row is populated; everything else stays water.
    for (algo, rendered) in solve_all("1,0,1\n0,0,0\n0,0,0") {
        assert_eq!(rendered, "1 - 1\n0 0 0\n0 0 0", "{algo:?}");
    }
}

#[test]
fn test_no_orthogonal_neighbor_is_unsolvable() {
    for (algo, rendered) in solve_all("1,0,0\n0,0,0\n0,0,1") {
        assert_eq!(rendered, "", "{algo:?}");
    }
}

#[test]
fn test_degree_three_corners() {
    // Each corner sees two others; several models exist and each engine
    // must pick one with every degree met and the square connected.
    let text = "3,0,3\n0,0,0\n3,0,3";
    for (algo, rendered) in solve_all(text) {
        assert!(!rendered.is_empty(), "{algo:?}: expected a solution");
        assert_valid_solution(text, algo, &rendered);
    }
}

#[test]
fn test_forced_crossing_is_unsolvable() {
    // The only candidates are a long vertical and a long horizontal edge,
    // and every degree-satisfying model needs both; they cross.
    for (algo, rendered) in solve_all("0,0,2,0,0\n0,0,0,0,0\n2,0,0,0,2\n0,0,0,0,0\n0,0,2,0,0") {
        assert_eq!(rendered, "", "{algo:?}");
    }
}

#[test]
fn test_forced_double_crossing_is_unsolvable() {
    // Opposite degree-2 islands in a diamond force two crossing doubles.
    for (algo, rendered) in solve_all("0,2,0\n2,0,2\n0,2,0") {
        assert_eq!(rendered, "", "{algo:?}");
    }
}

#[test]
fn test_disconnected_models_are_blocked() {
    // Degree-valid but disconnected splits exist; engines must keep
    // searching past them.
    let text = "1,0,2\n0,0,0\n1,0,2";
    for (algo, rendered) in solve_all(text) {
        assert!(!rendered.is_empty(), "{algo:?}: expected a solution");
        assert_valid_solution(text, algo, &rendered);
    }
}

#[test]
fn test_render_round_trip() {
    let text = "2,0,2\n0,0,0\n2,0,1\n0,0,0\n1,0,0";
    let grid = Grid::from_text(text).unwrap();
    let rendered = solve_grid(&grid, Algo::Sat, &Cancel::new());
    assert!(!rendered.is_empty());
    assert_valid_solution(text, Algo::Sat, &rendered);

    // Rendering the recognized layout again is a fixpoint.
    let (islands, bridges) = recognize(&rendered).unwrap();
    let again = hashi_sat::solution::render(&grid, &islands, &bridges);
    assert_eq!(again, rendered);
}

#[test]
fn test_all_water_grid_solves_to_itself() {
    for (algo, rendered) in solve_all("0,0\n0,0") {
        assert_eq!(rendered, "0 0\n0 0", "{algo:?}");
    }
}
