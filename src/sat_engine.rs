use anyhow::Result;
use log::{debug, info, warn};
use varisat::{ExtendFormula, Lit, Solver};

use crate::encode::{DegreeEncoding, encode};
use crate::grid::Grid;
use crate::solution::{Bridge, extract_solution, validate_model};
use crate::solver::Cancel;

/// Cap on models rejected for disconnectedness before giving up. Each
/// rejection adds one blocking clause to the solver.
const MAX_BLOCKED_MODELS: usize = 100_000;

/// Drives an external CDCL SAT solver over the encoded formula.
///
/// The encoding leaves connectivity out, so the loop repeatedly asks for a
/// model, validates it, and blocks it when the decoded layout is
/// disconnected. Solver failures are swallowed: the next degree encoding is
/// tried, and if every combination errors out the puzzle is reported
/// unsolvable.
pub fn solve(grid: &Grid, cancel: &Cancel) -> Option<Vec<Bridge>> {
    for degree_enc in [DegreeEncoding::SequentialCounter, DegreeEncoding::Combinatorial] {
        match solve_with_encoding(grid, degree_enc, cancel) {
            Ok(result) => return result,
            Err(err) => {
                warn!(target: "solver", "SAT backend failed with {degree_enc:?}: {err}");
            }
        }
    }
    None
}

fn solve_with_encoding(
    grid: &Grid,
    degree_enc: DegreeEncoding,
    cancel: &Cancel,
) -> Result<Option<Vec<Bridge>>> {
    let enc = encode(grid, degree_enc);
    debug!(
        target: "solver",
        "encoded {} clauses over {} variables ({degree_enc:?})",
        enc.clauses.len(),
        enc.next_var - 1
    );

    let mut solver = Solver::new();
    for clause in &enc.clauses {
        let lits: Vec<Lit> = clause.iter().map(|&lit| Lit::from_dimacs(lit)).collect();
        solver.add_clause(&lits);
    }

    let mut blocked = 0;
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        let sat = solver
            .solve()
            .map_err(|err| anyhow::anyhow!("solver error: {err}"))?;
        if !sat {
            return Ok(None);
        }
        // A formula with no variables (an island-less grid) has the empty
        // model.
        let model = solver.model().unwrap_or_default();

        let dimacs: Vec<isize> = model.iter().map(|lit| lit.to_dimacs()).collect();
        if validate_model(&enc.islands, &enc.edge_vars, &dimacs) {
            return Ok(Some(extract_solution(&dimacs, &enc.edge_vars)));
        }

        blocked += 1;
        debug!(target: "solver", "model {blocked} rejected (disconnected), blocking");
        if blocked >= MAX_BLOCKED_MODELS {
            info!(target: "solver", "giving up after {blocked} blocked models");
            return Ok(None);
        }

        // Forbid this exact assignment and ask for another.
        let blocking: Vec<Lit> = model.iter().map(|&lit| !lit).collect();
        solver.add_clause(&blocking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{check_connected, check_degrees};

    fn solve_text(text: &str) -> Option<Vec<Bridge>> {
        solve(&Grid::from_text(text).unwrap(), &Cancel::new())
    }

    #[test]
    fn test_two_islands_single_bridge() {
        let bridges = solve_text("1,0,1").unwrap();
        assert_eq!(bridges, vec![Bridge { i: 0, j: 1, count: 1 }]);
    }

    #[test]
    fn test_two_islands_double_bridge() {
        let bridges = solve_text("2,0,2").unwrap();
        assert_eq!(bridges, vec![Bridge { i: 0, j: 1, count: 2 }]);
    }

    #[test]
    fn test_isolated_islands_unsolvable() {
        assert!(solve_text("1,0,0\n0,0,0\n0,0,1").is_none());
    }

    #[test]
    fn test_forced_crossing_unsolvable() {
        assert!(solve_text("0,0,2,0,0\n0,0,0,0,0\n2,0,0,0,2\n0,0,0,0,0\n0,0,2,0,0").is_none());
    }

    #[test]
    fn test_corner_degrees() {
        // Four degree-3 corners: several SAT models, all must balance every
        // corner at exactly 3 and connect the square.
        let grid = Grid::from_text("3,0,3\n0,0,0\n3,0,3").unwrap();
        let islands = grid.islands();
        let bridges = solve(&grid, &Cancel::new()).unwrap();
        assert!(check_degrees(&islands, &bridges));
        assert!(check_connected(islands.len(), &bridges));
    }

    #[test]
    fn test_connectivity_enforced_by_blocking() {
        // This layout admits a degree-valid but disconnected model (the
        // left column pair plus a right column double); the loop must block
        // it and land on the connected ring.
        let grid = Grid::from_text("1,0,2\n0,0,0\n1,0,2").unwrap();
        let islands = grid.islands();
        let bridges = solve(&grid, &Cancel::new()).unwrap();
        assert!(check_connected(islands.len(), &bridges));
        assert!(check_degrees(&islands, &bridges));
    }

    #[test]
    fn test_cancelled_run_returns_nothing() {
        let cancel = Cancel::new();
        cancel.cancel();
        assert!(solve(&Grid::from_text("1,0,1").unwrap(), &cancel).is_none());
    }
}
