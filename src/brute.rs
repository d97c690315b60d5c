use std::collections::HashMap;

use log::warn;

use crate::cnf::collect_vars;
use crate::encode::{DegreeEncoding, encode};
use crate::grid::Grid;
use crate::solution::{Bridge, extract_solution, validate_model};
use crate::solver::Cancel;

/// Past this many variables the enumeration is pointless; refuse outright.
const HARD_VAR_LIMIT: usize = 32;
/// Past this many variables, warn but keep going.
const WARN_VAR_LIMIT: usize = 22;

/// Correctness baseline: enumerate every truth assignment over the
/// variables appearing in any clause, in odometer order, and hand each
/// satisfying one to the validator.
///
/// The combinatorial degree encoding is used so the formula mentions only
/// the edge variables; the sequential counter's auxiliaries would blow the
/// exponent for no gain.
pub fn solve(grid: &Grid, cancel: &Cancel) -> Option<Vec<Bridge>> {
    let enc = encode(grid, DegreeEncoding::Combinatorial);
    let variables = collect_vars(&enc.clauses);
    let n = variables.len();

    if n > HARD_VAR_LIMIT {
        warn!(target: "solver", "{n} variables (2^{n} assignments) is out of reach for brute force, refusing");
        return None;
    }
    if n > WARN_VAR_LIMIT {
        warn!(target: "solver", "{n} variables ({} assignments) is likely too large for brute force", 1u64 << n);
    }

    let bit_of: HashMap<isize, usize> = variables
        .iter()
        .enumerate()
        .map(|(idx, &var)| (var, idx))
        .collect();

    for mask in 0u64..(1u64 << n) {
        if mask & 0xFFF == 0 && cancel.is_cancelled() {
            return None;
        }

        let satisfied = enc.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&lit| (mask >> bit_of[&lit.abs()] & 1 == 1) == (lit > 0))
        });
        if !satisfied {
            continue;
        }

        let model: Vec<isize> = variables
            .iter()
            .enumerate()
            .map(|(idx, &var)| if mask >> idx & 1 == 1 { var } else { -var })
            .collect();
        if validate_model(&enc.islands, &enc.edge_vars, &model) {
            return Some(extract_solution(&model, &enc.edge_vars));
        }
        // SAT but disconnected: keep enumerating.
    }
    None
}
