use std::collections::HashMap;

use log::debug;

use crate::cnf::{
    Clause, Cnf, blocking_clause, dedup_clauses, forward_check, model_from_assignment,
    unit_propagate, vars_by_frequency,
};
use crate::encode::{DegreeEncoding, encode};
use crate::grid::Grid;
use crate::solution::{Bridge, extract_solution, validate_model};
use crate::solver::Cancel;

/// Cap on models rejected by the validator before giving up.
const MAX_REJECTED_MODELS: usize = 10_000;
/// Cap on conflict clauses retained per backtracking run.
const MAX_LEARNED_CLAUSES: usize = 10_000;

/// Self-contained DPLL over the encoded formula.
///
/// Variables are branched in descending occurrence order, fixed for the
/// whole solve. Each search runs unit propagation to fixpoint, a forward
/// check, and true-before-false branching; a both-branches-failed conflict
/// learns the nogood for the assignment in force. Models that decode to a
/// disconnected layout are blocked and the search restarts with the learned
/// clauses kept.
pub fn solve(grid: &Grid, cancel: &Cancel) -> Option<Vec<Bridge>> {
    let enc = encode(grid, DegreeEncoding::default());
    let mut clauses = enc.clauses.clone();
    let variables = vars_by_frequency(&clauses);

    for round in 0..MAX_REJECTED_MODELS {
        if cancel.is_cancelled() {
            return None;
        }

        let mut assignment = HashMap::new();
        assign_pure_literals(&clauses, &mut assignment);

        let mut learned = Vec::new();
        let assignment = backtrack(&variables, 0, assignment, clauses.clone(), &mut learned, cancel)?;

        let model = model_from_assignment(&variables, &assignment);
        if validate_model(&enc.islands, &enc.edge_vars, &model) {
            return Some(extract_solution(&model, &enc.edge_vars));
        }

        debug!(target: "solver", "round {round}: model rejected (disconnected), blocking");
        clauses.push(blocking_clause(&model));
        clauses.extend(learned);
        dedup_clauses(&mut clauses);
    }
    None
}

/// Variables occurring with a single polarity get fixed to satisfy every
/// clause they appear in.
fn assign_pure_literals(clauses: &[Clause], assignment: &mut HashMap<isize, bool>) {
    let mut polarity: HashMap<isize, (bool, bool)> = HashMap::new();
    for &lit in clauses.iter().flatten() {
        let entry = polarity.entry(lit.abs()).or_insert((false, false));
        if lit > 0 {
            entry.0 = true;
        } else {
            entry.1 = true;
        }
    }
    for (&var, &(pos, neg)) in &polarity {
        if pos != neg {
            assignment.insert(var, pos);
        }
    }
}

fn backtrack(
    variables: &[isize],
    index: usize,
    mut assignment: HashMap<isize, bool>,
    clauses: Cnf,
    learned: &mut Vec<Clause>,
    cancel: &Cancel,
) -> Option<HashMap<isize, bool>> {
    if cancel.is_cancelled() {
        return None;
    }

    let clauses = unit_propagate(&clauses, &mut assignment)?;
    if !forward_check(&clauses, &assignment) {
        return None;
    }

    let mut index = index;
    while index < variables.len() && assignment.contains_key(&variables[index]) {
        index += 1;
    }
    if index == variables.len() {
        return Some(assignment);
    }

    let var = variables[index];
    for value in [true, false] {
        let mut child = assignment.clone();
        child.insert(var, value);
        if let Some(result) =
            backtrack(variables, index + 1, child, clauses.clone(), learned, cancel)
        {
            return Some(result);
        }
    }

    // Both branches failed: the assignment in force is a nogood.
    if learned.len() < MAX_LEARNED_CLAUSES {
        let mut nogood: Clause = assignment
            .iter()
            .map(|(&v, &val)| if val { -v } else { v })
            .collect();
        nogood.sort_by_key(|lit| lit.abs());
        learned.push(nogood);
    }
    None
}
