use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::debug;

use crate::cnf::{
    Clause, blocking_clause, count_violated, model_from_assignment, unit_propagate,
    vars_by_frequency,
};
use crate::encode::{DegreeEncoding, encode};
use crate::grid::Grid;
use crate::solution::{Bridge, extract_solution, validate_model};
use crate::solver::Cancel;

const MAX_BLOCKED_MODELS: usize = 10_000;

/// One enqueued partial assignment. Ordered for a min-heap on
/// `f = g + h`, with the monotonic insertion counter breaking ties so the
/// queue pops deterministically.
struct Node {
    f: usize,
    seq: u64,
    assignment: HashMap<isize, bool>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the maximum; invert for smallest-f, oldest-first.
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first search over partial assignments of the encoded formula.
///
/// `g` is the number of assigned variables, `h` the count of fully assigned
/// unsatisfied clauses. Children branch the next unassigned variable in the
/// frequency order and are unit-propagated before being enqueued; goal
/// states run the connectivity validator and invalid ones are blocked in
/// place.
pub fn solve(grid: &Grid, cancel: &Cancel) -> Option<Vec<Bridge>> {
    let enc = encode(grid, DegreeEncoding::default());
    let mut clauses = enc.clauses.clone();
    let variables = vars_by_frequency(&clauses);

    let mut heap: BinaryHeap<Node> = BinaryHeap::new();
    let mut visited: HashSet<Vec<isize>> = HashSet::new();
    let mut seq: u64 = 0;
    let mut blocked = 0;

    let mut root = HashMap::new();
    if unit_propagate(&clauses, &mut root).is_none() {
        return None;
    }
    visited.insert(state_key(&root));
    heap.push(Node {
        f: root.len() + count_violated(&clauses, &root),
        seq,
        assignment: root,
    });

    while let Some(node) = heap.pop() {
        if cancel.is_cancelled() {
            return None;
        }

        if node.assignment.len() == variables.len() {
            if count_violated(&clauses, &node.assignment) == 0 {
                let model = model_from_assignment(&variables, &node.assignment);
                if validate_model(&enc.islands, &enc.edge_vars, &model) {
                    return Some(extract_solution(&model, &enc.edge_vars));
                }
                blocked += 1;
                debug!(target: "solver", "goal rejected (disconnected), blocking");
                if blocked >= MAX_BLOCKED_MODELS {
                    return None;
                }
                clauses.push(blocking_clause(&model));
            }
            continue;
        }

        let Some(var) = variables
            .iter()
            .copied()
            .find(|var| !node.assignment.contains_key(var))
        else {
            continue;
        };

        for value in [true, false] {
            let mut child = node.assignment.clone();
            child.insert(var, value);
            if unit_propagate(&clauses, &mut child).is_none() {
                continue;
            }
            let key = state_key(&child);
            if visited.insert(key) {
                seq += 1;
                heap.push(Node {
                    f: child.len() + count_violated(&clauses, &child),
                    seq,
                    assignment: child,
                });
            }
        }
    }
    None
}

/// Deduplication key: the sorted literals asserted by the assignment.
fn state_key(assignment: &HashMap<isize, bool>) -> Clause {
    let mut key: Clause = assignment
        .iter()
        .map(|(&var, &value)| if value { var } else { -var })
        .collect();
    key.sort();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{check_connected, check_degrees};

    fn solve_text(text: &str) -> Option<Vec<Bridge>> {
        solve(&Grid::from_text(text).unwrap(), &Cancel::new())
    }

    #[test]
    fn test_simple_pairs() {
        assert_eq!(
            solve_text("1,0,1").unwrap(),
            vec![Bridge { i: 0, j: 1, count: 1 }]
        );
        assert_eq!(
            solve_text("2,0,2").unwrap(),
            vec![Bridge { i: 0, j: 1, count: 2 }]
        );
    }

    #[test]
    fn test_unsolvable_cases() {
        assert!(solve_text("1,0,0\n0,0,0\n0,0,1").is_none());
        assert!(solve_text("0,0,2,0,0\n0,0,0,0,0\n2,0,0,0,2\n0,0,0,0,0\n0,0,2,0,0").is_none());
    }

    #[test]
    fn test_blocking_finds_connected_model() {
        let grid = Grid::from_text("1,0,2\n0,0,0\n1,0,2").unwrap();
        let islands = grid.islands();
        let bridges = solve(&grid, &Cancel::new()).unwrap();
        assert!(check_connected(islands.len(), &bridges));
        assert!(check_degrees(&islands, &bridges));
    }

    #[test]
    fn test_empty_grid_trivially_solved() {
        assert_eq!(solve_text("0,0\n0,0").unwrap(), Vec::new());
    }
}
