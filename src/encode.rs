use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use log::{debug, info};

use crate::cnf::{Cnf, dedup_clauses};
use crate::edges::{Edge, edges_cross, potential_edges};
use crate::grid::{Grid, Island};
use crate::pb::encode_pb_equal;

/// How an island's degree equality is turned into clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegreeEncoding {
    /// Sequential-counter pseudo-Boolean equality, the reachable-sum
    /// automaton of [`encode_pb_equal`]. Polynomial and the default.
    #[default]
    SequentialCounter,
    /// Direct enumeration: an island has at most four incident edges, so all
    /// multiplicity tuples are enumerable and the infeasible ones are blocked
    /// outright.
    Combinatorial,
}

/// The complete propositional model of a puzzle.
///
/// Every candidate edge owns two variables: `vx` ("carries at least one
/// bridge") and `vd` ("carries two bridges"), with `¬(vx ∧ vd)` clamped by a
/// clause. Edge variables are allocated first and densely, auxiliary
/// variables after; `next_var` stays one past everything allocated.
pub struct Encoding {
    pub clauses: Cnf,
    pub islands: Vec<Island>,
    pub edges: Vec<Edge>,
    /// Canonical island pair -> (vx, vd).
    pub edge_vars: BTreeMap<(usize, usize), (isize, isize)>,
    /// Per island: (neighbor index, vx, vd) for each incident edge.
    pub incident: Vec<Vec<(usize, isize, isize)>>,
    pub next_var: isize,
}

impl Encoding {
    /// Writes the formula in DIMACS CNF format. Comment lines tie each
    /// edge's variable pair back to its island pair so the file can be fed
    /// to (and read back from) a standalone solver.
    pub fn write_dimacs<P: AsRef<Path>>(&self, output: P) -> Result<()> {
        let file = File::create(&output)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "c hashi: {} islands, {} candidate edges",
            self.islands.len(),
            self.edges.len()
        )?;
        for (&(i, j), &(vx, vd)) in &self.edge_vars {
            writeln!(writer, "c edge {i}-{j}: single {vx}, double {vd}")?;
        }

        writeln!(writer, "p cnf {} {}", self.next_var - 1, self.clauses.len())?;
        for clause in &self.clauses {
            for literal in clause {
                write!(writer, "{literal} ")?;
            }
            writeln!(writer, "0")?;
        }
        writer.flush()?;

        info!(
            target: "solver",
            "wrote formula to '{}' ({} variables, {} clauses)",
            output.as_ref().display(),
            self.next_var - 1,
            self.clauses.len()
        );
        Ok(())
    }
}

/// Builds the CNF for a puzzle: edge variables with per-edge mutual
/// exclusion, degree equalities (with shortcut pruning clauses for the
/// cheap degrees), and crossing exclusions. Connectivity is deliberately
/// not encoded; the engines enforce it by blocking rejected models.
pub fn encode(grid: &Grid, degree_enc: DegreeEncoding) -> Encoding {
    let islands = grid.islands();
    let edges = potential_edges(grid, &islands);

    let mut clauses: Cnf = Vec::new();
    let mut edge_vars: BTreeMap<(usize, usize), (isize, isize)> = BTreeMap::new();
    let mut next_var: isize = 1;

    // Phase 1: a (vx, vd) pair per edge, never both at once.
    for edge in &edges {
        let (vx, vd) = (next_var, next_var + 1);
        next_var += 2;
        edge_vars.insert((edge.i, edge.j), (vx, vd));
        clauses.push(vec![-vx, -vd]);
    }

    // Phase 2: incidence lists, then one degree equality per island.
    let mut incident: Vec<Vec<(usize, isize, isize)>> = vec![Vec::new(); islands.len()];
    for (&(i, j), &(vx, vd)) in &edge_vars {
        incident[i].push((j, vx, vd));
        incident[j].push((i, vx, vd));
    }

    for island in &islands {
        let edges_here = &incident[island.index];
        if edges_here.is_empty() {
            if island.degree > 0 {
                debug!(target: "encoder", "island {} has no candidate edges", island.index);
                clauses.push(Vec::new());
            }
            continue;
        }

        if add_degree_shortcuts(&mut clauses, island, edges_here, &islands) {
            continue;
        }

        let mut lits = Vec::new();
        let mut weights = Vec::new();
        for &(_, vx, vd) in edges_here {
            lits.push(vx);
            weights.push(1);
            lits.push(vd);
            weights.push(2);
        }

        match degree_enc {
            DegreeEncoding::SequentialCounter => {
                clauses.extend(encode_pb_equal(
                    &lits,
                    &weights,
                    island.degree as u32,
                    &mut next_var,
                ));
            }
            DegreeEncoding::Combinatorial => {
                encode_degree_combinatorial(&mut clauses, edges_here, island.degree);
            }
        }
    }

    // Phase 3: crossing edges exclude each other entirely.
    for (e1, e2) in edges.iter().tuple_combinations() {
        if edges_cross(e1, e2) {
            let (vx1, vd1) = edge_vars[&(e1.i, e1.j)];
            let (vx2, vd2) = edge_vars[&(e2.i, e2.j)];
            for v1 in [vx1, vd1] {
                for v2 in [vx2, vd2] {
                    clauses.push(vec![-v1, -v2]);
                }
            }
        }
    }

    dedup_clauses(&mut clauses);

    Encoding {
        clauses,
        islands,
        edges,
        edge_vars,
        incident,
        next_var,
    }
}

/// Shortcut clauses for degrees whose edge assignments are (partly) forced.
/// Returns true when the shortcuts fully determine the island's incident
/// variables and the general equality can be skipped.
fn add_degree_shortcuts(
    clauses: &mut Cnf,
    island: &Island,
    edges_here: &[(usize, isize, isize)],
    islands: &[Island],
) -> bool {
    if let [(_, vx, vd)] = *edges_here {
        match island.degree {
            1 => {
                clauses.push(vec![vx]);
                clauses.push(vec![-vd]);
                return true;
            }
            2 => {
                clauses.push(vec![vd]);
                clauses.push(vec![-vx]);
                return true;
            }
            // Degree >= 3 over a single edge: the equality below collides
            // with the mutual-exclusion clause and the formula goes unsat.
            _ => return false,
        }
    }

    match island.degree {
        1 => {
            // Never a double, and never the sole bridge of another
            // degree-1 island: that bridge saturates both ends and closes
            // the pair off from the rest of the puzzle. (A puzzle that IS
            // just such a pair has one edge total and is handled by the
            // single-neighbor branch above.)
            for &(neighbor, vx, vd) in edges_here {
                clauses.push(vec![-vd]);
                if islands[neighbor].degree == 1 {
                    clauses.push(vec![-vx]);
                }
            }
            false
        }
        8 => {
            // Four doubles are the only way to reach 8.
            for &(_, vx, vd) in edges_here {
                clauses.push(vec![vd]);
                clauses.push(vec![-vx]);
            }
            // With fewer than four neighbors the equality is unreachable
            // and must still fail, so only skip it at exactly four.
            edges_here.len() == 4
        }
        _ => false,
    }
}

/// Blocks every infeasible multiplicity tuple of the island's incident
/// edges. At most four edges with multiplicities {0, 1, 2} each, so at most
/// 3^4 tuples are scanned.
fn encode_degree_combinatorial(
    clauses: &mut Cnf,
    edges_here: &[(usize, isize, isize)],
    degree: u8,
) {
    let m = edges_here.len();
    let mut tuple = vec![0u8; m];

    loop {
        let sum: u32 = tuple.iter().map(|&x| x as u32).sum();
        if sum != degree as u32 {
            // One clause per bad tuple: some edge must leave its state.
            let mut clause = Vec::with_capacity(2 * m);
            for (&mult, &(_, vx, vd)) in tuple.iter().zip(edges_here) {
                match mult {
                    0 => clause.extend([vx, vd]),
                    1 => clause.extend([-vx, vd]),
                    _ => clause.extend([vx, -vd]),
                }
            }
            clauses.push(clause);
        }

        // Odometer step over base-3 tuples.
        let mut pos = 0;
        loop {
            if pos == m {
                return;
            }
            tuple[pos] += 1;
            if tuple[pos] < 3 {
                break;
            }
            tuple[pos] = 0;
            pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::collect_vars;

    fn encoding_of(text: &str, degree_enc: DegreeEncoding) -> Encoding {
        encode(&Grid::from_text(text).unwrap(), degree_enc)
    }

    #[test]
    fn test_edge_variables_dense_and_exclusive() {
        let enc = encoding_of("2,0,2\n0,0,0\n2,0,2", DegreeEncoding::SequentialCounter);
        assert_eq!(enc.edges.len(), 4);
        // Edge vars 1..=8 allocated first, auxiliaries after.
        let ids: Vec<isize> = enc
            .edge_vars
            .values()
            .flat_map(|&(vx, vd)| [vx, vd])
            .collect();
        assert_eq!(ids, (1..=8).collect::<Vec<isize>>());
        assert!(enc.next_var > 8);
        for &(vx, vd) in enc.edge_vars.values() {
            assert!(enc.clauses.contains(&vec![-vx, -vd]));
        }
    }

    #[test]
    fn test_incidence_map() {
        let enc = encoding_of("1,0,2\n0,0,1", DegreeEncoding::SequentialCounter);
        // Island 1 at (0,2) sees island 0 to the left and island 2 below.
        let neighbors: Vec<usize> = enc.incident[1].iter().map(|&(n, _, _)| n).collect();
        assert_eq!(neighbors, vec![0, 2]);
    }

    #[test]
    fn test_isolated_island_is_unsat() {
        let enc = encoding_of("1,0,0\n0,0,0\n0,0,1", DegreeEncoding::SequentialCounter);
        assert!(enc.clauses.iter().any(|c| c.is_empty()));
    }

    #[test]
    fn test_single_neighbor_shortcuts() {
        // 1 - 1 pair: both islands force vx and forbid vd.
        let enc = encoding_of("1,0,1", DegreeEncoding::SequentialCounter);
        let &(vx, vd) = enc.edge_vars.get(&(0, 1)).unwrap();
        assert!(enc.clauses.contains(&vec![vx]));
        assert!(enc.clauses.contains(&vec![-vd]));

        // 2 = 2 pair forces the double.
        let enc = encoding_of("2,0,2", DegreeEncoding::SequentialCounter);
        let &(vx, vd) = enc.edge_vars.get(&(0, 1)).unwrap();
        assert!(enc.clauses.contains(&vec![vd]));
        assert!(enc.clauses.contains(&vec![-vx]));
    }

    #[test]
    fn test_degree_one_pair_excluded_in_larger_puzzles() {
        // Two adjacent degree-1 islands in a four-island puzzle: a single
        // bridge between them would close the pair off, so the shortcut
        // forbids vx on that edge.
        let enc = encoding_of("1,0,1,0,2\n0,0,0,0,2", DegreeEncoding::SequentialCounter);
        let &(vx, _) = enc.edge_vars.get(&(0, 1)).unwrap();
        assert!(enc.clauses.contains(&vec![-vx]));
    }

    #[test]
    fn test_crossing_exclusions() {
        let enc = encoding_of(
            "0,0,2,0,0\n0,0,0,0,0\n2,0,0,0,2\n0,0,0,0,0\n0,0,2,0,0",
            DegreeEncoding::SequentialCounter,
        );
        let (h, v) = enc
            .edges
            .iter()
            .tuple_combinations()
            .find(|(a, b)| edges_cross(a, b))
            .expect("the long edges cross");
        let (vx1, vd1) = enc.edge_vars[&(h.i, h.j)];
        let (vx2, vd2) = enc.edge_vars[&(v.i, v.j)];
        for v1 in [vx1, vd1] {
            for v2 in [vx2, vd2] {
                assert!(
                    enc.clauses.contains(&vec![-v1, -v2])
                        || enc.clauses.contains(&vec![-v2, -v1])
                );
            }
        }
    }

    #[test]
    fn test_write_dimacs_names_edge_variables() {
        let enc = encoding_of("1,0,1", DegreeEncoding::SequentialCounter);
        let path = std::env::temp_dir().join("hashi_sat_dimacs_test.cnf");
        enc.write_dimacs(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("c hashi: 2 islands, 1 candidate edges"));
        assert!(text.contains("c edge 0-1: single 1, double 2"));
        assert!(text.lines().any(|line| line.starts_with("p cnf ")));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_combinatorial_allocates_no_auxiliaries() {
        let enc = encoding_of("2,0,2\n0,0,0\n2,0,2", DegreeEncoding::Combinatorial);
        let max_var = collect_vars(&enc.clauses).last().copied().unwrap_or(0);
        assert_eq!(max_var, 2 * enc.edges.len() as isize);
    }
}
