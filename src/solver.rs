use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::grid::Grid;
use crate::solution::render;
use crate::{astar, brute, dpll, sat_engine};

/// Cooperative cancellation flag shared between the engines and an
/// interrupt handler. Engines poll it and return "no solution" cleanly.
#[derive(Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The available solving engines, all driven by the same CNF model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Algo {
    /// External CDCL SAT solver with blocking-clause iteration.
    #[value(name = "sat", alias = "pysat")]
    Sat,
    /// Best-first search over partial assignments.
    #[value(name = "astar")]
    AStar,
    /// DPLL backtracking with unit propagation and clause learning.
    #[value(name = "backtrack")]
    Backtrack,
    /// Exhaustive enumeration baseline.
    #[value(name = "brute")]
    Brute,
}

impl Algo {
    pub fn name(self) -> &'static str {
        match self {
            Algo::Sat => "sat",
            Algo::AStar => "astar",
            Algo::Backtrack => "backtrack",
            Algo::Brute => "brute",
        }
    }
}

/// Runs the selected engine and renders the result. Unsolvable puzzles (and
/// cancelled runs) yield the empty string.
pub fn solve_grid(grid: &Grid, algo: Algo, cancel: &Cancel) -> String {
    info!(target: "solver", "solving with engine '{}'", algo.name());

    let bridges = match algo {
        Algo::Sat => sat_engine::solve(grid, cancel),
        Algo::AStar => astar::solve(grid, cancel),
        Algo::Backtrack => dpll::solve(grid, cancel),
        Algo::Brute => brute::solve(grid, cancel),
    };

    match bridges {
        Some(bridges) => {
            info!(target: "solver", "solution with {} bridged pairs", bridges.len());
            render(grid, &grid.islands(), &bridges)
        }
        None => {
            info!(target: "solver", "no solution");
            String::new()
        }
    }
}
