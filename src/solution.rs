use std::collections::{BTreeMap, HashSet};

use crate::dsu::Dsu;
use crate::grid::{Grid, Island};

/// A placed bridge: canonical island pair plus multiplicity 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bridge {
    pub i: usize,
    pub j: usize,
    pub count: u8,
}

/// Decodes a model into bridges. Multiplicity is `(vx ∨ vd) + vd`, so it is
/// always 0, 1, or 2; zero-count edges are dropped.
pub fn extract_solution(
    model: &[isize],
    edge_vars: &BTreeMap<(usize, usize), (isize, isize)>,
) -> Vec<Bridge> {
    let positives: HashSet<isize> = model.iter().copied().filter(|&lit| lit > 0).collect();

    let mut solution = Vec::new();
    for (&(i, j), &(vx, vd)) in edge_vars {
        let use_x = positives.contains(&vx);
        let use_d = positives.contains(&vd);
        let count = (use_x || use_d) as u8 + use_d as u8;
        if count > 0 {
            solution.push(Bridge { i, j, count });
        }
    }
    solution
}

/// All islands in one component. Trivially true for zero or one island.
pub fn check_connected(n_islands: usize, bridges: &[Bridge]) -> bool {
    if n_islands <= 1 {
        return true;
    }
    let mut dsu = Dsu::new(n_islands);
    for bridge in bridges {
        dsu.merge(bridge.i, bridge.j);
    }
    let root = dsu.root(0);
    (1..n_islands).all(|i| dsu.root(i) == root)
}

/// Each island's incident multiplicities sum to its declared degree.
pub fn check_degrees(islands: &[Island], bridges: &[Bridge]) -> bool {
    let mut sums = vec![0u32; islands.len()];
    for bridge in bridges {
        sums[bridge.i] += bridge.count as u32;
        sums[bridge.j] += bridge.count as u32;
    }
    islands
        .iter()
        .all(|island| sums[island.index] == island.degree as u32)
}

/// Full acceptance test for a candidate model: decode it, then require a
/// single connected component and exact degree sums. The CNF alone cannot
/// express connectivity, so rejected models get blocked by the engines.
pub fn validate_model(
    islands: &[Island],
    edge_vars: &BTreeMap<(usize, usize), (isize, isize)>,
    model: &[isize],
) -> bool {
    let solution = extract_solution(model, edge_vars);
    check_connected(islands.len(), &solution) && check_degrees(islands, &solution)
}

/// Renders the solved board: islands as their digit, horizontal bridges as
/// `-`/`=`, vertical as `|`/`$`, water as `0`, tokens space-separated.
pub fn render(grid: &Grid, islands: &[Island], bridges: &[Bridge]) -> String {
    let mut board: Vec<Vec<char>> = (0..grid.rows())
        .map(|r| {
            (0..grid.cols())
                .map(|c| char::from(b'0' + grid.value(r, c)))
                .collect()
        })
        .collect();

    for bridge in bridges {
        let a = islands[bridge.i];
        let b = islands[bridge.j];

        if a.row == b.row {
            let symbol = if bridge.count == 1 { '-' } else { '=' };
            let (lo, hi) = (a.col.min(b.col), a.col.max(b.col));
            for col in lo + 1..hi {
                board[a.row][col] = symbol;
            }
        } else {
            let symbol = if bridge.count == 1 { '|' } else { '$' };
            let (lo, hi) = (a.row.min(b.row), a.row.max(b.row));
            for row in lo + 1..hi {
                board[row][a.col] = symbol;
            }
        }
    }

    board
        .iter()
        .map(|row| {
            row.iter()
                .map(|ch| ch.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Re-parses a rendered board back into islands and bridges, the inverse of
/// [`render`] for bridges that span at least one cell. Returns `None` for
/// tokens outside the output alphabet.
pub fn recognize(rendered: &str) -> Option<(Vec<Island>, Vec<Bridge>)> {
    let board: Vec<Vec<char>> = rendered
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|token| {
                    let mut chars = token.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) if "012345678-=|$".contains(ch) => Some(ch),
                        _ => None,
                    }
                })
                .collect()
        })
        .collect::<Option<Vec<Vec<char>>>>()?;

    let mut islands = Vec::new();
    let mut index_at: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (r, row) in board.iter().enumerate() {
        for (c, &ch) in row.iter().enumerate() {
            if let Some(degree) = ch.to_digit(10).filter(|&d| d > 0) {
                index_at.insert((r, c), islands.len());
                islands.push(Island {
                    index: islands.len(),
                    row: r,
                    col: c,
                    degree: degree as u8,
                });
            }
        }
    }

    let mut bridges = Vec::new();
    for island in &islands {
        // Rightward run of horizontal bridge symbols.
        if let Some(&next) = board[island.row].get(island.col + 1)
            && (next == '-' || next == '=')
        {
            let mut col = island.col + 1;
            while board[island.row].get(col) == Some(&next) {
                col += 1;
            }
            let other = index_at.get(&(island.row, col))?;
            bridges.push(Bridge {
                i: island.index,
                j: *other,
                count: if next == '-' { 1 } else { 2 },
            });
        }
        // Downward run of vertical bridge symbols.
        if let Some(row_below) = board.get(island.row + 1)
            && let Some(&next) = row_below.get(island.col)
            && (next == '|' || next == '$')
        {
            let mut row = island.row + 1;
            while board.get(row).and_then(|r| r.get(island.col)) == Some(&next) {
                row += 1;
            }
            let other = index_at.get(&(row, island.col))?;
            bridges.push(Bridge {
                i: island.index,
                j: *other,
                count: if next == '|' { 1 } else { 2 },
            });
        }
    }

    Some((islands, bridges))
}
