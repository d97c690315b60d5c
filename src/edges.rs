use std::collections::BTreeMap;

use crate::grid::{Grid, Island};

pub type Coord = (usize, usize);

/// A candidate bridge location between two orthogonally aligned islands with
/// nothing but water in between. `i < j` always holds and `(i, j)` is the
/// canonical key; `a`/`b` are the endpoint coordinates of `i`/`j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub a: Coord,
    pub b: Coord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Horizontal,
    Vertical,
}

impl Edge {
    fn orientation(&self) -> Orientation {
        if self.a.0 == self.b.0 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Discover every candidate edge by walking the four orthogonal directions
/// from each island until the border or the first non-empty cell. Each
/// unordered island pair yields at most one edge.
pub fn potential_edges(grid: &Grid, islands: &[Island]) -> Vec<Edge> {
    let index_at: BTreeMap<Coord, usize> = islands
        .iter()
        .map(|isl| ((isl.row, isl.col), isl.index))
        .collect();

    let mut edges: BTreeMap<(usize, usize), Edge> = BTreeMap::new();
    let directions: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

    for island in islands {
        for (dr, dc) in directions {
            let mut rr = island.row as isize + dr;
            let mut cc = island.col as isize + dc;

            while grid.in_bounds(rr, cc) {
                let (ur, uc) = (rr as usize, cc as usize);
                if grid.value(ur, uc) > 0 {
                    let other = index_at[&(ur, uc)];
                    let (i, j) = (island.index.min(other), island.index.max(other));
                    let (a, b) = if island.index == i {
                        ((island.row, island.col), (ur, uc))
                    } else {
                        ((ur, uc), (island.row, island.col))
                    };
                    edges.entry((i, j)).or_insert(Edge { i, j, a, b });
                    break;
                }
                rr += dr;
                cc += dc;
            }
        }
    }

    edges.into_values().collect()
}

/// Proper orthogonal crossing test: the edges share no endpoint, one is
/// horizontal and one vertical, and each one's fixed coordinate lies strictly
/// inside the other's span. Strictness matters: edges meeting at a shared
/// island are not crossings.
pub fn edges_cross(e1: &Edge, e2: &Edge) -> bool {
    if e1.i == e2.i || e1.i == e2.j || e1.j == e2.i || e1.j == e2.j {
        return false;
    }

    let (h, v) = match (e1.orientation(), e2.orientation()) {
        (Orientation::Horizontal, Orientation::Vertical) => (e1, e2),
        (Orientation::Vertical, Orientation::Horizontal) => (e2, e1),
        _ => return false,
    };

    let r = h.a.0;
    let c = v.a.1;
    let (cmin, cmax) = (h.a.1.min(h.b.1), h.a.1.max(h.b.1));
    let (rmin, rmax) = (v.a.0.min(v.b.0), v.a.0.max(v.b.0));
    rmin < r && r < rmax && cmin < c && c < cmax
}
