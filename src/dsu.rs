/// Disjoint-set union over `n` elements, used to check that a bridge layout
/// connects every island into a single component.
///
/// A single signed array holds both roles: a root stores the negated size of
/// its component, a non-root stores its parent index.
pub struct Dsu {
    f: Vec<isize>,
}

impl Dsu {
    pub fn new(n: usize) -> Self {
        Dsu { f: vec![-1; n] }
    }

    /// Representative of `u`'s component, with full path compression.
    pub fn root(&mut self, u: usize) -> usize {
        let mut r = u;
        while self.f[r] >= 0 {
            r = self.f[r] as usize;
        }
        // Second pass: point everything on the walked path at the root.
        let mut cur = u;
        while self.f[cur] >= 0 {
            let parent = self.f[cur] as usize;
            self.f[cur] = r as isize;
            cur = parent;
        }
        r
    }

    /// Union by size; returns whether `u` and `v` were in distinct components.
    pub fn merge(&mut self, u: usize, v: usize) -> bool {
        let mut u = self.root(u);
        let mut v = self.root(v);
        if u == v {
            return false;
        }
        if self.f[u] > self.f[v] {
            std::mem::swap(&mut u, &mut v);
        }
        self.f[u] += self.f[v];
        self.f[v] = u as isize;
        true
    }
}
