use std::collections::BTreeMap;

use itertools::Itertools;

/// Encodes the pseudo-Boolean equality `Σ wᵢ·xᵢ = k` into CNF clauses.
///
/// Sequential-counter construction: auxiliary state variables track the
/// reachable running sums after each input. `s[i][σ]` means "the first `i`
/// inputs sum to exactly `σ`"; a single state per level is live, and the
/// final level is pinned to `k`.
///
/// Fresh auxiliary variables are drawn from `next_var`, which is advanced
/// past everything allocated here. An unreachable `k` yields the trivially
/// unsatisfiable pair `[1], [-1]`.
pub fn encode_pb_equal(
    lits: &[isize],
    weights: &[u32],
    k: u32,
    next_var: &mut isize,
) -> Vec<Vec<isize>> {
    assert_eq!(lits.len(), weights.len());

    let n = lits.len();
    if n == 0 {
        return if k == 0 {
            Vec::new()
        } else {
            vec![vec![1], vec![-1]]
        };
    }

    let mut fresh = || {
        let v = *next_var;
        *next_var += 1;
        v
    };

    let mut clauses: Vec<Vec<isize>> = Vec::new();

    // Level 0: the empty prefix sums to 0.
    let mut prev: BTreeMap<u32, isize> = BTreeMap::new();
    let s00 = fresh();
    prev.insert(0, s00);
    clauses.push(vec![s00]);

    for i in 0..n {
        let x = lits[i];
        let w = weights[i];
        let mut curr: BTreeMap<u32, isize> = BTreeMap::new();

        for (&sum, &aux_prev) in &prev {
            // x false: the sum carries over.
            let aux_false = *curr.entry(sum).or_insert_with(&mut fresh);
            clauses.push(vec![-aux_prev, x, aux_false]);

            // x true: the sum grows by w.
            let aux_true = *curr.entry(sum + w).or_insert_with(&mut fresh);
            clauses.push(vec![-aux_prev, -x, aux_true]);
        }

        // Exactly one running sum is live at each level.
        for (&a, &b) in curr.values().tuple_combinations() {
            clauses.push(vec![-a, -b]);
        }

        prev = curr;
    }

    let Some(&goal) = prev.get(&k) else {
        return vec![vec![1], vec![-1]];
    };
    clauses.push(vec![goal]);
    for (&sum, &aux) in &prev {
        if sum != k {
            clauses.push(vec![-aux]);
        }
    }

    clauses
}
