// SPDX-License-Identifier: MPL-2.0
//! An exact independence oracle reading d-separation off a known DAG.

use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::{
    independence::{CiTestError, IndependenceTest},
    PDAG,
};

/// Decides `X_x ⟂ X_y | X_Z` by d-separation in a ground-truth DAG.
///
/// With this oracle the PC algorithm recovers the CPDAG of the DAG's Markov
/// equivalence class exactly, which is what the pipeline tests rely on. The
/// significance level of the [`IndependenceTest`] calls is ignored.
///
/// The query uses the moralisation criterion: `x` and `y` are d-separated
/// given `Z` iff they are disconnected in the moralised subgraph induced by
/// the ancestors of `{x, y} ∪ Z`, after removing `Z`.
pub struct DSeparationOracle<'a> {
    dag: &'a PDAG,
}

impl<'a> DSeparationOracle<'a> {
    /// Wraps a DAG. Panics if the graph has undirected edges or a directed
    /// cycle, as d-separation is only defined here for DAGs.
    pub fn new(dag: &'a PDAG) -> DSeparationOracle<'a> {
        assert!(
            dag.is_fully_directed(),
            "d-separation oracle requires a fully directed graph"
        );
        assert!(
            dag.directed_part_is_acyclic(),
            "d-separation oracle requires an acyclic graph"
        );
        DSeparationOracle { dag }
    }

    /// True iff `x` and `y` are d-separated given `z` in the wrapped DAG.
    pub fn d_separated(&self, x: usize, y: usize, z: &[usize]) -> bool {
        assert!(x != y, "cannot separate a vertex from itself ({x})");
        assert!(
            !z.contains(&x) && !z.contains(&y),
            "conditioning set {z:?} must not contain either endpoint ({x}, {y})"
        );
        let n = self.dag.n_nodes();

        // ancestral closure of {x, y} ∪ z
        let mut ancestral = FxHashSet::default();
        let mut to_visit_stack = vec![x, y];
        to_visit_stack.extend_from_slice(z);
        while let Some(v) = to_visit_stack.pop() {
            if ancestral.insert(v) {
                to_visit_stack.extend(self.dag.parents_of(v));
            }
        }

        // moralise the induced subgraph: keep parent edges undirected and
        // marry co-parents (parents of an ancestral node are ancestral too,
        // so no membership filtering is needed)
        let mut moral = vec![false; n * n];
        for &v in &ancestral {
            let parents = self.dag.parents_of(v);
            for &p in &parents {
                moral[v * n + p] = true;
                moral[p * n + v] = true;
            }
            for (&p, &q) in parents.iter().tuple_combinations::<(_, _)>() {
                moral[p * n + q] = true;
                moral[q * n + p] = true;
            }
        }

        // x and y are dependent iff connected while walking around z
        let blocked: FxHashSet<usize> = z.iter().copied().collect();
        let mut visited = FxHashSet::default();
        visited.insert(x);
        let mut to_visit_stack = vec![x];
        while let Some(v) = to_visit_stack.pop() {
            for u in 0..n {
                if moral[v * n + u] && !blocked.contains(&u) && visited.insert(u) {
                    if u == y {
                        return false;
                    }
                    to_visit_stack.push(u);
                }
            }
        }
        true
    }
}

impl IndependenceTest for DSeparationOracle<'_> {
    fn indep(&self, x: usize, y: usize, _level: f64) -> Result<bool, CiTestError> {
        Ok(self.d_separated(x, y, &[]))
    }

    fn cind(&self, x: usize, y: usize, z: &[usize], _level: f64) -> Result<bool, CiTestError> {
        Ok(self.d_separated(x, y, z))
    }
}
