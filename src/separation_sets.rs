// SPDX-License-Identifier: MPL-2.0
//! Stores the separating sets discovered during the adjacency phase.

use rustc_hash::{FxHashMap, FxHashSet};

/// Associates every ordered pair of distinct vertices with the set of
/// conditioning sets that witnessed the pair's (conditional) independence.
///
/// Conditioning sets are canonicalised to strictly ascending tuples before
/// insertion, and every write lands in both the `(x, y)` and `(y, x)` slot,
/// so the store is mirror-symmetric by construction. The empty tuple is a
/// valid separator and denotes unconditional independence. Written only by
/// skeleton discovery; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparationSets {
    sets: FxHashMap<(usize, usize), FxHashSet<Vec<usize>>>,
    n_nodes: usize,
}

impl SeparationSets {
    /// Creates the store for `n_nodes` vertices, with every ordered pair of
    /// distinct vertices mapped to the empty set.
    pub fn new(n_nodes: usize) -> SeparationSets {
        let mut sets = FxHashMap::default();
        for x in 0..n_nodes {
            for y in x + 1..n_nodes {
                sets.insert((x, y), FxHashSet::default());
                sets.insert((y, x), FxHashSet::default());
            }
        }
        SeparationSets { sets, n_nodes }
    }

    /// The number of vertices the store was initialised for.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Records `z` as a separating set for the pair `{x, y}`.
    ///
    /// `z` is sorted before insertion and written to both ordered slots.
    /// Duplicate insertions are idempotent. Panics if `x == y`, if either
    /// vertex is out of range, or if `z` contains `x` or `y`.
    pub fn record(&mut self, x: usize, y: usize, z: &[usize]) {
        assert!(x != y, "cannot separate a vertex from itself ({x})");
        assert!(
            !z.contains(&x) && !z.contains(&y),
            "separating set {z:?} must not contain either endpoint ({x}, {y})"
        );
        let mut sorted = z.to_vec();
        sorted.sort_unstable();

        self.sets
            .get_mut(&(x, y))
            .unwrap_or_else(|| panic!("pair ({x}, {y}) out of range for {} vertices", self.n_nodes))
            .insert(sorted.clone());
        self.sets
            .get_mut(&(y, x))
            .unwrap_or_else(|| panic!("pair ({y}, {x}) out of range for {} vertices", self.n_nodes))
            .insert(sorted);
    }

    /// The recorded separating sets for the pair `(x, y)`.
    pub fn separators(&self, x: usize, y: usize) -> &FxHashSet<Vec<usize>> {
        self.sets
            .get(&(x, y))
            .unwrap_or_else(|| panic!("pair ({x}, {y}) out of range for {} vertices", self.n_nodes))
    }

    /// True iff some recorded separator of `(x, y)` contains vertex `b`.
    pub fn any_separator_contains(&self, x: usize, y: usize, b: usize) -> bool {
        self.separators(x, y).iter().any(|z| z.contains(&b))
    }

    /// Iterates over all `(ordered pair, separators)` entries, in no
    /// particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &FxHashSet<Vec<usize>>)> {
        self.sets.iter()
    }
}
