// SPDX-License-Identifier: MPL-2.0
//! Defines the PDAG struct shared by the skeleton, v-structure and Meek phases.

use std::fmt;

use rand::distributions::Distribution;

/// A partially directed graph over vertices `0..n_nodes`, stored as a dense
/// row-major `{0,1}` adjacency matrix.
///
/// The two cells of an ordered pair encode the edge state:
///
/// | `M[i,j]` | `M[j,i]` | meaning |
/// |---|---|---|
/// | 0 | 0 | no edge |
/// | 1 | 1 | undirected `i -- j` |
/// | 1 | 0 | directed `i -> j` |
/// | 0 | 1 | directed `j -> i` |
///
/// Orientation is expressed by asymmetry alone, so orienting an edge is a
/// single cell clear. The diagonal is always zero. The same struct passes
/// through all three lifecycle stages of the PC algorithm: the undirected
/// skeleton, the PDAG with v-structures, and the final CPDAG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PDAG {
    /// Row-major cells, len `n_nodes * n_nodes`.
    amat: Vec<u8>,
    /// The number of nodes in the graph.
    n_nodes: usize,
}

/// Displays the adjacency matrix row by row, as the literal it was built from.
impl fmt::Display for PDAG {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.n_nodes {
            writeln!(f)?;
            for col in 0..self.n_nodes {
                write!(f, "{} ", self.entry(row, col))?;
            }
        }
        Ok(())
    }
}

impl PDAG {
    /// Creates the complete undirected graph on `n_nodes` vertices, the
    /// starting point of skeleton discovery.
    pub fn complete(n_nodes: usize) -> PDAG {
        let mut amat = vec![1u8; n_nodes * n_nodes];
        for v in 0..n_nodes {
            amat[v * n_nodes + v] = 0;
        }
        PDAG { amat, n_nodes }
    }

    /// Creates the graph on `n_nodes` vertices with no edges.
    pub fn empty(n_nodes: usize) -> PDAG {
        PDAG {
            amat: vec![0u8; n_nodes * n_nodes],
            n_nodes,
        }
    }

    /// Creates a PDAG from a row-major adjacency matrix with the two-cell
    /// edge encoding described on [`PDAG`].
    ///
    /// Panics if the matrix is not square, has a nonzero diagonal entry, or
    /// contains a cell outside `{0,1}`.
    pub fn from_vecvec(vecvec: Vec<Vec<u8>>) -> PDAG {
        let n_nodes = vecvec.len();
        let mut amat = Vec::with_capacity(n_nodes * n_nodes);
        for (row_idx, row) in vecvec.iter().enumerate() {
            assert!(
                row.len() == n_nodes,
                "adjacency matrix must be square, row {row_idx} has length {}",
                row.len()
            );
            for (col_idx, &val) in row.iter().enumerate() {
                match val {
                    0 | 1 => {
                        if row_idx == col_idx && val != 0 {
                            panic!("found self-loop at position ({row_idx}, {col_idx})");
                        }
                        amat.push(val);
                    }
                    _ => panic!(
                        "found value '{val}' at position ({row_idx}, {col_idx}), expected only 0's and 1's"
                    ),
                }
            }
        }
        PDAG { amat, n_nodes }
    }

    /// Returns the adjacency matrix as nested vectors, row-major.
    pub fn to_vecvec(&self) -> Vec<Vec<u8>> {
        (0..self.n_nodes)
            .map(|row| self.amat[row * self.n_nodes..(row + 1) * self.n_nodes].to_vec())
            .collect()
    }

    /// The number of nodes in the graph.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// The matrix cell for the ordered pair `(from, to)`.
    pub fn entry(&self, from: usize, to: usize) -> u8 {
        self.amat[from * self.n_nodes + to]
    }

    /// True iff the directed edge `from -> to` is present.
    pub fn has_directed(&self, from: usize, to: usize) -> bool {
        self.entry(from, to) == 1 && self.entry(to, from) == 0
    }

    /// True iff the undirected edge `u -- v` is present.
    pub fn has_undirected(&self, u: usize, v: usize) -> bool {
        self.entry(u, v) == 1 && self.entry(v, u) == 1
    }

    /// True iff any edge connects `u` and `v`, regardless of orientation.
    pub fn is_adjacent(&self, u: usize, v: usize) -> bool {
        self.entry(u, v) == 1 || self.entry(v, u) == 1
    }

    /// Given a node, return all nodes reachable by an outgoing directed edge.
    /// Returned in ascending order.
    pub fn children_of(&self, node: usize) -> Vec<usize> {
        (0..self.n_nodes)
            .filter(|&u| self.has_directed(node, u))
            .collect()
    }

    /// Given a node, return all nodes with a directed edge into it.
    /// Returned in ascending order.
    pub fn parents_of(&self, node: usize) -> Vec<usize> {
        (0..self.n_nodes)
            .filter(|&u| self.has_directed(u, node))
            .collect()
    }

    /// Given a node, return all nodes connected to it by an undirected edge.
    /// Returned in ascending order.
    pub fn adjacent_undirected_of(&self, node: usize) -> Vec<usize> {
        (0..self.n_nodes)
            .filter(|&u| self.has_undirected(node, u))
            .collect()
    }

    /// Given a node, return all nodes connected to it by any edge.
    /// Returned in ascending order.
    pub fn adjacent_of(&self, node: usize) -> Vec<usize> {
        (0..self.n_nodes)
            .filter(|&u| u != node && self.is_adjacent(node, u))
            .collect()
    }

    /// All ordered pairs `(i, j)` such that some edge connects `i` and `j`.
    ///
    /// An undirected edge `i -- j` contributes both `(i, j)` and `(j, i)`;
    /// a directed edge contributes both orderings as well, since adjacency
    /// here is orientation-blind.
    pub fn adjacent_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.n_nodes {
            for j in 0..self.n_nodes {
                if i != j && self.is_adjacent(i, j) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// All ordered pairs `(i, j)` connected by an undirected edge; both
    /// orderings are included.
    pub fn undirected_adjacent_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.n_nodes {
            for j in 0..self.n_nodes {
                if i != j && self.has_undirected(i, j) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// All ordered pairs `(i, j)`, `i != j`, with no edge between `i` and
    /// `j`; both orderings are included.
    pub fn non_adjacent_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..self.n_nodes {
            for j in 0..self.n_nodes {
                if i != j && !self.is_adjacent(i, j) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// All unshielded triples `(a, b, c)`: `a` and `c` are non-adjacent
    /// while `b` is adjacent to both (orientation-blind).
    ///
    /// Each triple is yielded once, with `a < c`. Consumers must not rely
    /// on that ordering; the orientation writes they derive are symmetric
    /// in `a` and `c` anyway.
    pub fn unshielded_triples(&self) -> Vec<(usize, usize, usize)> {
        let mut triples = Vec::new();
        for a in 0..self.n_nodes {
            for c in a + 1..self.n_nodes {
                if self.is_adjacent(a, c) {
                    continue;
                }
                for b in 0..self.n_nodes {
                    if b != a && b != c && self.is_adjacent(a, b) && self.is_adjacent(c, b) {
                        triples.push((a, b, c));
                    }
                }
            }
        }
        triples
    }

    /// Clears the cell `(src, dst)`. On an undirected edge this orients it
    /// as `dst -> src`; on the last remaining cell it removes the edge.
    pub fn remove_edge_orientation(&mut self, src: usize, dst: usize) {
        assert!(src != dst, "cannot operate on the diagonal ({src}, {dst})");
        self.amat[src * self.n_nodes + dst] = 0;
    }

    /// Clears both cells of the pair, removing any edge between `u` and `v`.
    /// Idempotent.
    pub fn detach(&mut self, u: usize, v: usize) {
        assert!(u != v, "cannot operate on the diagonal ({u}, {v})");
        self.amat[u * self.n_nodes + v] = 0;
        self.amat[v * self.n_nodes + u] = 0;
    }

    /// True iff the matrix is symmetric, i.e. every present edge is
    /// undirected. Holds for every skeleton-phase output.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n_nodes).all(|i| (i + 1..self.n_nodes).all(|j| self.entry(i, j) == self.entry(j, i)))
    }

    /// True iff the graph contains no undirected edge.
    pub fn is_fully_directed(&self) -> bool {
        (0..self.n_nodes).all(|i| (i + 1..self.n_nodes).all(|j| !self.has_undirected(i, j)))
    }

    /// The number of edges, counting each unordered pair once.
    pub fn n_edges(&self) -> usize {
        (0..self.n_nodes)
            .map(|i| (i + 1..self.n_nodes).filter(|&j| self.is_adjacent(i, j)).count())
            .sum()
    }

    /// True iff the subgraph of directed edges is acyclic.
    /// An implementation of Kahn's algorithm for topological sorting;
    /// undirected edges are ignored.
    pub fn directed_part_is_acyclic(&self) -> bool {
        let mut in_degree: Vec<usize> = (0..self.n_nodes)
            .map(|v| self.parents_of(v).len())
            .collect();

        let mut stack = Vec::new();

        // Fill stack with all roots.
        #[allow(clippy::needless_range_loop)]
        for u in 0..self.n_nodes {
            if in_degree[u] == 0 {
                stack.push(u);
            }
        }

        let mut visited = stack.len();

        // One by one destack vertices and enstack children whose in-degree
        // drops to 0, effectively removing edges from the graph.
        while let Some(current) = stack.pop() {
            for v in self.children_of(current) {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    stack.push(v);
                    visited += 1;
                }
            }
        }

        // Every node found its way to in-degree 0 exactly when there is no
        // directed cycle.
        visited == self.n_nodes
    }

    /// Creates a random DAG with the given edge density and size. All edges
    /// are directed, consistent with a uniformly drawn topological order.
    pub fn random_dag(edge_density: f64, graph_size: usize, mut rng: impl rand::RngCore) -> PDAG {
        assert!(graph_size > 0, "graph size must be larger than 0");
        assert!(
            (0.0..=1.0).contains(&edge_density),
            "edge probability must be in [0, 1]"
        );
        let edge_dist = rand::distributions::Bernoulli::new(edge_density).unwrap();

        let mut graph = PDAG::empty(graph_size);
        let permutation = rand::seq::index::sample(&mut rng, graph_size, graph_size);
        for y in 0..graph_size {
            for x in y + 1..graph_size {
                if edge_dist.sample(&mut rng) {
                    let (from, to) = (permutation.index(x), permutation.index(y));
                    graph.amat[from * graph_size + to] = 1;
                }
            }
        }
        graph
    }
}
