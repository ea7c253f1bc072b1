// SPDX-License-Identifier: MPL-2.0
#![warn(missing_docs)]
//! pcalg - constraint-based causal discovery with the PC algorithm
//!
//! Given an [`IndependenceTest`](independence::IndependenceTest) over `n`
//! variables (an oracle or a sample-based test), [`run_pc`] recovers the
//! CPDAG representing the Markov equivalence class of the generating DAG,
//! along with the separating sets found on the way. The three phases
//! (skeleton discovery, v-structure orientation, Meek closure) are also
//! exposed individually in [`discovery`].

mod partially_directed_graph;
mod separation_sets;

pub mod discovery;
pub mod independence;

pub use discovery::{run_pc, MeekRules, PcError, PcResult};
pub use partially_directed_graph::PDAG;
pub use separation_sets::SeparationSets;

#[cfg(test)]
mod test {
    use rand::SeedableRng;

    use crate::{
        discovery::{discover_skeleton, meek_closure, MeekRules},
        independence::{CiTestError, DSeparationOracle, IndependenceTest, TableOracle},
        run_pc, PDAG,
    };

    const LEVEL: f64 = 0.05;

    fn pc_on_dag(dag: &PDAG) -> (PDAG, crate::SeparationSets) {
        let oracle = DSeparationOracle::new(dag);
        let result = run_pc(dag.n_nodes(), &oracle, LEVEL, MeekRules::default()).unwrap();
        (result.cpdag, result.separation_sets)
    }

    #[test]
    fn collider_is_fully_identified() {
        // 0 -> 1 <- 2
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1, 0], //
            vec![0, 0, 0],
            vec![0, 1, 0],
        ]);
        let (cpdag, sep) = pc_on_dag(&dag);

        // the v-structure is fully identified
        assert_eq!(
            cpdag.to_vecvec(),
            vec![
                vec![0, 1, 0], //
                vec![0, 0, 0],
                vec![0, 1, 0],
            ]
        );
        assert_eq!(sep.separators(0, 2).len(), 1);
        assert!(sep.separators(0, 2).contains(&vec![]));
        assert!(sep.separators(0, 1).is_empty());
        assert!(sep.separators(1, 2).is_empty());
    }

    #[test]
    fn chain_stays_undirected() {
        // 0 -> 1 -> 2
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1, 0], //
            vec![0, 0, 1],
            vec![0, 0, 0],
        ]);
        let (cpdag, sep) = pc_on_dag(&dag);

        // the chain is Markov equivalent to its reversal and to the fork,
        // so every edge stays undirected
        assert_eq!(
            cpdag.to_vecvec(),
            vec![
                vec![0, 1, 0], //
                vec![1, 0, 1],
                vec![0, 1, 0],
            ]
        );
        assert!(sep.any_separator_contains(0, 2, 1));
    }

    #[test]
    fn figure_5_1_fork_and_chain() {
        // 0 -> 1, 1 -> 2, 1 -> 3, 2 -> 4, 3 -> 4
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1, 0, 0, 0], //
            vec![0, 0, 1, 1, 0],
            vec![0, 0, 0, 0, 1],
            vec![0, 0, 0, 0, 1],
            vec![0, 0, 0, 0, 0],
        ]);
        let (cpdag, sep) = pc_on_dag(&dag);

        // only the collider at 4 is identified
        assert_eq!(
            cpdag.to_vecvec(),
            vec![
                vec![0, 1, 0, 0, 0], //
                vec![1, 0, 1, 1, 0],
                vec![0, 1, 0, 0, 1],
                vec![0, 1, 0, 0, 1],
                vec![0, 0, 0, 0, 0],
            ]
        );
        assert!(sep.separators(0, 2).contains(&vec![1]));
        assert!(sep.separators(0, 3).contains(&vec![1]));
        assert!(sep.separators(2, 3).contains(&vec![1]));
        // 0 and 4 are separated by a set containing 1 but never by 4 itself
        assert!(sep.any_separator_contains(0, 4, 1));
        assert!(!sep.any_separator_contains(0, 4, 4));
    }

    #[test]
    fn figure_5_3_network() {
        // 0 -> 1 -> 2 -> 3, 4 -> 2, 4 -> 3
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1, 0, 0, 0], //
            vec![0, 0, 1, 0, 0],
            vec![0, 0, 0, 1, 0],
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 1, 1, 0],
        ]);
        let (cpdag, sep) = pc_on_dag(&dag);

        // v-structure 1 -> 2 <- 4 plus the propagated orientations 2 -> 3
        // and 4 -> 3; only 0 -- 1 stays undirected
        assert_eq!(
            cpdag.to_vecvec(),
            vec![
                vec![0, 1, 0, 0, 0], //
                vec![1, 0, 1, 0, 0],
                vec![0, 0, 0, 1, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 1, 1, 0],
            ]
        );
        assert!(sep.separators(0, 2).contains(&vec![1]));
        assert!(sep.separators(0, 3).contains(&vec![1]));
        assert!(sep.separators(0, 4).contains(&vec![]));
        assert!(sep.separators(1, 4).contains(&vec![]));
        assert!(sep.separators(1, 3).contains(&vec![2, 4]));
    }

    #[test]
    fn diamond_orients_only_the_collider() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3: only the collider at 3 is compelled,
        // since reversing both edges at 0 would create a new v-structure
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1, 1, 0], //
            vec![0, 0, 0, 1],
            vec![0, 0, 0, 1],
            vec![0, 0, 0, 0],
        ]);
        let (cpdag, sep) = pc_on_dag(&dag);

        assert_eq!(
            cpdag.to_vecvec(),
            vec![
                vec![0, 1, 1, 0], //
                vec![1, 0, 0, 1],
                vec![1, 0, 0, 1],
                vec![0, 0, 0, 0],
            ]
        );
        assert!(sep.separators(1, 2).contains(&vec![0]));
        assert!(sep.separators(0, 3).contains(&vec![1, 2]));
    }

    #[test]
    fn pipeline_from_truth_table() {
        // the collider scenario again, but through the CSV oracle interface
        let table = "\
X;Y;Conditioning Set;(Conditional) Independence Holds
x0;x1;[];False
x0;x1;[x2];False
x0;x2;[];True
x0;x2;[x1];False
x1;x2;[];False
x1;x2;[x0];False
";
        let oracle = TableOracle::from_reader(table.as_bytes(), &["x0", "x1", "x2"]).unwrap();
        let result = run_pc(3, &oracle, LEVEL, MeekRules::default()).unwrap();

        assert_eq!(
            result.cpdag.to_vecvec(),
            vec![
                vec![0, 1, 0], //
                vec![0, 0, 0],
                vec![0, 1, 0],
            ]
        );
    }

    #[test]
    fn complete_independence_gives_the_empty_cpdag() {
        struct AllIndependent;
        impl IndependenceTest for AllIndependent {
            fn indep(&self, _: usize, _: usize, _: f64) -> Result<bool, CiTestError> {
                Ok(true)
            }
            fn cind(&self, _: usize, _: usize, _: &[usize], _: f64) -> Result<bool, CiTestError> {
                Ok(true)
            }
        }

        let result = run_pc(6, &AllIndependent, LEVEL, MeekRules::default()).unwrap();
        assert_eq!(result.cpdag.n_edges(), 0);
    }

    #[test]
    fn complete_dependence_keeps_the_complete_undirected_graph() {
        struct AllDependent;
        impl IndependenceTest for AllDependent {
            fn indep(&self, _: usize, _: usize, _: f64) -> Result<bool, CiTestError> {
                Ok(false)
            }
            fn cind(&self, _: usize, _: usize, _: &[usize], _: f64) -> Result<bool, CiTestError> {
                Ok(false)
            }
        }

        let result = run_pc(5, &AllDependent, LEVEL, MeekRules::default()).unwrap();
        assert_eq!(result.cpdag, PDAG::complete(5));
    }

    #[test]
    fn two_vertex_graphs() {
        // 0 -> 1: the single edge survives but cannot be oriented
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1], //
            vec![0, 0],
        ]);
        let (cpdag, sep) = pc_on_dag(&dag);
        assert!(cpdag.has_undirected(0, 1));
        assert!(sep.separators(0, 1).is_empty());

        // two isolated vertices: empty CPDAG, the empty separator
        let dag = PDAG::empty(2);
        let (cpdag, sep) = pc_on_dag(&dag);
        assert_eq!(cpdag.n_edges(), 0);
        assert!(sep.separators(0, 1).contains(&vec![]));
    }

    #[test]
    fn rerunning_on_the_result_is_idempotent() {
        // the collider CPDAG is itself a DAG; feeding it back through the
        // pipeline reproduces it exactly
        let dag = PDAG::from_vecvec(vec![
            vec![0, 1, 0], //
            vec![0, 0, 0],
            vec![0, 1, 0],
        ]);
        let (cpdag, _) = pc_on_dag(&dag);
        let (again, _) = pc_on_dag(&cpdag);
        assert_eq!(cpdag, again);
    }

    #[test]
    fn property_pipeline_invariants_on_random_dags() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);

        for n in 2..9 {
            for density in [0.2, 0.5, 0.8] {
                let dag = PDAG::random_dag(density, n, &mut rng);
                let oracle = DSeparationOracle::new(&dag);

                let (skeleton, _) = discover_skeleton(n, &oracle, LEVEL).unwrap();
                let result = run_pc(n, &oracle, LEVEL, MeekRules::default()).unwrap();
                let cpdag = &result.cpdag;

                // the skeleton is symmetric and recovers the true adjacencies
                assert!(skeleton.is_symmetric());
                for i in 0..n {
                    assert_eq!(cpdag.entry(i, i), 0);
                    for j in i + 1..n {
                        assert_eq!(
                            skeleton.is_adjacent(i, j),
                            dag.is_adjacent(i, j),
                            "adjacency mismatch at ({i}, {j}) for n = {n}"
                        );
                        // orientation never adds or removes adjacencies
                        assert_eq!(cpdag.is_adjacent(i, j), skeleton.is_adjacent(i, j));
                    }
                }

                // the directed part of the CPDAG is acyclic
                assert!(cpdag.directed_part_is_acyclic());

                // every unshielded collider of the DAG is oriented
                for (a, b, c) in dag.unshielded_triples() {
                    if dag.has_directed(a, b) && dag.has_directed(c, b) {
                        assert!(cpdag.has_directed(a, b) && cpdag.has_directed(c, b));
                    }
                }

                // the closure really is a fixed point
                let reclosed = meek_closure(cpdag, MeekRules::default()).unwrap();
                assert_eq!(&reclosed, cpdag);

                // separating sets are mirrored, sorted and exclude endpoints
                for (&(x, y), separators) in result.separation_sets.iter() {
                    assert_eq!(separators, result.separation_sets.separators(y, x));
                    for z in separators {
                        assert!(z.windows(2).all(|w| w[0] < w[1]));
                        assert!(!z.contains(&x) && !z.contains(&y));
                    }
                }

                // a fully directed CPDAG is its own equivalence class:
                // rerunning the pipeline on it must reproduce it
                if cpdag.is_fully_directed() {
                    let rerun_oracle = DSeparationOracle::new(cpdag);
                    let rerun = run_pc(n, &rerun_oracle, LEVEL, MeekRules::default()).unwrap();
                    assert_eq!(&rerun.cpdag, cpdag);
                }
            }
        }
    }
}
