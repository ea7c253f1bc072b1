// SPDX-License-Identifier: MPL-2.0
//! The driver sequencing skeleton discovery, collider orientation and the
//! Meek closure.

use crate::{
    discovery::{discover_skeleton, meek_closure, orient_colliders, MeekRules, PcError},
    independence::IndependenceTest,
    separation_sets::SeparationSets,
    PDAG,
};

/// The outcome of a PC run: the CPDAG of the Markov equivalence class and
/// the separating sets that justified every removed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcResult {
    /// The completed partially directed acyclic graph.
    pub cpdag: PDAG,
    /// The separating sets recorded during skeleton discovery.
    pub separation_sets: SeparationSets,
}

/// Runs the PC algorithm over `n_vars` variables against the supplied
/// independence test at significance `level`.
///
/// The phases run in order on a single graph handed off by value: the
/// adjacency phase produces the undirected skeleton and the separating
/// sets, the collider phase orients the unshielded v-structures, and the
/// Meek closure propagates the implied orientations to a fixed point. Any
/// test failure surfaces unchanged and discards the partial graph.
pub fn run_pc<T>(
    n_vars: usize,
    test: &T,
    level: f64,
    rules: MeekRules,
) -> Result<PcResult, PcError>
where
    T: IndependenceTest + ?Sized,
{
    let (skeleton, separation_sets) = discover_skeleton(n_vars, test, level)?;
    log::debug!(
        "skeleton discovered: {} edges over {} vertices",
        skeleton.n_edges(),
        skeleton.n_nodes()
    );

    let pdag = orient_colliders(&skeleton, &separation_sets);
    let cpdag = meek_closure(&pdag, rules)?;

    Ok(PcResult {
        cpdag,
        separation_sets,
    })
}

#[cfg(test)]
mod test {
    use super::run_pc;
    use crate::{
        discovery::MeekRules,
        independence::{CiTestError, DSeparationOracle, IndependenceTest},
        PcError,
    };

    struct FailingTest;

    impl IndependenceTest for FailingTest {
        fn indep(&self, _: usize, _: usize, _: f64) -> Result<bool, CiTestError> {
            Err(CiTestError::new("broken predicate"))
        }
        fn cind(&self, _: usize, _: usize, _: &[usize], _: f64) -> Result<bool, CiTestError> {
            Err(CiTestError::new("broken predicate"))
        }
    }

    #[test]
    fn predicate_failure_surfaces() {
        let result = run_pc(3, &FailingTest, 0.05, MeekRules::default());
        match result {
            Err(PcError::CiTest(err)) => {
                assert!(err.to_string().contains("broken predicate"));
            }
            other => panic!("expected CiTest error, got {other:?}"),
        }
    }

    #[test]
    fn input_shape_is_checked_first() {
        assert!(matches!(
            run_pc(1, &FailingTest, 0.05, MeekRules::default()),
            Err(PcError::TooFewVariables { n_vars: 1 })
        ));
    }

    #[test]
    fn result_packages_both_outputs() {
        // 0 -> 1 <- 2
        let dag = crate::PDAG::from_vecvec(vec![
            vec![0, 1, 0], //
            vec![0, 0, 0],
            vec![0, 1, 0],
        ]);
        let oracle = DSeparationOracle::new(&dag);

        let result = run_pc(3, &oracle, 0.05, MeekRules::default()).unwrap();

        assert_eq!(result.cpdag, dag);
        assert!(result.separation_sets.separators(0, 2).contains(&vec![]));
    }
}
