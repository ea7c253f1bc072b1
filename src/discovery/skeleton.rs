// SPDX-License-Identifier: MPL-2.0
//! The adjacency phase: level-by-level edge elimination driven by CI tests.

use itertools::Itertools;

use crate::{
    discovery::PcError, independence::IndependenceTest, separation_sets::SeparationSets, PDAG,
};

/// Discovers the causal skeleton and the separating sets.
///
/// Starts from the complete undirected graph on `n_vars` vertices and
/// removes every edge `x -- y` for which some conditioning set
/// `Z ⊆ adj(x) \ {y}` with `|Z| = depth` makes `x` and `y` independent,
/// growing `depth` from 0 until no vertex has enough neighbours left to
/// form a conditioning set.
///
/// At every depth the set of ordered adjacent pairs is snapshotted, while
/// the candidate set of each visited pair is recomputed on the live matrix,
/// so removals earlier in the level narrow later candidate sets. Both
/// orderings of a pair are visited; a pair already detached via its mirror
/// may therefore record additional, equivalent separators. Conditioning
/// sets are enumerated in ascending lexicographic order and the first
/// witness detaches the pair.
///
/// A failing CI test aborts the phase; the partial skeleton is dropped.
pub fn discover_skeleton<T>(
    n_vars: usize,
    test: &T,
    level: f64,
) -> Result<(PDAG, SeparationSets), PcError>
where
    T: IndependenceTest + ?Sized,
{
    if n_vars < 2 {
        return Err(PcError::TooFewVariables { n_vars });
    }

    let mut skeleton = PDAG::complete(n_vars);
    let mut separation_sets = SeparationSets::new(n_vars);
    let mut depth = 0usize;

    loop {
        let mut adjacent = skeleton.adjacent_pairs();
        adjacent.sort_unstable();

        // The stop flag is decided before any of this level's removals: the
        // loop ends once no pair can supply a conditioning set of this size.
        let stop = adjacent.iter().all(|&(x, y)| {
            skeleton.adjacent_of(x).iter().filter(|&&u| u != y).count() < depth
        });

        log::debug!(
            "depth {depth}: {} ordered adjacent pairs, stop = {stop}",
            adjacent.len()
        );

        for (x, y) in adjacent {
            let candidates: Vec<usize> = skeleton
                .adjacent_of(x)
                .into_iter()
                .filter(|&u| u != y)
                .collect();
            if candidates.len() < depth {
                continue;
            }

            if depth == 0 {
                log::trace!("testing {x} _||_ {y}");
                if test.indep(x, y, level)? {
                    log::debug!("independence found: {x} _||_ {y}");
                    skeleton.detach(x, y);
                    separation_sets.record(x, y, &[]);
                }
            } else {
                for z in candidates.into_iter().combinations(depth) {
                    log::trace!("testing {x} _||_ {y} | {z:?}");
                    if test.cind(x, y, &z, level)? {
                        log::debug!("independence found: {x} _||_ {y} | {z:?}");
                        skeleton.detach(x, y);
                        separation_sets.record(x, y, &z);
                        break;
                    }
                }
            }
        }

        depth += 1;
        if stop {
            break;
        }
    }

    Ok((skeleton, separation_sets))
}
