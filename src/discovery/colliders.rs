// SPDX-License-Identifier: MPL-2.0
//! Orients the v-structures of a skeleton using the recorded separators.

use crate::{separation_sets::SeparationSets, PDAG};

/// Turns a skeleton into a PDAG by orienting every unshielded collider.
///
/// For each unshielded triple `a -- b -- c` (with `a`, `c` non-adjacent),
/// `b` must be a collider exactly when it did not take part in separating
/// `a` from `c`: if no recorded separator of `(a, c)` contains `b`, both
/// edges are oriented into `b`, giving `a -> b <- c`. Otherwise both edges
/// stay undirected.
///
/// The cell clears are idempotent, so a triple surfacing in both
/// orientations applies the same writes twice. With noisy tests two
/// overlapping v-structures may fight over one edge and strip both of its
/// cells; that is a property of the input verdicts, not an error.
pub fn orient_colliders(skeleton: &PDAG, separation_sets: &SeparationSets) -> PDAG {
    let mut pdag = skeleton.clone();

    for (a, b, c) in skeleton.unshielded_triples() {
        if !separation_sets.any_separator_contains(a, c, b) {
            log::debug!("v-structure found: {a} -> {b} <- {c}");
            pdag.remove_edge_orientation(b, a);
            pdag.remove_edge_orientation(b, c);
        }
    }

    pdag
}

#[cfg(test)]
mod test {
    use super::orient_colliders;
    use crate::{separation_sets::SeparationSets, PDAG};

    #[test]
    fn collider_is_oriented() {
        // skeleton 0 -- 1 -- 2 with 0 _||_ 2 unconditionally
        let skeleton = PDAG::from_vecvec(vec![
            vec![0, 1, 0], //
            vec![1, 0, 1],
            vec![0, 1, 0],
        ]);
        let mut sep = SeparationSets::new(3);
        sep.record(0, 2, &[]);

        let pdag = orient_colliders(&skeleton, &sep);

        // 0 -> 1 <- 2
        assert_eq!(
            pdag.to_vecvec(),
            vec![
                vec![0, 1, 0], //
                vec![0, 0, 0],
                vec![0, 1, 0],
            ]
        );
    }

    #[test]
    fn separator_membership_blocks_orientation() {
        // same skeleton, but 1 separated 0 from 2: no collider
        let skeleton = PDAG::from_vecvec(vec![
            vec![0, 1, 0], //
            vec![1, 0, 1],
            vec![0, 1, 0],
        ]);
        let mut sep = SeparationSets::new(3);
        sep.record(0, 2, &[1]);

        let pdag = orient_colliders(&skeleton, &sep);
        assert_eq!(pdag, skeleton);
    }

    #[test]
    fn shielded_triples_are_untouched() {
        // complete graph has no unshielded triple, nothing to orient
        let skeleton = PDAG::complete(4);
        let sep = SeparationSets::new(4);
        let pdag = orient_colliders(&skeleton, &sep);
        assert_eq!(pdag, skeleton);
    }

    #[test]
    fn overlapping_colliders_share_a_centre() {
        // skeleton 0 -- 2 -- 1, 3 -- 2; separators put 2 in no set, so
        // triples (0,2,1), (0,2,3), (1,2,3) all collide at 2
        let skeleton = PDAG::from_vecvec(vec![
            vec![0, 0, 1, 0], //
            vec![0, 0, 1, 0],
            vec![1, 1, 0, 1],
            vec![0, 0, 1, 0],
        ]);
        let mut sep = SeparationSets::new(4);
        sep.record(0, 1, &[]);
        sep.record(0, 3, &[]);
        sep.record(1, 3, &[]);

        let pdag = orient_colliders(&skeleton, &sep);

        // every edge points into 2
        assert_eq!(pdag.parents_of(2), vec![0, 1, 3]);
        assert!(pdag.children_of(2).is_empty());
        assert!(pdag.adjacent_undirected_of(2).is_empty());
    }

    #[test]
    fn figure_5_3_v_structures() {
        // skeleton of 0 -> 1 -> 2 -> 3, 4 -> 2, 4 -> 3
        let skeleton = PDAG::from_vecvec(vec![
            vec![0, 1, 0, 0, 0], //
            vec![1, 0, 1, 0, 0],
            vec![0, 1, 0, 1, 1],
            vec![0, 0, 1, 0, 1],
            vec![0, 0, 1, 1, 0],
        ]);
        let mut sep = SeparationSets::new(5);
        sep.record(0, 2, &[1]);
        sep.record(0, 3, &[1]);
        sep.record(0, 4, &[]);
        sep.record(1, 3, &[2, 4]);
        sep.record(1, 4, &[]);

        let pdag = orient_colliders(&skeleton, &sep);

        // the only unshielded collider is 1 -> 2 <- 4; the (1,2,3) triple is
        // blocked because 2 separated 1 from 3
        assert!(pdag.has_directed(1, 2));
        assert!(pdag.has_directed(4, 2));
        assert!(pdag.has_undirected(0, 1));
        assert!(pdag.has_undirected(2, 3));
        assert!(pdag.has_undirected(3, 4));
    }
}
