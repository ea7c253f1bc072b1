// SPDX-License-Identifier: MPL-2.0
//! Meek's orientation rules R1-R4 and their closure to a fixed point.
//!
//! The rules are stated in Judea Pearl's 'Causality - Models, Reasoning,
//! and Inference' (2009; 2nd edition) on page 51. The PC algorithm needs
//! R1-R3; R4 is implemented but sits behind a flag because it is never
//! required when the v-structure phase ran on a consistent skeleton.

use itertools::Itertools;

use crate::{discovery::PcError, PDAG};

/// Selects which Meek rules the closure applies.
///
/// R1-R3 always run; `apply_r4` additionally enables R4. The default is
/// R4 off, which is what the PC driver uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeekRules {
    /// Whether to apply rule R4 at the end of every pass.
    pub apply_r4: bool,
}

/// Applies Meek's rules to a PDAG until a full pass changes nothing.
///
/// Each pass runs R1, R2, R3 and optionally R4 in that order, then compares
/// the matrix against its pre-pass value; equality is the fixed point.
/// Termination is guaranteed because every rule only turns undirected edges
/// into directed ones and never adds an edge.
pub fn meek_closure(pdag: &PDAG, rules: MeekRules) -> Result<PDAG, PcError> {
    let mut current = pdag.clone();
    let mut pass = 0usize;

    loop {
        let before = current.clone();

        apply_rule_r1(&mut current)?;
        apply_rule_r2(&mut current)?;
        apply_rule_r3(&mut current)?;
        if rules.apply_r4 {
            apply_rule_r4(&mut current)?;
        }

        pass += 1;
        if current == before {
            log::debug!("orientation rules reached a fixed point after {pass} pass(es)");
            return Ok(current);
        }
    }
}

/// Orients `from -> to` by clearing the `(to, from)` cell, guarding the
/// invariants of the edge encoding.
///
/// Writing against an existing reverse orientation would leave a pair with
/// no cells set; that configuration is reachable when noisy tests produced
/// conflicting v-structures, so it is skipped and logged rather than
/// applied. A rule firing on a pair with no edge at all cannot arise from
/// any input and is reported as a bug.
fn orient(pdag: &mut PDAG, from: usize, to: usize, rule: &'static str) -> Result<(), PcError> {
    if pdag.has_undirected(from, to) {
        log::debug!("{rule}: orienting {from} -> {to}");
        pdag.remove_edge_orientation(to, from);
        Ok(())
    } else if pdag.has_directed(from, to) {
        // already oriented as required
        Ok(())
    } else if pdag.has_directed(to, from) {
        log::warn!("{rule}: not orienting {from} -> {to}, the reverse orientation is present");
        Ok(())
    } else {
        Err(PcError::InvariantViolation { rule, from, to })
    }
}

/// R1, orient away from colliders: if `a -> b`, `b -- c` and `a`, `c` are
/// non-adjacent, orient `b -> c`. Leaving `b -- c` undirected would allow
/// `c -> b`, a v-structure the collider phase did not find.
fn apply_rule_r1(pdag: &mut PDAG) -> Result<(), PcError> {
    for (a, c) in pdag.non_adjacent_pairs() {
        for b in 0..pdag.n_nodes() {
            if b != a && b != c && pdag.has_directed(a, b) && pdag.has_undirected(b, c) {
                orient(pdag, b, c, "R1")?;
            }
        }
    }
    Ok(())
}

/// R2, acyclicity propagation: if `a -- b` and a chain `a -> c -> b`
/// exists, orient `a -> b`; the reverse would close a directed cycle.
fn apply_rule_r2(pdag: &mut PDAG) -> Result<(), PcError> {
    // pairs are snapshotted, premises are re-read on the live matrix; a pair
    // oriented meanwhile is resolved by the guard in `orient`
    for (a, b) in pdag.undirected_adjacent_pairs() {
        let chain_exists = (0..pdag.n_nodes())
            .any(|c| c != a && c != b && pdag.has_directed(a, c) && pdag.has_directed(c, b));
        if chain_exists {
            orient(pdag, a, b, "R2")?;
        }
    }
    Ok(())
}

/// R3, the double-parent rule: if `a -- b` and two non-adjacent undirected
/// neighbours `c`, `d` of `a` are both parents of `b`, orient `a -> b`.
fn apply_rule_r3(pdag: &mut PDAG) -> Result<(), PcError> {
    for (a, b) in pdag.undirected_adjacent_pairs() {
        let neighbours: Vec<usize> = pdag
            .adjacent_undirected_of(a)
            .into_iter()
            .filter(|&u| u != b)
            .collect();
        let found = neighbours.iter().tuple_combinations::<(_, _)>().any(|(&c, &d)| {
            !pdag.is_adjacent(c, d) && pdag.has_directed(c, b) && pdag.has_directed(d, b)
        });
        if found {
            orient(pdag, a, b, "R3")?;
        }
    }
    Ok(())
}

/// R4: if `a -- b`, some `d` is an undirected neighbour of `a` and a parent
/// of `b`, and some `c` is a parent of `d`, an undirected neighbour of `a`
/// and non-adjacent to `b`, orient `a -> b`.
fn apply_rule_r4(pdag: &mut PDAG) -> Result<(), PcError> {
    for (a, b) in pdag.undirected_adjacent_pairs() {
        let neighbours = pdag.adjacent_undirected_of(a);
        let found = neighbours
            .iter()
            .filter(|&&d| d != b && pdag.has_directed(d, b))
            .any(|&d| {
                neighbours.iter().any(|&c| {
                    c != d && pdag.has_directed(c, d) && !pdag.is_adjacent(c, b)
                })
            });
        if found {
            orient(pdag, a, b, "R4")?;
        }
    }
    Ok(())
}
