// SPDX-License-Identifier: MPL-2.0
//! The three phases of the PC algorithm and the driver sequencing them.

use std::{error::Error, fmt};

use crate::independence::CiTestError;

mod colliders;
mod meek;
mod pc;
mod skeleton;

pub use colliders::orient_colliders;
pub use meek::{meek_closure, MeekRules};
pub use pc::{run_pc, PcResult};
pub use skeleton::discover_skeleton;

/// Error that can abort a run of the PC algorithm.
///
/// The algorithm recovers nothing locally: any failure surfaces to the
/// caller and the partial graph is discarded. Inconsistent verdicts from
/// noisy sample-based tests are *not* errors; the run proceeds and may
/// return a graph outside the true equivalence class.
#[derive(Debug)]
pub enum PcError {
    /// Fewer than two variables were supplied; there is no pair to test.
    TooFewVariables {
        /// The number of variables supplied.
        n_vars: usize,
    },
    /// A supplied independence test failed; the failure is wrapped
    /// unchanged.
    CiTest(CiTestError),
    /// An orientation rule fired on a pair with no edge left between the
    /// two vertices. This cannot happen on well-formed input and signals a
    /// bug in the rule engine.
    InvariantViolation {
        /// The rule whose write was rejected.
        rule: &'static str,
        /// Source vertex of the attempted orientation.
        from: usize,
        /// Target vertex of the attempted orientation.
        to: usize,
    },
}

impl Error for PcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PcError::CiTest(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for PcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcError::TooFewVariables { n_vars } => {
                write!(f, "need at least two variables, got {n_vars}")
            }
            PcError::CiTest(err) => write!(f, "{err}"),
            PcError::InvariantViolation { rule, from, to } => write!(
                f,
                "{rule} attempted to orient {from} -> {to} but no edge remains between them"
            ),
        }
    }
}

impl From<CiTestError> for PcError {
    fn from(err: CiTestError) -> PcError {
        PcError::CiTest(err)
    }
}
