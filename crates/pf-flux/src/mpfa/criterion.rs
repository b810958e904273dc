//! Choice between the two candidate regions of an interior half face.

use nalgebra::Matrix2x3;
use pf_core::Real;

/// Pluggable selection rule. Receives the solved transmissibility matrices
/// of all candidates and returns the index of the one to keep. Must be
/// deterministic for identical inputs.
pub trait SelectionCriterion {
    fn select(&self, candidates: &[Matrix2x3<Real>]) -> usize;
}

/// Default rule: keep the candidate whose flux row is most diagonally
/// dominant, i.e. whose central-cell coefficient exceeds the off-center
/// couplings by the largest margin. Ties keep the first candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiagonalDominance;

impl SelectionCriterion for DiagonalDominance {
    fn select(&self, candidates: &[Matrix2x3<Real>]) -> usize {
        let margin =
            |t: &Matrix2x3<Real>| t[(0, 0)].abs() - t[(0, 1)].abs() - t[(0, 2)].abs();
        let mut best = 0;
        for (i, t) in candidates.iter().enumerate().skip(1) {
            if margin(t) > margin(&candidates[best]) {
                best = i;
            }
        }
        best
    }
}
