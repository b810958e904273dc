//! Multi-point flux approximation (L-method).
//!
//! Each interior face gets one interaction-volume solve per face vertex; the
//! two half-face coefficient rows are summed into the full-face stencil.
//! Half faces touching the domain boundary and whole boundary faces fall
//! back to the two-point scheme.

pub mod criterion;
pub mod region;
pub mod volume;

pub use criterion::{DiagonalDominance, SelectionCriterion};
pub use region::InteractionRegion;
pub use volume::{InteractionVolume, SolvedRegion};

use crate::cache::FluxVarsCache;
use crate::error::FluxResult;
use crate::filler::{CacheFiller, FillContext};
use crate::tpfa::{interior_transmissibility, TpfaFiller};
use pf_core::Real;
use pf_grid::SubControlVolumeFace;
use std::collections::BTreeMap;

pub struct MpfaFiller {
    criterion: Box<dyn SelectionCriterion>,
    solution_dependent: bool,
}

impl Default for MpfaFiller {
    fn default() -> Self {
        Self::new()
    }
}

impl MpfaFiller {
    pub fn new() -> Self {
        Self {
            criterion: Box::new(DiagonalDominance),
            solution_dependent: false,
        }
    }

    pub fn with_criterion(criterion: Box<dyn SelectionCriterion>) -> Self {
        Self {
            criterion,
            solution_dependent: false,
        }
    }

    /// Mark the cached coefficients as solution dependent so that `update`
    /// recomputes them after every solution change.
    pub fn with_solution_dependency(mut self, flag: bool) -> Self {
        self.solution_dependent = flag;
        self
    }
}

impl CacheFiller for MpfaFiller {
    fn fill(
        &self,
        cache: &mut FluxVarsCache,
        scvf: &SubControlVolumeFace,
        ctx: &FillContext<'_>,
    ) -> FluxResult<()> {
        if scvf.boundary() {
            return TpfaFiller::new().fill(cache, scvf, ctx);
        }
        let inside = scvf.inside_scv_idx();
        let outside = scvf.outside_scv_idx().unwrap_or(inside);
        // BTreeMap keeps the stencil ordering deterministic
        let mut coeffs: BTreeMap<usize, Real> = BTreeMap::new();
        for vertex in scvf.vertex_indices() {
            if ctx.grid.is_boundary_vertex(vertex)? {
                // no interaction volume at the boundary: two-point half face
                let t = 0.5 * interior_transmissibility(scvf, ctx)?;
                *coeffs.entry(inside).or_insert(0.0) += t;
                *coeffs.entry(outside).or_insert(0.0) -= t;
            } else {
                let iv = InteractionVolume::for_face(ctx.grid, scvf.index(), vertex)?;
                let solved = iv.solve(ctx.permeability, self.criterion.as_ref())?;
                let (row, _) = solved.flux_row(inside)?;
                for (&t, c) in row.iter().zip(solved.stencil()) {
                    *coeffs.entry(c).or_insert(0.0) += t;
                }
            }
        }
        let stencil: Vec<usize> = coeffs.keys().copied().collect();
        let tij: Vec<Real> = coeffs.values().copied().collect();
        cache.set_transmissibilities(stencil, tij, None, ctx.sign_switched(scvf)?)
    }

    fn solution_dependent(&self) -> bool {
        self.solution_dependent
    }
}
