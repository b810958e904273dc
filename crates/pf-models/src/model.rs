//! Capability traits connecting physical models to the residual engine.
//!
//! The engine owns the orchestration (reset, volume terms, interior fluxes,
//! boundary); models supply storage, flux, source, and boundary behavior
//! through these traits. Boundary methods have no default implementation:
//! every concrete model must decide its boundary handling explicitly.

use crate::error::ModelResult;
use crate::facevars::{FaceVariables, FaceVarsView};
use crate::problem::Problem;
use crate::volvars::{VolVarsView, VolumeVariables};
use pf_core::Real;
use pf_flux::ElementFluxVarsCache;
use pf_grid::{CartesianGrid, FvElementGeometry, SubControlVolume, SubControlVolumeFace};

/// Everything one local evaluation may read. The views always reflect the
/// current solution; previous-step variables are passed explicitly to the
/// storage methods by the engine.
pub struct EvalContext<'a> {
    pub problem: &'a dyn Problem,
    pub grid: &'a CartesianGrid,
    pub fv_geometry: &'a FvElementGeometry,
    pub vol_vars: &'a dyn VolVarsView,
    pub face_vars: Option<&'a dyn FaceVarsView>,
    pub flux_caches: &'a ElementFluxVarsCache,
}

/// A physical model assembled at cell centers.
pub trait CellCenterModel {
    /// Number of cell-center equations.
    fn num_eq(&self) -> usize;

    /// Conserved quantity per unit volume, one entry per equation.
    fn storage(&self, scv: &SubControlVolume, vol: &VolumeVariables) -> Vec<Real>;

    /// Flux across one interior face, positive out of the bound element.
    fn flux(&self, ctx: &EvalContext<'_>, scvf: &SubControlVolumeFace) -> ModelResult<Vec<Real>>;

    /// Volumetric source, positive as production. Defaults to the problem's
    /// source field.
    fn source(&self, ctx: &EvalContext<'_>, scv: &SubControlVolume) -> Vec<Real> {
        (0..self.num_eq())
            .map(|eq| ctx.problem.source(scv, eq))
            .collect()
    }

    /// Apply the boundary contribution of one boundary face to the
    /// residual, either by adding a flux or by residual substitution.
    fn boundary(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        residual: &mut [Real],
    ) -> ModelResult<()>;
}

/// Extension for staggered models carrying one normal-velocity degree of
/// freedom per face in addition to the cell-center equations.
pub trait StaggeredModel: CellCenterModel {
    /// Momentum per unit volume at a face degree of freedom.
    fn storage_face(&self, vol: &VolumeVariables, face: &FaceVariables) -> Real;

    /// Momentum flux of the half control volume inside the bound element:
    /// frontal and lateral advection, viscous diffusion, and the pressure
    /// term.
    fn flux_face(&self, ctx: &EvalContext<'_>, scvf: &SubControlVolumeFace) -> ModelResult<Real>;

    /// Momentum source at the face degree of freedom.
    fn source_face(&self, ctx: &EvalContext<'_>, scvf: &SubControlVolumeFace) -> Real {
        ctx.problem.source_face(scvf)
    }

    /// Boundary handling of the momentum equation.
    fn boundary_face(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        residual: &mut Real,
    ) -> ModelResult<()>;
}
