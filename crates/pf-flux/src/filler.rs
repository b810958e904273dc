//! Cache filler contract shared by the two-point and multi-point schemes.
//!
//! A filler computes the per-face transmissibility data for one bound
//! element. Fills are pure functions of grid geometry, material data, and
//! boundary conditions; filling the same face twice yields identical caches.

use crate::cache::{ElementFluxVarsCache, FluxVarsCache};
use crate::error::{FluxError, FluxResult};
use nalgebra::Matrix2;
use pf_core::Real;
use pf_grid::{CartesianGrid, FvElementGeometry, SubControlVolumeFace};

/// Pressure boundary condition of a single face, as seen by the cache fill.
/// Neumann faces carry no cached data; their flux comes from the residual's
/// boundary hook.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceBc {
    Dirichlet(Real),
    Neumann,
}

/// Cell-wise permeability tensors. Implemented by closures for tests and by
/// the spatial parameters of a problem.
pub trait PermeabilityField {
    fn tensor(&self, cell: usize) -> Matrix2<Real>;
}

impl<F: Fn(usize) -> Matrix2<Real>> PermeabilityField for F {
    fn tensor(&self, cell: usize) -> Matrix2<Real> {
        self(cell)
    }
}

/// Diagonal isotropic tensor, the common case in tests.
pub fn isotropic(k: Real) -> Matrix2<Real> {
    Matrix2::new(k, 0.0, 0.0, k)
}

/// Diagonal entries of a permeability tensor must be strictly positive;
/// violations surface as typed errors on every code path.
pub fn validate_tensor(cell: usize, k: &Matrix2<Real>) -> FluxResult<()> {
    for d in 0..2 {
        let v = k[(d, d)];
        if !(v.is_finite() && v > 0.0) {
            return Err(FluxError::NonPositivePermeability { cell, value: v });
        }
    }
    Ok(())
}

/// Everything a fill needs besides the face itself.
pub struct FillContext<'a> {
    pub grid: &'a CartesianGrid,
    pub fv_geometry: &'a FvElementGeometry,
    pub permeability: &'a dyn PermeabilityField,
    pub boundary: &'a dyn Fn(&SubControlVolumeFace) -> FaceBc,
}

impl FillContext<'_> {
    /// Whether the element-local face is flipped against the grid's
    /// canonical face orientation.
    pub fn sign_switched(&self, scvf: &SubControlVolumeFace) -> FluxResult<bool> {
        let canonical = self.grid.face(scvf.index())?;
        Ok(canonical.inside_scv_idx() != scvf.inside_scv_idx())
    }
}

pub trait CacheFiller {
    /// Compute and store the transmissibility data of one face.
    fn fill(
        &self,
        cache: &mut FluxVarsCache,
        scvf: &SubControlVolumeFace,
        ctx: &FillContext<'_>,
    ) -> FluxResult<()>;

    /// Whether cached coefficients depend on the current solution (e.g.
    /// permeability depending on pressure). Defaults to purely geometric.
    fn solution_dependent(&self) -> bool {
        false
    }

    /// Refresh after a solution change. Stencil topology never changes here;
    /// solution-independent caches are left untouched.
    fn update(
        &self,
        cache: &mut FluxVarsCache,
        scvf: &SubControlVolumeFace,
        ctx: &FillContext<'_>,
    ) -> FluxResult<()> {
        if self.solution_dependent() {
            self.fill(cache, scvf, ctx)?;
        }
        Ok(())
    }

    /// Fill caches for every face of the bound element.
    fn fill_element(&self, ctx: &FillContext<'_>) -> FluxResult<ElementFluxVarsCache> {
        let mut caches = Vec::with_capacity(ctx.fv_geometry.scvfs().len());
        for scvf in ctx.fv_geometry.scvfs() {
            let mut cache = FluxVarsCache::new(scvf.index());
            self.fill(&mut cache, scvf, ctx)?;
            caches.push(cache);
        }
        Ok(ElementFluxVarsCache::new(caches))
    }
}
