//! Two-point flux approximation.
//!
//! Half transmissibilities are combined harmonically across interior faces;
//! Dirichlet boundary faces use the inside half directly.

use crate::cache::{DirichletData, FluxVarsCache};
use crate::error::{FluxError, FluxResult};
use crate::filler::{validate_tensor, CacheFiller, FaceBc, FillContext};
use nalgebra::Matrix2;
use pf_core::Real;
use pf_grid::{Point, SubControlVolumeFace};

/// Half transmissibility of one side: `A * (n . K d) / |d|^2` with `d` the
/// vector from the cell center to the face center and `n` the outer normal
/// of that cell.
pub(crate) fn half_transmissibility(
    scvf: &SubControlVolumeFace,
    cell_center: Point,
    outer_normal: Point,
    k: &Matrix2<Real>,
) -> Real {
    let d = scvf.center() - cell_center;
    scvf.area() * outer_normal.dot(&(k * d)) / d.norm_squared()
}

/// Harmonic full-face transmissibility of an interior face, positive when
/// oriented outward from the inside cell.
pub(crate) fn interior_transmissibility(
    scvf: &SubControlVolumeFace,
    ctx: &FillContext<'_>,
) -> FluxResult<Real> {
    let inside = scvf.inside_scv_idx();
    let outside = scvf
        .outside_scv_idx()
        .ok_or(FluxError::VanishingTransmissibility { face: scvf.index() })?;
    let k_in = ctx.permeability.tensor(inside);
    let k_out = ctx.permeability.tensor(outside);
    validate_tensor(inside, &k_in)?;
    validate_tensor(outside, &k_out)?;
    let t_in = half_transmissibility(
        scvf,
        ctx.grid.cell_center(inside)?,
        scvf.unit_outer_normal(),
        &k_in,
    );
    let t_out = half_transmissibility(
        scvf,
        ctx.grid.cell_center(outside)?,
        -scvf.unit_outer_normal(),
        &k_out,
    );
    let sum = t_in + t_out;
    if sum.abs() < Real::EPSILON * (t_in.abs() + t_out.abs()).max(1.0) {
        return Err(FluxError::VanishingTransmissibility { face: scvf.index() });
    }
    Ok(t_in * t_out / sum)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TpfaFiller {
    solution_dependent: bool,
}

impl TpfaFiller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the cached coefficients as solution dependent so that `update`
    /// recomputes them after every solution change.
    pub fn with_solution_dependency(mut self, flag: bool) -> Self {
        self.solution_dependent = flag;
        self
    }
}

impl CacheFiller for TpfaFiller {
    fn fill(
        &self,
        cache: &mut FluxVarsCache,
        scvf: &SubControlVolumeFace,
        ctx: &FillContext<'_>,
    ) -> FluxResult<()> {
        let inside = scvf.inside_scv_idx();
        let switched = ctx.sign_switched(scvf)?;

        match scvf.outside_scv_idx() {
            Some(outside) => {
                let t = interior_transmissibility(scvf, ctx)?;
                let (stencil, tij) = if inside < outside {
                    (vec![inside, outside], vec![t, -t])
                } else {
                    (vec![outside, inside], vec![-t, t])
                };
                cache.set_transmissibilities(stencil, tij, None, switched)
            }
            None => {
                let k_in = ctx.permeability.tensor(inside);
                validate_tensor(inside, &k_in)?;
                let t_in = half_transmissibility(
                    scvf,
                    ctx.grid.cell_center(inside)?,
                    scvf.unit_outer_normal(),
                    &k_in,
                );
                match (ctx.boundary)(scvf) {
                    FaceBc::Dirichlet(value) => cache.set_transmissibilities(
                        vec![inside],
                        vec![t_in],
                        Some(DirichletData {
                            coefficient: -t_in,
                            value,
                        }),
                        switched,
                    ),
                    // flux handled by the residual's Neumann hook
                    FaceBc::Neumann => {
                        cache.set_transmissibilities(vec![], vec![], None, switched)
                    }
                }
            }
        }
    }

    fn solution_dependent(&self) -> bool {
        self.solution_dependent
    }
}
