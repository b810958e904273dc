//! Element-local residual evaluation.
//!
//! One evaluation walks `reset -> volume term (storage - source) -> interior
//! fluxes -> boundary` and returns a fresh residual; nothing is mutated
//! outside the returned value. Transient evaluations carry the time loop and
//! the previous-step variables in the [`TimeContext`], so a transient
//! storage term without a previous solution cannot be expressed.

use crate::error::AssemblyResult;
use pf_core::{Real, TimeLoop};
use pf_models::{
    CellCenterModel, EvalContext, FaceVarsView, ModelError, StaggeredModel, VolVarsView,
};
use pf_grid::SubControlVolumeFace;

/// Stationary or transient evaluation mode. The transient variant is only
/// constructible with a time loop and previous-step variables, which
/// replaces any "previous solution pointer set?" runtime state.
pub enum TimeContext<'a> {
    Stationary,
    Transient {
        time_loop: &'a TimeLoop,
        prev_vol_vars: &'a dyn VolVarsView,
        prev_face_vars: Option<&'a dyn FaceVarsView>,
    },
}

impl TimeContext<'_> {
    pub fn is_stationary(&self) -> bool {
        matches!(self, TimeContext::Stationary)
    }
}

/// Residual engine for cell-centered models.
pub struct CcLocalResidual<'m, M: CellCenterModel> {
    model: &'m M,
}

impl<'m, M: CellCenterModel> CcLocalResidual<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    /// Residual of the bound element, one entry per equation.
    pub fn eval(
        &self,
        ctx: &EvalContext<'_>,
        time: &TimeContext<'_>,
    ) -> AssemblyResult<Vec<Real>> {
        let n = self.model.num_eq();
        let mut residual = vec![0.0; n];
        let scv = ctx.fv_geometry.scv();
        let cur = ctx.vol_vars.get(scv.dof_index());

        // implicit Euler: storage difference over the step, flux and source
        // at the current time level
        if let TimeContext::Transient {
            time_loop,
            prev_vol_vars,
            ..
        } = time
        {
            let dt = time_loop.time_step_size();
            let prev = prev_vol_vars.get(scv.dof_index());
            let cur_storage = self.model.storage(scv, &cur);
            let prev_storage = self.model.storage(scv, &prev);
            for eq in 0..n {
                residual[eq] += (cur_storage[eq] * cur.extrusion_factor
                    - prev_storage[eq] * prev.extrusion_factor)
                    * scv.volume()
                    / dt;
            }
        }

        let source = self.model.source(ctx, scv);
        for eq in 0..n {
            residual[eq] -= source[eq] * scv.volume() * cur.extrusion_factor;
        }

        for scvf in ctx.fv_geometry.scvfs() {
            if scvf.boundary() {
                continue;
            }
            let flux = self.model.flux(ctx, scvf)?;
            for eq in 0..n {
                residual[eq] += flux[eq];
            }
        }

        for scvf in ctx.fv_geometry.scvfs() {
            if scvf.boundary() {
                self.model.boundary(ctx, scvf, &mut residual)?;
            }
        }
        Ok(residual)
    }
}

/// Residual engine for staggered models: cell-center equations per element
/// plus one momentum equation per (element, face) pair.
pub struct StaggeredLocalResidual<'m, M: StaggeredModel> {
    cell_center: CcLocalResidual<'m, M>,
    model: &'m M,
}

impl<'m, M: StaggeredModel> StaggeredLocalResidual<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self {
            cell_center: CcLocalResidual::new(model),
            model,
        }
    }

    /// Cell-center residual of the bound element.
    pub fn eval_cell_center(
        &self,
        ctx: &EvalContext<'_>,
        time: &TimeContext<'_>,
    ) -> AssemblyResult<Vec<Real>> {
        self.cell_center.eval(ctx, time)
    }

    /// Momentum residual of one face, for the half control volume inside the
    /// bound element. A face degree of freedom owns half of each adjacent
    /// cell, hence the half-volume weighting of storage and source.
    pub fn eval_face(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        time: &TimeContext<'_>,
    ) -> AssemblyResult<Real> {
        let scv = ctx.fv_geometry.scv();
        let half_volume = 0.5 * scv.volume();
        let cur_vol = ctx.vol_vars.get(scv.dof_index());
        let cur_face = ctx
            .face_vars
            .ok_or(ModelError::MissingFaceVariables { face: scvf.index() })?
            .get(scvf.index());

        let mut residual = 0.0;
        if let TimeContext::Transient {
            time_loop,
            prev_vol_vars,
            prev_face_vars,
        } = time
        {
            let prev_face_view =
                prev_face_vars.ok_or(ModelError::MissingFaceVariables { face: scvf.index() })?;
            let dt = time_loop.time_step_size();
            let prev_vol = prev_vol_vars.get(scv.dof_index());
            let prev_face = prev_face_view.get(scvf.index());
            let cur_storage = self.model.storage_face(&cur_vol, &cur_face);
            let prev_storage = self.model.storage_face(&prev_vol, &prev_face);
            residual += (cur_storage * cur_vol.extrusion_factor
                - prev_storage * prev_vol.extrusion_factor)
                * half_volume
                / dt;
        }

        residual -= self.model.source_face(ctx, scvf) * half_volume * cur_vol.extrusion_factor;
        residual += self.model.flux_face(ctx, scvf)?;
        if scvf.boundary() {
            self.model.boundary_face(ctx, scvf, &mut residual)?;
        }
        Ok(residual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_flux::{isotropic, CacheFiller, ElementFluxVarsCache, FaceBc, FillContext, TpfaFiller};
    use pf_grid::{CartesianGrid, SubControlVolume};
    use pf_models::{BoundaryTypes, Problem, SinglePhaseDarcy, VolumeVariables};

    struct Sealed {
        source: Real,
    }

    impl Problem for Sealed {
        fn boundary_types(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
            BoundaryTypes::all_neumann(1)
        }
        fn dirichlet(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
            0.0
        }
        fn neumann(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
            0.0
        }
        fn source(&self, _scv: &SubControlVolume, _eq: usize) -> Real {
            self.source
        }
    }

    fn caches(grid: &CartesianGrid, cell: usize) -> ElementFluxVarsCache {
        let fv = grid.bind(cell).unwrap();
        let perm = |_: usize| isotropic(1.0);
        let boundary = |_: &SubControlVolumeFace| FaceBc::Neumann;
        let ctx = FillContext {
            grid,
            fv_geometry: &fv,
            permeability: &perm,
            boundary: &boundary,
        };
        TpfaFiller::new().fill_element(&ctx).unwrap()
    }

    #[test]
    fn unchanged_solution_has_zero_storage_term() {
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let cache = caches(&grid, 0);
        let problem = Sealed { source: 0.3 };
        let vols = |dof: usize| VolumeVariables {
            pressure: 1.0 + dof as Real,
            ..Default::default()
        };
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: None,
            flux_caches: &cache,
        };
        let model = SinglePhaseDarcy;
        let engine = CcLocalResidual::new(&model);

        let stationary = engine.eval(&ctx, &TimeContext::Stationary).unwrap();
        let time_loop = TimeLoop::new(0.25).unwrap();
        let transient = engine
            .eval(
                &ctx,
                &TimeContext::Transient {
                    time_loop: &time_loop,
                    prev_vol_vars: &vols,
                    prev_face_vars: None,
                },
            )
            .unwrap();
        assert!((stationary[0] - transient[0]).abs() < 1e-14);
    }

    #[test]
    fn storage_difference_scales_with_inverse_step_size() {
        let grid = CartesianGrid::new(1, 1, 1.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let cache = caches(&grid, 0);
        let problem = Sealed { source: 0.0 };
        let cur = |_: usize| VolumeVariables {
            density: 2.0,
            ..Default::default()
        };
        let prev = |_: usize| VolumeVariables {
            density: 1.0,
            ..Default::default()
        };
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &cur,
            face_vars: None,
            flux_caches: &cache,
        };
        let model = SinglePhaseDarcy;
        let engine = CcLocalResidual::new(&model);
        let time_loop = TimeLoop::new(0.5).unwrap();
        let r = engine
            .eval(
                &ctx,
                &TimeContext::Transient {
                    time_loop: &time_loop,
                    prev_vol_vars: &prev,
                    prev_face_vars: None,
                },
            )
            .unwrap();
        // (2 - 1) * volume 1 / dt 0.5
        assert!((r[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn source_is_subtracted_over_the_volume() {
        let grid = CartesianGrid::new(1, 1, 2.0, 2.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let cache = caches(&grid, 0);
        let problem = Sealed { source: 0.25 };
        let vols = |_: usize| VolumeVariables::default();
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: None,
            flux_caches: &cache,
        };
        let model = SinglePhaseDarcy;
        let r = CcLocalResidual::new(&model)
            .eval(&ctx, &TimeContext::Stationary)
            .unwrap();
        // volume 4, source density 0.25
        assert!((r[0] + 1.0).abs() < 1e-12);
    }
}
