//! Incompressible-capable Navier-Stokes model on the staggered grid:
//! mass (and optionally energy) at cell centers, normal velocities at
//! faces.

use crate::bctypes::BcKind;
use crate::error::{ModelError, ModelResult};
use crate::facevars::FaceVariables;
use crate::model::{CellCenterModel, EvalContext, StaggeredModel};
use crate::volvars::VolumeVariables;
use pf_core::Real;
use pf_grid::{SubControlVolume, SubControlVolumeFace};

pub const MASS_EQ: usize = 0;
pub const ENERGY_EQ: usize = 1;

#[derive(Clone, Copy, Debug, Default)]
pub struct NavierStokesStaggered {
    enable_energy: bool,
}

impl NavierStokesStaggered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_energy_balance(mut self, flag: bool) -> Self {
        self.enable_energy = flag;
        self
    }

    fn face_vars(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
    ) -> ModelResult<FaceVariables> {
        ctx.face_vars
            .map(|v| v.get(scvf.index()))
            .ok_or(ModelError::MissingFaceVariables { face: scvf.index() })
    }

    /// Volume flow rate out of the bound element through the face.
    fn volume_flux(scvf: &SubControlVolumeFace, vars: &FaceVariables) -> Real {
        vars.velocity_self * scvf.outer_normal_scalar() * scvf.area()
    }

    fn advective_cc_flux(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        upwind_inside_only: bool,
    ) -> ModelResult<Vec<Real>> {
        let vars = self.face_vars(ctx, scvf)?;
        let vol_flux = Self::volume_flux(scvf, &vars);
        let inside = ctx.vol_vars.get(scvf.inside_scv_idx());
        let up = match scvf.outside_scv_idx() {
            Some(outside) if vol_flux < 0.0 && !upwind_inside_only => ctx.vol_vars.get(outside),
            _ => inside,
        };
        let mut flux = vec![up.density * vol_flux];
        if self.enable_energy {
            let mut heat = up.density * up.enthalpy * vol_flux;
            if let Some(outside_idx) = scvf.outside_scv_idx() {
                let outside = ctx.vol_vars.get(outside_idx);
                heat += conduction(ctx, scvf, &inside, &outside, outside_idx)?;
            }
            flux.push(heat);
        }
        Ok(flux)
    }
}

/// Two-point Fourier conduction between the adjacent cell centers, modeled
/// as thermal resistances in series. Inactive when a conductivity is zero.
fn conduction(
    ctx: &EvalContext<'_>,
    scvf: &SubControlVolumeFace,
    inside: &VolumeVariables,
    outside: &VolumeVariables,
    outside_idx: usize,
) -> ModelResult<Real> {
    if inside.thermal_conductivity <= 0.0 || outside.thermal_conductivity <= 0.0 {
        return Ok(0.0);
    }
    let d_in = (scvf.center() - ctx.grid.cell_center(scvf.inside_scv_idx())?).norm();
    let d_out = (scvf.center() - ctx.grid.cell_center(outside_idx)?).norm();
    let resistance = d_in / inside.thermal_conductivity + d_out / outside.thermal_conductivity;
    Ok(scvf.area() * (inside.temperature - outside.temperature) / resistance)
}

impl CellCenterModel for NavierStokesStaggered {
    fn num_eq(&self) -> usize {
        if self.enable_energy {
            2
        } else {
            1
        }
    }

    fn storage(&self, _scv: &SubControlVolume, vol: &VolumeVariables) -> Vec<Real> {
        let mut s = vec![vol.density];
        if self.enable_energy {
            s.push(vol.density * vol.internal_energy);
        }
        s
    }

    fn flux(&self, ctx: &EvalContext<'_>, scvf: &SubControlVolumeFace) -> ModelResult<Vec<Real>> {
        self.advective_cc_flux(ctx, scvf, false)
    }

    fn boundary(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        residual: &mut [Real],
    ) -> ModelResult<()> {
        if residual.len() < self.num_eq() {
            return Err(ModelError::ResidualSizeMismatch {
                need: self.num_eq(),
                got: residual.len(),
            });
        }
        let bc = ctx.problem.boundary_types(scvf);
        for eq in 0..self.num_eq() {
            match bc.kind(eq) {
                // prescribed flux wins over anything the face velocity says
                BcKind::Neumann => residual[eq] += ctx.problem.neumann(scvf, eq) * scvf.area(),
                BcKind::Dirichlet | BcKind::Outflow => {
                    let flux = self.advective_cc_flux(ctx, scvf, true)?;
                    residual[eq] += flux[eq];
                }
                BcKind::Symmetry => {}
            }
        }
        Ok(())
    }
}

impl StaggeredModel for NavierStokesStaggered {
    fn storage_face(&self, vol: &VolumeVariables, face: &FaceVariables) -> Real {
        vol.density * face.velocity_self
    }

    fn flux_face(&self, ctx: &EvalContext<'_>, scvf: &SubControlVolumeFace) -> ModelResult<Real> {
        let vars = self.face_vars(ctx, scvf)?;
        let inside = ctx.vol_vars.get(scvf.inside_scv_idx());
        let sign = scvf.outer_normal_scalar();
        let area = scvf.area();
        let (dx, dy) = ctx.grid.spacing();
        let (normal_spacing, lateral_spacing) = if scvf.direction_index() == 0 {
            (dx, dy)
        } else {
            (dy, dx)
        };

        let mut flux = 0.0;

        // frontal face at the inside cell center, outward normal opposite
        // the staggered face normal
        let v_avg = 0.5 * (vars.velocity_self + vars.velocity_opposite);
        let frontal_out = -sign * v_avg * area;
        let transported = if frontal_out > 0.0 {
            vars.velocity_self
        } else {
            vars.velocity_opposite
        };
        flux += inside.density * frontal_out * transported;
        flux +=
            inside.viscosity * area * (vars.velocity_self - vars.velocity_opposite) / normal_spacing;

        // lateral faces of the half control volume
        let lateral_area = 0.5 * normal_spacing;
        for lat in vars.lateral {
            let out_flux = lat.sign * lat.transporting * lateral_area;
            let transported = if out_flux > 0.0 {
                vars.velocity_self
            } else {
                lat.parallel
            };
            flux += inside.density * out_flux * transported;
            flux +=
                inside.viscosity * lateral_area * (vars.velocity_self - lat.parallel)
                    / lateral_spacing;
        }

        // pressure force of the inside cell on the face plane; a Neumann
        // momentum condition prescribes the boundary-plane stress, so the
        // interior pressure must not act there
        let neumann_momentum =
            scvf.boundary() && ctx.problem.boundary_types_face(scvf).kind(0) == BcKind::Neumann;
        if !neumann_momentum {
            let p_ref = ctx.problem.reference_pressure().unwrap_or(0.0);
            flux += (inside.pressure - p_ref) * area * sign.signum();
        }
        Ok(flux)
    }

    fn boundary_face(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        residual: &mut Real,
    ) -> ModelResult<()> {
        let vars = self.face_vars(ctx, scvf)?;
        match ctx.problem.boundary_types_face(scvf).kind(0) {
            // residual substitution: the momentum equation is replaced
            BcKind::Dirichlet => {
                *residual = vars.velocity_self - ctx.problem.dirichlet_face(scvf);
                Ok(())
            }
            BcKind::Symmetry => {
                *residual = vars.velocity_self;
                Ok(())
            }
            // the boundary-plane stress is the prescribed traction; only the
            // interior half-volume fluxes from `flux_face` remain alongside it
            BcKind::Neumann => {
                *residual += ctx.problem.neumann_face(scvf) * scvf.area();
                Ok(())
            }
            BcKind::Outflow => {
                if ctx.problem.boundary_types(scvf).kind(MASS_EQ) != BcKind::Dirichlet {
                    return Err(ModelError::OutflowWithoutDirichletPressure {
                        face: scvf.index(),
                    });
                }
                // zero-gradient advection through the boundary face itself
                let inside = ctx.vol_vars.get(scvf.inside_scv_idx());
                let out_flux = Self::volume_flux(scvf, &vars);
                *residual += inside.density * out_flux * vars.velocity_self;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bctypes::BoundaryTypes;
    use crate::facevars::LateralVelocities;
    use crate::problem::Problem;
    use pf_flux::{isotropic, CacheFiller, ElementFluxVarsCache, FaceBc, FillContext, TpfaFiller};
    use pf_grid::CartesianGrid;

    struct Channel;

    impl Problem for Channel {
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
            0.0
        }
    }

    fn caches_for(grid: &CartesianGrid, cell: usize) -> ElementFluxVarsCache {
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

    fn uniform_face_vars(v: Real) -> impl Fn(usize) -> FaceVariables {
        move |_| FaceVariables {
            velocity_self: v,
            velocity_opposite: v,
            lateral: [
                LateralVelocities {
                    transporting: 0.0,
                    parallel: v,
                    sign: 1.0,
                },
                LateralVelocities {
                    transporting: 0.0,
                    parallel: v,
                    sign: -1.0,
                },
            ],
        }
    }

    fn eval_ctx<'a>(
        problem: &'a Channel,
        grid: &'a CartesianGrid,
        fv: &'a pf_grid::FvElementGeometry,
        vols: &'a dyn crate::volvars::VolVarsView,
        faces: &'a dyn crate::facevars::FaceVarsView,
        caches: &'a ElementFluxVarsCache,
    ) -> EvalContext<'a> {
        EvalContext {
            problem,
            grid,
            fv_geometry: fv,
            vol_vars: vols,
            face_vars: Some(faces),
            flux_caches: caches,
        }
    }

    #[test]
    fn mass_flux_upwinds_density() {
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let caches = caches_for(&grid, 0);
        let problem = Channel;
        let vols = |dof: usize| VolumeVariables {
            density: if dof == 0 { 2.0 } else { 5.0 },
            ..Default::default()
        };
        let faces = uniform_face_vars(1.0);
        let ctx = eval_ctx(&problem, &grid, &fv, &vols, &faces, &caches);
        let model = NavierStokesStaggered::new();
        let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
        // outward flow from cell 0: inside density transported
        let flux = model.flux(&ctx, shared).unwrap();
        assert!((flux[MASS_EQ] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_flow_momentum_fluxes_cancel_across_a_face() {
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let problem = Channel;
        let model = NavierStokesStaggered::new();
        let vols = |_: usize| VolumeVariables::default();
        let faces = uniform_face_vars(3.0);
        let mut total = 0.0;
        for cell in [0usize, 1] {
            let fv = grid.bind(cell).unwrap();
            let caches = caches_for(&grid, cell);
            let ctx = eval_ctx(&problem, &grid, &fv, &vols, &faces, &caches);
            let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
            total += model.flux_face(&ctx, shared).unwrap();
        }
        assert!(total.abs() < 1e-12, "net momentum flux {total}");
    }

    #[test]
    fn pressure_difference_drives_the_face_residual() {
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let problem = Channel;
        let model = NavierStokesStaggered::new();
        let vols = |dof: usize| VolumeVariables {
            pressure: if dof == 0 { 10.0 } else { 4.0 },
            ..Default::default()
        };
        let faces = uniform_face_vars(0.0);
        let mut total = 0.0;
        for cell in [0usize, 1] {
            let fv = grid.bind(cell).unwrap();
            let caches = caches_for(&grid, cell);
            let ctx = eval_ctx(&problem, &grid, &fv, &vols, &faces, &caches);
            let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
            total += model.flux_face(&ctx, shared).unwrap();
        }
        // (p_left - p_right) * area
        assert!((total - 6.0).abs() < 1e-12);
    }

    #[test]
    fn linear_shear_profile_has_zero_viscous_imbalance() {
        // Couette-like: v_x varies linearly across the lateral direction
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let problem = Channel;
        let model = NavierStokesStaggered::new();
        let vols = |_: usize| VolumeVariables {
            viscosity: 7.0,
            ..Default::default()
        };
        let gamma = 2.0;
        let faces = move |_: usize| FaceVariables {
            velocity_self: 1.0,
            velocity_opposite: 1.0,
            lateral: [
                LateralVelocities {
                    transporting: 0.0,
                    parallel: 1.0 + gamma,
                    sign: 1.0,
                },
                LateralVelocities {
                    transporting: 0.0,
                    parallel: 1.0 - gamma,
                    sign: -1.0,
                },
            ],
        };
        let mut total = 0.0;
        for cell in [0usize, 1] {
            let fv = grid.bind(cell).unwrap();
            let caches = caches_for(&grid, cell);
            let ctx = eval_ctx(&problem, &grid, &fv, &vols, &faces, &caches);
            let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
            total += model.flux_face(&ctx, shared).unwrap();
        }
        assert!(total.abs() < 1e-12, "viscous imbalance {total}");
    }

    #[test]
    fn dirichlet_face_substitutes_the_residual() {
        let grid = CartesianGrid::new(1, 1, 1.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let caches = caches_for(&grid, 0);
        let problem = Channel;
        let model = NavierStokesStaggered::new();
        let vols = |_: usize| VolumeVariables::default();
        let faces = uniform_face_vars(2.5);
        let ctx = eval_ctx(&problem, &grid, &fv, &vols, &faces, &caches);
        let boundary = &fv.scvfs()[0];
        let mut residual = 99.0;
        model.boundary_face(&ctx, boundary, &mut residual).unwrap();
        // Channel prescribes zero velocity everywhere
        assert!((residual - 2.5).abs() < 1e-12);
    }

    #[test]
    fn neumann_face_prescribes_the_boundary_stress() {
        // quiescent fluid under pressure: the interior pressure force must
        // not leak past a prescribed boundary traction
        struct Traction {
            value: Real,
        }
        impl Problem for Traction {
            fn boundary_types(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
                BoundaryTypes::all_neumann(1)
            }
            fn boundary_types_face(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
                BoundaryTypes::all_neumann(1)
            }
            fn dirichlet(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
                0.0
            }
            fn neumann(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
                0.0
            }
            fn source(&self, _scv: &SubControlVolume, _eq: usize) -> Real {
                0.0
            }
            fn neumann_face(&self, _scvf: &SubControlVolumeFace) -> Real {
                self.value
            }
        }

        let grid = CartesianGrid::new(1, 1, 1.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let caches = caches_for(&grid, 0);
        let problem = Traction { value: 2.5 };
        let model = NavierStokesStaggered::new();
        let vols = |_: usize| VolumeVariables {
            pressure: 10.0,
            ..Default::default()
        };
        let faces = uniform_face_vars(0.0);
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: Some(&faces),
            flux_caches: &caches,
        };
        let boundary = &fv.scvfs()[0];
        let mut residual = model.flux_face(&ctx, boundary).unwrap();
        model.boundary_face(&ctx, boundary, &mut residual).unwrap();
        assert!(
            (residual - 2.5).abs() < 1e-12,
            "boundary stress not prescribed: residual {residual}"
        );
    }

    #[test]
    fn outflow_without_dirichlet_pressure_is_fatal() {
        struct BadOutflow;
        impl Problem for BadOutflow {
            fn boundary_types(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
                BoundaryTypes::all_neumann(1)
            }
            fn boundary_types_face(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
                let mut bc = BoundaryTypes::all_dirichlet(1);
                bc.set(0, BcKind::Outflow);
                bc
            }
            fn dirichlet(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
                0.0
            }
            fn neumann(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
                0.0
            }
            fn source(&self, _scv: &SubControlVolume, _eq: usize) -> Real {
                0.0
            }
        }
        let grid = CartesianGrid::new(1, 1, 1.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let perm = |_: usize| isotropic(1.0);
        let boundary = |_: &SubControlVolumeFace| FaceBc::Neumann;
        let fill_ctx = FillContext {
            grid: &grid,
            fv_geometry: &fv,
            permeability: &perm,
            boundary: &boundary,
        };
        let caches = TpfaFiller::new().fill_element(&fill_ctx).unwrap();
        let problem = BadOutflow;
        let vols = |_: usize| VolumeVariables::default();
        let faces = uniform_face_vars(1.0);
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: Some(&faces),
            flux_caches: &caches,
        };
        let model = NavierStokesStaggered::new();
        let mut residual = 0.0;
        let err = model
            .boundary_face(&ctx, &fv.scvfs()[0], &mut residual)
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::OutflowWithoutDirichletPressure { .. }
        ));
    }

    #[test]
    fn energy_balance_adds_an_equation() {
        let base = NavierStokesStaggered::new();
        assert_eq!(base.num_eq(), 1);
        let with_energy = base.with_energy_balance(true);
        assert_eq!(with_energy.num_eq(), 2);
        let vol = VolumeVariables {
            density: 2.0,
            internal_energy: 3.0,
            ..Default::default()
        };
        let scv = SubControlVolume::new(1.0, nalgebra::Vector2::new(0.5, 0.5), 0, 0);
        assert_eq!(with_energy.storage(&scv, &vol), vec![2.0, 6.0]);
    }
}
