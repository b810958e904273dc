//! Single-phase Darcy flow: one mass-balance equation per cell.

use crate::bctypes::BcKind;
use crate::error::{ModelError, ModelResult};
use crate::model::{CellCenterModel, EvalContext};
use crate::volvars::VolumeVariables;
use pf_core::Real;
use pf_grid::{SubControlVolume, SubControlVolumeFace};

/// Darcy mass balance with fully upwinded mobility. The advective flux is
/// read from the transmissibility cache; the model only adds the
/// constitutive weighting.
#[derive(Clone, Copy, Debug, Default)]
pub struct SinglePhaseDarcy;

impl SinglePhaseDarcy {
    fn advective_mass_flux(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
    ) -> ModelResult<Real> {
        let cache = ctx.flux_caches.for_face(scvf.index())?;
        let potential = cache.advective_flux(&|dof| ctx.vol_vars.get(dof).pressure)?;
        let inside = ctx.vol_vars.get(scvf.inside_scv_idx());
        // full upwind; the boundary side has no volume variables, so
        // Dirichlet inflow also weights with the inside cell
        let up = match scvf.outside_scv_idx() {
            Some(outside) if potential < 0.0 => ctx.vol_vars.get(outside),
            _ => inside,
        };
        Ok(up.mobility() * up.density * potential)
    }
}

impl CellCenterModel for SinglePhaseDarcy {
    fn num_eq(&self) -> usize {
        1
    }

    fn storage(&self, _scv: &SubControlVolume, vol: &VolumeVariables) -> Vec<Real> {
        vec![vol.porosity * vol.density]
    }

    fn flux(&self, ctx: &EvalContext<'_>, scvf: &SubControlVolumeFace) -> ModelResult<Vec<Real>> {
        Ok(vec![self.advective_mass_flux(ctx, scvf)?])
    }

    fn boundary(
        &self,
        ctx: &EvalContext<'_>,
        scvf: &SubControlVolumeFace,
        residual: &mut [Real],
    ) -> ModelResult<()> {
        match ctx.problem.boundary_types(scvf).kind(0) {
            BcKind::Dirichlet => {
                residual[0] += self.advective_mass_flux(ctx, scvf)?;
                Ok(())
            }
            BcKind::Neumann => {
                residual[0] += ctx.problem.neumann(scvf, 0) * scvf.area();
                Ok(())
            }
            BcKind::Outflow | BcKind::Symmetry => Err(ModelError::UnsupportedBoundary {
                what: "Darcy mass balance supports Dirichlet and Neumann only",
                face: scvf.index(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bctypes::BoundaryTypes;
    use crate::problem::Problem;
    use pf_flux::{isotropic, CacheFiller, FaceBc, FillContext, TpfaFiller};
    use pf_grid::CartesianGrid;

    struct TwoCell {
        left: Real,
        right: Real,
    }

    impl Problem for TwoCell {
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

    fn vol_vars(pressure: Real, viscosity: Real) -> VolumeVariables {
        VolumeVariables {
            pressure,
            viscosity,
            ..Default::default()
        }
    }

    #[test]
    fn darcy_flux_through_shared_face() {
        // 1 m spacing, 1e-12 m^2 permeability, 0.5e5 Pa drop, 1e-3 Pa s
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let fv = grid.bind(0).unwrap();
        let perm = |_: usize| isotropic(1e-12);
        let boundary = |_: &SubControlVolumeFace| FaceBc::Neumann;
        let fill_ctx = FillContext {
            grid: &grid,
            fv_geometry: &fv,
            permeability: &perm,
            boundary: &boundary,
        };
        let caches = TpfaFiller::new().fill_element(&fill_ctx).unwrap();

        let problem = TwoCell {
            left: 1.0e5,
            right: 0.5e5,
        };
        let vols = |dof: usize| {
            vol_vars(
                if dof == 0 { problem.left } else { problem.right },
                1e-3,
            )
        };
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: None,
            flux_caches: &caches,
        };
        let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
        let flux = SinglePhaseDarcy.flux(&ctx, shared).unwrap();
        assert!((flux[0] - 5.0e-5).abs() < 5.0e-7, "flux {}", flux[0]);
    }

    #[test]
    fn upwind_mobility_follows_flow_direction() {
        let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
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
        let problem = TwoCell {
            left: 0.0,
            right: 1.0,
        };
        // inflow from the right: the right cell's (higher) viscosity wins
        let vols = |dof: usize| vol_vars(if dof == 0 { 0.0 } else { 1.0 }, [1.0, 2.0][dof]);
        let ctx = EvalContext {
            problem: &problem,
            grid: &grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: None,
            flux_caches: &caches,
        };
        let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
        let flux = SinglePhaseDarcy.flux(&ctx, shared).unwrap()[0];
        // potential flux is -1, mobility 1/2
        assert!((flux + 0.5).abs() < 1e-12);
    }

    proptest::proptest! {
        #[test]
        fn flux_sign_follows_the_pressure_difference(
            p0 in 1.0e4f64..1.0e6,
            p1 in 1.0e4f64..1.0e6,
        ) {
            let grid = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
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
            let problem = TwoCell { left: p0, right: p1 };
            let vols = |dof: usize| vol_vars([p0, p1][dof], 1e-3);
            let ctx = EvalContext {
                problem: &problem,
                grid: &grid,
                fv_geometry: &fv,
                vol_vars: &vols,
                face_vars: None,
                flux_caches: &caches,
            };
            let shared = fv.scvfs().iter().find(|f| !f.boundary()).unwrap();
            let flux = SinglePhaseDarcy.flux(&ctx, shared).unwrap()[0];
            if p0 > p1 {
                proptest::prop_assert!(flux > 0.0);
            } else if p1 > p0 {
                proptest::prop_assert!(flux < 0.0);
            }
        }
    }

    #[test]
    fn storage_is_porosity_times_density() {
        let vol = VolumeVariables {
            porosity: 0.4,
            density: 1000.0,
            ..Default::default()
        };
        let scv = SubControlVolume::new(1.0, nalgebra::Vector2::new(0.5, 0.5), 0, 0);
        let s = SinglePhaseDarcy.storage(&scv, &vol);
        assert_eq!(s, vec![400.0]);
    }
}
