//! The problem contract: boundary conditions, sources, and material data
//! supplied by the scenario being simulated.

use crate::bctypes::BoundaryTypes;
use pf_core::Real;
use pf_grid::{SubControlVolume, SubControlVolumeFace};

/// Scenario-side callbacks consumed by the residual engine. Cell-center
/// methods are required; the face-sided methods only matter for staggered
/// models and default to quiescent no-slip values.
pub trait Problem {
    /// Boundary-condition classification of the cell-center equations at a
    /// boundary face.
    fn boundary_types(&self, scvf: &SubControlVolumeFace) -> BoundaryTypes;

    /// Prescribed primary-variable value for a Dirichlet condition.
    fn dirichlet(&self, scvf: &SubControlVolumeFace, eq: usize) -> Real;

    /// Prescribed flux per unit area for a Neumann condition, positive out
    /// of the domain.
    fn neumann(&self, scvf: &SubControlVolumeFace, eq: usize) -> Real;

    /// Volumetric source density, positive as production.
    fn source(&self, scv: &SubControlVolume, eq: usize) -> Real;

    /// Boundary-condition classification of the momentum equation at a
    /// boundary face.
    fn boundary_types_face(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
        BoundaryTypes::all_dirichlet(1)
    }

    /// Prescribed normal velocity for a face Dirichlet condition.
    fn dirichlet_face(&self, _scvf: &SubControlVolumeFace) -> Real {
        0.0
    }

    /// Prescribed momentum flux for a face Neumann condition.
    fn neumann_face(&self, _scvf: &SubControlVolumeFace) -> Real {
        0.0
    }

    /// Momentum source density at a face degree of freedom (manufactured
    /// solutions drive the flow through this hook).
    fn source_face(&self, _scvf: &SubControlVolumeFace) -> Real {
        0.0
    }

    /// Reference pressure subtracted from the momentum pressure term to
    /// improve conditioning; `None` disables the normalization.
    fn reference_pressure(&self) -> Option<Real> {
        None
    }
}
