//! pf-models: physical models and the problem contract.
//!
//! Models plug into the residual engine through the capability traits in
//! [`model`]; scenarios supply boundary conditions and sources through
//! [`problem::Problem`]. Two concrete models ship in-repo:
//! - [`singlephase::SinglePhaseDarcy`], cell-centered Darcy mass balance
//! - [`navierstokes::NavierStokesStaggered`], staggered Navier-Stokes with
//!   an optional energy balance

pub mod bctypes;
pub mod error;
pub mod facevars;
pub mod model;
pub mod navierstokes;
pub mod problem;
pub mod singlephase;
pub mod volvars;

pub use bctypes::{BcKind, BoundaryTypes};
pub use error::{ModelError, ModelResult};
pub use facevars::{FaceVariables, FaceVarsView, LateralVelocities};
pub use model::{CellCenterModel, EvalContext, StaggeredModel};
pub use navierstokes::NavierStokesStaggered;
pub use problem::Problem;
pub use singlephase::SinglePhaseDarcy;
pub use volvars::{VolVarsView, VolumeVariables};
