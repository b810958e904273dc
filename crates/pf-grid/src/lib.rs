//! pf-grid: finite-volume geometry primitives for porousflow.
//!
//! Provides:
//! - sub-control volumes (SCV) and sub-control-volume faces (SCVF)
//! - a structured 2D Cartesian grid implementing the grid-layer contract
//! - element-bound geometry views (`FvElementGeometry`) created by `bind`
//!
//! Geometry objects are immutable value types; indices are stable after
//! construction. Unstructured grid backends plug in behind the same
//! primitives, the Cartesian grid is the in-repo reference provider.

pub mod element;
pub mod error;
pub mod grid;
pub mod scv;
pub mod scvf;

pub use element::FvElementGeometry;
pub use error::{GridError, GridResult};
pub use grid::CartesianGrid;
pub use scv::SubControlVolume;
pub use scvf::SubControlVolumeFace;

/// World position type. The assembled core is two-dimensional; 3D
/// discretization paths are rejected explicitly where they would matter.
pub type Point = nalgebra::Vector2<pf_core::Real>;
