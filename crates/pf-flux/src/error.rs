//! Error types for flux-cache assembly and local transmissibility solves.

use pf_core::{PfError, Real};
use pf_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluxError {
    /// A material tensor with a non-positive diagonal entry reached a
    /// transmissibility computation. Always checked, never debug-only.
    #[error("non-positive permeability in cell {cell}: {value}")]
    NonPositivePermeability { cell: usize, value: Real },

    /// The local interaction-volume matrix could not be inverted.
    #[error("singular local system at vertex {vertex}")]
    SingularLocalSystem { vertex: usize },

    /// Collapsed interaction-region geometry (collinear continuity points).
    #[error("degenerate interaction region at vertex {vertex}")]
    DegenerateRegion { vertex: usize },

    #[error("interaction region requires interior faces, face {face} is on the boundary")]
    BoundaryFaceInRegion { face: usize },

    #[error("cell {cell} is not part of the interaction region")]
    CellNotInRegion { cell: usize },

    #[error("flux cache for face {face} queried before fill")]
    NotFilled { face: usize },

    #[error(
        "stencil/transmissibility length mismatch for face {face}: {stencil} vs {coefficients}"
    )]
    StencilMismatch {
        face: usize,
        stencil: usize,
        coefficients: usize,
    },

    #[error("vanishing transmissibility at face {face}")]
    VanishingTransmissibility { face: usize },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Core(#[from] PfError),
}

pub type FluxResult<T> = Result<T, FluxError>;
