use pf_core::PfError;
use pf_flux::FluxError;
use pf_grid::GridError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// An outflow momentum boundary condition is only well posed together
    /// with a Dirichlet pressure condition; anything else is a
    /// configuration error, never a silent fallback.
    #[error("outflow boundary at face {face} requires a Dirichlet pressure condition")]
    OutflowWithoutDirichletPressure { face: usize },

    #[error("unsupported boundary condition at face {face}: {what}")]
    UnsupportedBoundary { what: &'static str, face: usize },

    #[error("residual slice has {got} entries, model needs {need}")]
    ResidualSizeMismatch { need: usize, got: usize },

    #[error("staggered evaluation at face {face} without bound face variables")]
    MissingFaceVariables { face: usize },

    #[error(transparent)]
    Flux(#[from] FluxError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Core(#[from] PfError),
}

pub type ModelResult<T> = Result<T, ModelError>;
