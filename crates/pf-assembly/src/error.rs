use pf_core::PfError;
use pf_flux::FluxError;
use pf_grid::GridError;
use pf_models::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("matrix entry ({row}, {col}) is outside the sparsity pattern")]
    PatternEntryMissing { row: usize, col: usize },

    #[error("singular Jacobian in Newton step {iteration}")]
    SingularJacobian { iteration: usize },

    #[error("size mismatch: {what}")]
    SizeMismatch { what: &'static str },

    #[error("unsupported model: {what}")]
    UnsupportedModel { what: &'static str },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Flux(#[from] FluxError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Core(#[from] PfError),
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
