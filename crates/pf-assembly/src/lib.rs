//! pf-assembly: local residual engines, the global Jacobian assembler with
//! partial-reassembly coloring, and a Newton driver.
//!
//! Evaluation order per element is fixed: caches are filled for the bound
//! geometry, then the local residual reads them; the assembler owns that
//! sequencing so callers cannot observe a half-built cache.

pub mod assembler;
pub mod csr;
pub mod error;
pub mod newton;
pub mod residual;

pub use assembler::{CcAssembler, EntityColor};
pub use csr::{CsrMatrix, CsrPattern};
pub use error::{AssemblyError, AssemblyResult};
pub use newton::{newton_solve, NewtonConfig, NewtonOutcome};
pub use residual::{CcLocalResidual, StaggeredLocalResidual, TimeContext};
