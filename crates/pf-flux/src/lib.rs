//! pf-flux: face transmissibilities and flux-variables caches.
//!
//! Two discretizations share the cache contract:
//! - two-point flux approximation (`TpfaFiller`), harmonic half faces
//! - multi-point L-method (`MpfaFiller`), vertex interaction volumes with a
//!   pluggable candidate-selection criterion
//!
//! Fills are pure: filling the same face twice with unchanged inputs yields
//! identical caches, so partial reassembly can skip them safely.

pub mod cache;
pub mod error;
pub mod filler;
pub mod mpfa;
pub mod tpfa;

pub use cache::{DirichletData, ElementFluxVarsCache, FluxVarsCache};
pub use error::{FluxError, FluxResult};
pub use filler::{isotropic, CacheFiller, FaceBc, FillContext, PermeabilityField};
pub use mpfa::{DiagonalDominance, InteractionVolume, MpfaFiller, SelectionCriterion, SolvedRegion};
pub use tpfa::TpfaFiller;
