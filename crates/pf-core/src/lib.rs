//! pf-core: stable foundation for porousflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)
//! - time (time loop handed to transient residual evaluations)
//! - timing (opt-in wall-clock timers for assembly hot paths)

pub mod error;
pub mod numeric;
pub mod time;
pub mod timing;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use numeric::*;
pub use time::TimeLoop;
pub use timing::Timer;
