//! Time loop handle consumed by transient residual evaluations.
//!
//! The assembly core never advances time itself; it only reads the current
//! step size for the implicit-Euler storage difference. Constructing a
//! `TimeLoop` with a non-positive step size is rejected up front so the
//! division in the storage term is always well defined.

use crate::error::PfResult;
use crate::numeric::{ensure_positive, Real};

/// Read-only view of the outer time loop.
#[derive(Clone, Copy, Debug)]
pub struct TimeLoop {
    step_size: Real,
    time: Real,
}

impl TimeLoop {
    /// Create a time loop at t=0 with the given step size (must be > 0).
    pub fn new(step_size: Real) -> PfResult<Self> {
        ensure_positive(step_size, "time step size")?;
        Ok(Self {
            step_size,
            time: 0.0,
        })
    }

    /// Current time step size, the denominator of the storage difference.
    pub fn time_step_size(&self) -> Real {
        self.step_size
    }

    /// Current simulation time.
    pub fn time(&self) -> Real {
        self.time
    }

    /// Advance by one step. Owned by the outer driver, not the core.
    pub fn advance(&mut self) {
        self.time += self.step_size;
    }

    /// Change the step size, e.g. after a failed Newton iteration.
    pub fn set_time_step_size(&mut self, step_size: Real) -> PfResult<()> {
        ensure_positive(step_size, "time step size")?;
        self.step_size = step_size;
        Ok(())
    }
}
