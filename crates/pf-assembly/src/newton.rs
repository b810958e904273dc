//! Newton driver over the global assembler.
//!
//! Solves the assembled linear system directly (dense LU), which is fine
//! for the grid sizes in this repo; iterative backends plug in behind the
//! same assemble/solve/update loop. Partial reassembly hooks in between
//! iterations: deltas accumulate from the Newton updates and recoloring
//! decides which Jacobian blocks the next assembly refreshes.

use crate::assembler::CcAssembler;
use crate::error::{AssemblyError, AssemblyResult};
use crate::residual::TimeContext;
use nalgebra::DVector;
use pf_core::{Real, Timer};
use pf_models::CellCenterModel;

pub struct NewtonConfig {
    pub max_iterations: usize,
    pub abs_tol: Real,
    pub rel_tol: Real,
    /// Relative discrepancy above which an element turns Red. Only read
    /// when the assembler has partial reassembly enabled.
    pub reassemble_threshold: Real,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            abs_tol: 1e-12,
            rel_tol: 1e-8,
            reassemble_threshold: 1e-5,
        }
    }
}

pub struct NewtonOutcome {
    pub x: Vec<Real>,
    pub residual_norm: Real,
    pub iterations: usize,
    pub converged: bool,
}

fn l2_norm(v: &[Real]) -> Real {
    v.iter().map(|x| x * x).sum::<Real>().sqrt()
}

pub fn newton_solve<M: CellCenterModel>(
    assembler: &mut CcAssembler<'_, M>,
    x0: Vec<Real>,
    time: &TimeContext<'_>,
    config: &NewtonConfig,
) -> AssemblyResult<NewtonOutcome> {
    let mut x = x0;
    let mut initial_norm = None;
    let mut norm = Real::INFINITY;
    for iteration in 0..config.max_iterations {
        let timer = Timer::start("assemble");
        let residual = assembler.assemble(&x, time)?;
        timer.stop_and_print();
        norm = l2_norm(&residual);
        let r0 = *initial_norm.get_or_insert(norm);
        tracing::debug!(iteration, residual_norm = norm, "newton iteration");
        if norm < config.abs_tol || norm <= config.rel_tol * r0 {
            return Ok(NewtonOutcome {
                x,
                residual_norm: norm,
                iterations: iteration,
                converged: true,
            });
        }

        let jacobian = assembler.matrix().to_dense();
        let rhs = DVector::from_iterator(residual.len(), residual.iter().map(|v| -v));
        let step = jacobian
            .lu()
            .solve(&rhs)
            .ok_or(AssemblyError::SingularJacobian { iteration })?;
        let step: Vec<Real> = step.iter().copied().collect();
        assembler.update_deltas(&step, &x)?;
        for (xi, dxi) in x.iter_mut().zip(&step) {
            *xi += dxi;
        }
        assembler.compute_colors(config.reassemble_threshold)?;
    }
    Ok(NewtonOutcome {
        x,
        residual_norm: norm,
        iterations: config.max_iterations,
        converged: false,
    })
}
