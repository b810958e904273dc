//! Global cell-centered assembler with partial-reassembly coloring.
//!
//! The Jacobian pattern is the 1-ring stencil (element plus face
//! neighbors), built once per grid. Across Newton iterations each element
//! carries a color: Red elements get residual plus finite-difference
//! Jacobian block, Green elements get residual only and keep their stale
//! Jacobian block. The residual is always exact; only the linearization may
//! lag.

use crate::csr::{CsrMatrix, CsrPattern};
use crate::error::{AssemblyError, AssemblyResult};
use crate::residual::{CcLocalResidual, TimeContext};
use pf_core::Real;
use pf_flux::{CacheFiller, FaceBc, FillContext, PermeabilityField};
use pf_grid::{CartesianGrid, SubControlVolumeFace};
use pf_models::{BcKind, CellCenterModel, EvalContext, Problem, VolumeVariables};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityColor {
    /// Discrepancy below tolerance: residual-only recomputation.
    Green,
    /// Must be relinearized.
    Red,
}

/// Color elements from their accumulated solution discrepancies: Red above
/// the threshold, then one ring of conservative Red propagation to the face
/// neighbors. Returns the colors and the largest Green delta, the accuracy
/// the next reassembly can reach.
pub(crate) fn compute_entity_colors(
    grid: &CartesianGrid,
    deltas: &[Real],
    threshold: Real,
) -> AssemblyResult<(Vec<EntityColor>, Real)> {
    let mut colors = vec![EntityColor::Green; deltas.len()];
    let mut next_accuracy = 0.0;
    for (cell, &delta) in deltas.iter().enumerate() {
        if delta > threshold {
            colors[cell] = EntityColor::Red;
        } else if delta > next_accuracy {
            next_accuracy = delta;
        }
    }
    let reds: Vec<usize> = (0..deltas.len())
        .filter(|&c| colors[c] == EntityColor::Red)
        .collect();
    for cell in reds {
        for neighbor in grid.neighbors(cell)? {
            colors[neighbor] = EntityColor::Red;
        }
    }
    Ok((colors, next_accuracy))
}

pub struct CcAssembler<'a, M: CellCenterModel> {
    grid: &'a CartesianGrid,
    problem: &'a dyn Problem,
    model: &'a M,
    filler: &'a dyn CacheFiller,
    permeability: &'a dyn PermeabilityField,
    /// Maps a degree of freedom and its primary variable to the secondary
    /// variables the model reads.
    vol_vars_of: &'a dyn Fn(usize, Real) -> VolumeVariables,
    matrix: CsrMatrix,
    colors: Vec<EntityColor>,
    deltas: Vec<Real>,
    ghosts: Vec<bool>,
    next_reassemble_accuracy: Real,
    partial_reassembly: bool,
    epsilon: Real,
}

impl<'a, M: CellCenterModel> CcAssembler<'a, M> {
    pub fn new(
        grid: &'a CartesianGrid,
        problem: &'a dyn Problem,
        model: &'a M,
        filler: &'a dyn CacheFiller,
        permeability: &'a dyn PermeabilityField,
        vol_vars_of: &'a dyn Fn(usize, Real) -> VolumeVariables,
    ) -> AssemblyResult<Self> {
        if model.num_eq() != 1 {
            return Err(AssemblyError::UnsupportedModel {
                what: "scalar matrix layout supports one cell-center equation",
            });
        }
        let n = grid.num_cells();
        let mut rows = Vec::with_capacity(n);
        for cell in 0..n {
            let mut cols = grid.neighbors(cell)?;
            cols.push(cell);
            rows.push(cols);
        }
        let pattern = CsrPattern::from_rows(n, rows)?;
        tracing::debug!(cells = n, nnz = pattern.nnz(), "built jacobian pattern");
        Ok(Self {
            grid,
            problem,
            model,
            filler,
            permeability,
            vol_vars_of,
            matrix: CsrMatrix::zeros(pattern),
            colors: vec![EntityColor::Red; n],
            deltas: vec![0.0; n],
            ghosts: vec![false; n],
            next_reassemble_accuracy: 0.0,
            partial_reassembly: false,
            epsilon: 1e-8,
        })
    }

    pub fn enable_partial_reassembly(&mut self, flag: bool) {
        self.partial_reassembly = flag;
    }

    /// Mark an element as a ghost of another partition: inert identity row,
    /// zero residual.
    pub fn set_ghost(&mut self, cell: usize, flag: bool) -> AssemblyResult<()> {
        if cell >= self.ghosts.len() {
            return Err(AssemblyError::SizeMismatch {
                what: "ghost cell index out of range",
            });
        }
        self.ghosts[cell] = flag;
        Ok(())
    }

    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    pub fn colors(&self) -> &[EntityColor] {
        &self.colors
    }

    /// Largest discrepancy among Green elements after the last coloring;
    /// the accuracy the next full reassembly could recover.
    pub fn next_reassemble_accuracy(&self) -> Real {
        self.next_reassemble_accuracy
    }

    /// Accumulate per-element discrepancies from a Newton update, relative
    /// to the magnitude of the solution entry.
    pub fn update_deltas(&mut self, step: &[Real], solution: &[Real]) -> AssemblyResult<()> {
        if step.len() != self.deltas.len() || solution.len() != self.deltas.len() {
            return Err(AssemblyError::SizeMismatch {
                what: "delta update needs one entry per cell",
            });
        }
        for i in 0..step.len() {
            self.deltas[i] += step[i].abs() / solution[i].abs().max(1.0);
        }
        Ok(())
    }

    /// Recolor all elements from the accumulated deltas.
    pub fn compute_colors(&mut self, threshold: Real) -> AssemblyResult<()> {
        let (colors, accuracy) = compute_entity_colors(self.grid, &self.deltas, threshold)?;
        let red = colors.iter().filter(|&&c| c == EntityColor::Red).count();
        tracing::debug!(red, total = colors.len(), "computed element colors");
        self.colors = colors;
        self.next_reassemble_accuracy = accuracy;
        Ok(())
    }

    fn face_bc(&self, scvf: &SubControlVolumeFace) -> FaceBc {
        match self.problem.boundary_types(scvf).kind(0) {
            BcKind::Dirichlet => FaceBc::Dirichlet(self.problem.dirichlet(scvf, 0)),
            _ => FaceBc::Neumann,
        }
    }

    fn local_residual(
        &self,
        cell: usize,
        solution: &[Real],
        time: &TimeContext<'_>,
    ) -> AssemblyResult<Real> {
        let fv = self.grid.bind(cell)?;
        let bc = |scvf: &SubControlVolumeFace| self.face_bc(scvf);
        let fill_ctx = FillContext {
            grid: self.grid,
            fv_geometry: &fv,
            permeability: self.permeability,
            boundary: &bc,
        };
        let caches = self.filler.fill_element(&fill_ctx)?;
        let vols = |dof: usize| (self.vol_vars_of)(dof, solution[dof]);
        let ctx = EvalContext {
            problem: self.problem,
            grid: self.grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: None,
            flux_caches: &caches,
        };
        let r = CcLocalResidual::new(self.model).eval(&ctx, time)?;
        Ok(r[0])
    }

    /// Assemble the global residual and update the Jacobian blocks of Red
    /// elements. Ghost elements get a zero residual and an identity row.
    pub fn assemble(
        &mut self,
        solution: &[Real],
        time: &TimeContext<'_>,
    ) -> AssemblyResult<Vec<Real>> {
        let n = self.grid.num_cells();
        if solution.len() != n {
            return Err(AssemblyError::SizeMismatch {
                what: "solution needs one entry per cell",
            });
        }
        let mut residual = vec![0.0; n];
        let mut work = solution.to_vec();
        for cell in 0..n {
            if self.ghosts[cell] {
                self.matrix.set_identity_row(cell)?;
                continue;
            }
            let base = self.local_residual(cell, solution, time)?;
            residual[cell] = base;
            if self.partial_reassembly && self.colors[cell] == EntityColor::Green {
                continue;
            }
            let cols: Vec<usize> = self.matrix.pattern().row_indices(cell).to_vec();
            for col in cols {
                let saved = work[col];
                let dx = self.epsilon * saved.abs().max(1.0);
                work[col] = saved + dx;
                let perturbed = self.local_residual(cell, &work, time)?;
                work[col] = saved;
                self.matrix.set(cell, col, (perturbed - base) / dx)?;
            }
            self.deltas[cell] = 0.0;
        }
        Ok(residual)
    }
}
