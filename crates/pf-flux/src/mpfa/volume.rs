//! Interaction volume: candidate regions for one half face and the local
//! transmissibility solve.
//!
//! Flux and potential continuity across the two region faces eliminate the
//! face and vertex pressures, leaving a 2x3 matrix `T = C A^-1 B + D` that
//! maps the three cell pressures to the two half-face fluxes. Only the row
//! of the flux face is consumed; the second face gets its own volume when
//! its turn comes.

use super::criterion::SelectionCriterion;
use super::region::InteractionRegion;
use crate::error::{FluxError, FluxResult};
use crate::filler::{validate_tensor, PermeabilityField};
use nalgebra::{Matrix2, Matrix2x3};
use pf_core::Real;
use pf_grid::CartesianGrid;

/// The solved coefficients of one candidate region.
#[derive(Debug)]
pub struct SolvedRegion {
    t: Matrix2x3<Real>,
    cells: [usize; 3],
    face: usize,
    vertex: usize,
}

impl SolvedRegion {
    /// Degrees of freedom the half-face flux couples, central cell first.
    pub fn stencil(&self) -> [usize; 3] {
        self.cells
    }

    pub fn face(&self) -> usize {
        self.face
    }

    pub fn vertex(&self) -> usize {
        self.vertex
    }

    /// Full transmissibility matrix, mainly for inspection in tests.
    pub fn transmissibilities(&self) -> &Matrix2x3<Real> {
        &self.t
    }

    /// Flux-face coefficients oriented outward from `inside_cell`, together
    /// with whether the sign had to be switched because the cell sits across
    /// the flux face from the region's central cell.
    pub fn flux_row(&self, inside_cell: usize) -> FluxResult<([Real; 3], bool)> {
        let row = [self.t[(0, 0)], self.t[(0, 1)], self.t[(0, 2)]];
        if inside_cell == self.cells[0] {
            Ok((row, false))
        } else if inside_cell == self.cells[1] {
            Ok(([-row[0], -row[1], -row[2]], true))
        } else {
            Err(FluxError::CellNotInRegion { cell: inside_cell })
        }
    }
}

/// Candidate interaction regions for the half of `face` next to `vertex`.
pub struct InteractionVolume {
    vertex: usize,
    face: usize,
    candidates: Vec<InteractionRegion>,
}

impl InteractionVolume {
    /// Build both candidate regions: one with each side of the face as
    /// central cell. The flux face is face A of either candidate.
    pub fn for_face(grid: &CartesianGrid, face: usize, vertex: usize) -> FluxResult<Self> {
        let f = grid.face(face)?;
        let outside = f
            .outside_scv_idx()
            .ok_or(FluxError::BoundaryFaceInRegion { face })?;
        let mut candidates = Vec::with_capacity(2);
        for central in [f.inside_scv_idx(), outside] {
            let [fv, fh] = grid.cell_faces_at_vertex(central, vertex)?;
            let other = if fv == face { fh } else { fv };
            if grid.face(other)?.boundary() {
                continue;
            }
            candidates.push(InteractionRegion::new(grid, vertex, central, face, other)?);
        }
        if candidates.is_empty() {
            return Err(FluxError::DegenerateRegion { vertex });
        }
        Ok(Self {
            vertex,
            face,
            candidates,
        })
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Solve the local systems of all candidates and let the criterion pick
    /// one. With a single viable candidate the criterion is bypassed.
    pub fn solve(
        &self,
        permeability: &dyn PermeabilityField,
        criterion: &dyn SelectionCriterion,
    ) -> FluxResult<SolvedRegion> {
        let mut solved = Vec::with_capacity(self.candidates.len());
        for region in &self.candidates {
            solved.push(solve_region(region, permeability)?);
        }
        let pick = if solved.len() == 1 {
            0
        } else {
            let matrices: Vec<_> = solved.iter().map(|s| s.t).collect();
            let pick = criterion.select(&matrices).min(solved.len() - 1);
            tracing::trace!(vertex = self.vertex, face = self.face, pick, "selected region");
            pick
        };
        Ok(solved.swap_remove(pick))
    }
}

/// Assemble and eliminate the local system of one region.
fn solve_region(
    region: &InteractionRegion,
    permeability: &dyn PermeabilityField,
) -> FluxResult<SolvedRegion> {
    let cells = region.cells();
    let tensors: Vec<Matrix2<Real>> = cells
        .iter()
        .map(|&c| permeability.tensor(c))
        .collect();
    for (&cell, k) in cells.iter().zip(&tensors) {
        validate_tensor(cell, k)?;
    }

    // omega(face, cell, basis): face/basis slots 0 = A, 1 = B; the outer
    // cells' second basis vector belongs to the vertex point.
    let w_aa1 = region.omega(0, 0, 0, &tensors[0]);
    let w_ab1 = region.omega(0, 0, 1, &tensors[0]);
    let w_ba1 = region.omega(1, 0, 0, &tensors[0]);
    let w_bb1 = region.omega(1, 0, 1, &tensors[0]);
    let w_aa2 = region.omega(0, 1, 0, &tensors[1]);
    let w_av2 = region.omega(0, 1, 1, &tensors[1]);
    let w_bb3 = region.omega(1, 2, 0, &tensors[2]);
    let w_bv3 = region.omega(1, 2, 1, &tensors[2]);
    let [xi_a, xi_b] = region.xi();

    // Continuity of flux through faces A and B in the unknown face
    // pressures, with the vertex pressure interpolated from the central
    // cell's values.
    let a = Matrix2::new(
        w_aa1 - w_aa2 - w_av2 * xi_a,
        w_ab1 - w_av2 * xi_b,
        w_ba1 - w_bv3 * xi_a,
        w_bb1 - w_bb3 - w_bv3 * xi_b,
    );
    let b = Matrix2x3::new(
        w_aa1 + w_ab1 + w_av2 * (1.0 - xi_a - xi_b),
        -(w_aa2 + w_av2),
        0.0,
        w_ba1 + w_bb1 + w_bv3 * (1.0 - xi_a - xi_b),
        0.0,
        -(w_bb3 + w_bv3),
    );
    let a_inv = a.try_inverse().ok_or(FluxError::SingularLocalSystem {
        vertex: region.vertex(),
    })?;

    // T = C A^-1 B + D with C the face-pressure part of the central fluxes
    // and D their cell-pressure part.
    let c = Matrix2::new(-w_aa1, -w_ab1, -w_ba1, -w_bb1);
    let mut t = c * a_inv * b;
    t[(0, 0)] += w_aa1 + w_ab1;
    t[(1, 0)] += w_ba1 + w_bb1;

    Ok(SolvedRegion {
        t,
        cells,
        face: region.faces()[0],
        vertex: region.vertex(),
    })
}
