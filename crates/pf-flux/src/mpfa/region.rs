//! Geometry of one L-shaped interaction region.
//!
//! A region couples a central cell and the two cells across its faces `A`
//! and `B` meeting at a vertex. Cell gradients are expressed in the dual
//! basis of the two continuity points of each cell: the face centers for the
//! central cell, one face center plus the vertex for each outer cell.

use crate::error::{FluxError, FluxResult};
use nalgebra::{Matrix2, Vector2};
use pf_core::Real;
use pf_grid::{CartesianGrid, Point};

/// Rotate by 90 degrees counterclockwise; `rot90(a).dot(b) = cross(a, b)`.
fn rot90(v: Point) -> Point {
    Vector2::new(-v.y, v.x)
}

fn cross2(a: Point, b: Point) -> Real {
    a.x * b.y - a.y * b.x
}

/// Dual basis of two continuity points `p`, `q` around a cell center `c`:
/// returns `(nu_p, nu_q, det)` with `nu_p . (p - c) = det`, `nu_p . (q - c)
/// = 0` and symmetrically for `nu_q`.
fn dual_basis(c: Point, p: Point, q: Point) -> (Point, Point, Real) {
    let det = cross2(p - c, q - c);
    (-rot90(q - c), rot90(p - c), det)
}

#[derive(Debug)]
pub struct InteractionRegion {
    vertex: usize,
    /// Central cell, cell across face A, cell across face B.
    cells: [usize; 3],
    /// Global indices; `faces[0]` is the flux face the region was built for.
    faces: [usize; 2],
    /// Half-face area-weighted normals, outward from the central cell.
    normals: [Point; 2],
    nu: [[Point; 2]; 3],
    det: [Real; 3],
    /// Vertex-pressure interpolation weights in the central cell's basis.
    xi: [Real; 2],
}

impl InteractionRegion {
    /// Build the region with `central` as central cell, `flux_face` as face
    /// A and `other_face` as face B, both incident to `vertex`.
    pub fn new(
        grid: &CartesianGrid,
        vertex: usize,
        central: usize,
        flux_face: usize,
        other_face: usize,
    ) -> FluxResult<Self> {
        let fa = grid.face(flux_face)?;
        let fb = grid.face(other_face)?;
        let across = |f: &pf_grid::SubControlVolumeFace| -> FluxResult<usize> {
            let outside = f
                .outside_scv_idx()
                .ok_or(FluxError::BoundaryFaceInRegion { face: f.index() })?;
            Ok(if f.inside_scv_idx() == central {
                outside
            } else {
                f.inside_scv_idx()
            })
        };
        let outer_a = across(&fa)?;
        let outer_b = across(&fb)?;

        let x1 = grid.cell_center(central)?;
        let x2 = grid.cell_center(outer_a)?;
        let x3 = grid.cell_center(outer_b)?;
        let xa = fa.center();
        let xb = fb.center();
        let xv = grid.vertex_position(vertex)?;

        let (nu1a, nu1b, det1) = dual_basis(x1, xa, xb);
        let (nu2a, nu2v, det2) = dual_basis(x2, xa, xv);
        let (nu3b, nu3v, det3) = dual_basis(x3, xb, xv);
        let spans = [(xa - x1, xb - x1), (xa - x2, xv - x2), (xb - x3, xv - x3)];
        for (&det, (u, v)) in [det1, det2, det3].iter().zip(spans) {
            if det.abs() <= u.norm() * v.norm() * 1e-12 {
                return Err(FluxError::DegenerateRegion { vertex });
            }
        }

        let outward = |f: &pf_grid::SubControlVolumeFace| {
            let n = f.unit_outer_normal() * (0.5 * f.area());
            if f.inside_scv_idx() == central {
                n
            } else {
                -n
            }
        };

        Ok(Self {
            vertex,
            cells: [central, outer_a, outer_b],
            faces: [flux_face, other_face],
            normals: [outward(&fa), outward(&fb)],
            nu: [[nu1a, nu1b], [nu2a, nu2v], [nu3b, nu3v]],
            det: [det1, det2, det3],
            xi: [nu1a.dot(&(xv - x1)) / det1, nu1b.dot(&(xv - x1)) / det1],
        })
    }

    pub fn vertex(&self) -> usize {
        self.vertex
    }

    /// Central cell first, then the cells across faces A and B.
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    pub fn faces(&self) -> [usize; 2] {
        self.faces
    }

    pub fn xi(&self) -> [Real; 2] {
        self.xi
    }

    /// Flux coefficient `n_f . (K nu) / det` of one cell basis vector
    /// against one half-face normal.
    pub(crate) fn omega(
        &self,
        face_slot: usize,
        cell_slot: usize,
        basis_slot: usize,
        k: &Matrix2<Real>,
    ) -> Real {
        self.normals[face_slot].dot(&(k * self.nu[cell_slot][basis_slot])) / self.det[cell_slot]
    }
}
