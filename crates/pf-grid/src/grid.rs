//! Structured 2D Cartesian grid.
//!
//! Reference implementation of the grid-layer contract consumed by the
//! assembly core: stable cell/face/vertex indices, adjacency queries, and
//! element-bound geometry views. Face indices enumerate all x-normal
//! ("vertical") faces first, then all y-normal ("horizontal") faces.

use crate::element::FvElementGeometry;
use crate::error::{GridError, GridResult};
use crate::scv::SubControlVolume;
use crate::scvf::SubControlVolumeFace;
use crate::Point;
use nalgebra::Vector2;
use pf_core::Real;

#[derive(Clone, Debug)]
pub struct CartesianGrid {
    nx: usize,
    ny: usize,
    dx: Real,
    dy: Real,
}

impl CartesianGrid {
    pub fn new(nx: usize, ny: usize, lx: Real, ly: Real) -> GridResult<Self> {
        if nx == 0 || ny == 0 {
            return Err(GridError::InvalidExtents {
                what: "cell counts must be positive",
            });
        }
        if !(lx > 0.0 && lx.is_finite() && ly > 0.0 && ly.is_finite()) {
            return Err(GridError::InvalidExtents {
                what: "domain lengths must be positive and finite",
            });
        }
        Ok(Self {
            nx,
            ny,
            dx: lx / nx as Real,
            dy: ly / ny as Real,
        })
    }

    pub fn num_cells(&self) -> usize {
        self.nx * self.ny
    }

    pub fn num_faces(&self) -> usize {
        (self.nx + 1) * self.ny + (self.ny + 1) * self.nx
    }

    pub fn num_vertices(&self) -> usize {
        (self.nx + 1) * (self.ny + 1)
    }

    pub fn spacing(&self) -> (Real, Real) {
        (self.dx, self.dy)
    }

    pub fn extents(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    fn cell_ij(&self, cell: usize) -> (usize, usize) {
        (cell % self.nx, cell / self.nx)
    }

    fn cell_index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    pub fn cell_center(&self, cell: usize) -> GridResult<Point> {
        self.check_cell(cell)?;
        let (i, j) = self.cell_ij(cell);
        Ok(Vector2::new(
            (i as Real + 0.5) * self.dx,
            (j as Real + 0.5) * self.dy,
        ))
    }

    pub fn cell_volume(&self, _cell: usize) -> Real {
        self.dx * self.dy
    }

    fn check_cell(&self, cell: usize) -> GridResult<()> {
        if cell >= self.num_cells() {
            return Err(GridError::CellOob {
                index: cell,
                len: self.num_cells(),
            });
        }
        Ok(())
    }

    fn check_vertex(&self, vertex: usize) -> GridResult<()> {
        if vertex >= self.num_vertices() {
            return Err(GridError::VertexOob {
                index: vertex,
                len: self.num_vertices(),
            });
        }
        Ok(())
    }

    fn vertex_ij(&self, vertex: usize) -> (usize, usize) {
        (vertex % (self.nx + 1), vertex / (self.nx + 1))
    }

    fn vertex_index(&self, i: usize, j: usize) -> usize {
        j * (self.nx + 1) + i
    }

    pub fn vertex_position(&self, vertex: usize) -> GridResult<Point> {
        self.check_vertex(vertex)?;
        let (i, j) = self.vertex_ij(vertex);
        Ok(Vector2::new(i as Real * self.dx, j as Real * self.dy))
    }

    /// Face-adjacent neighbor cells (the 1-ring used for the Jacobian
    /// pattern and the red-coloring propagation).
    pub fn neighbors(&self, cell: usize) -> GridResult<Vec<usize>> {
        self.check_cell(cell)?;
        let (i, j) = self.cell_ij(cell);
        let mut out = Vec::with_capacity(4);
        if i > 0 {
            out.push(self.cell_index(i - 1, j));
        }
        if i + 1 < self.nx {
            out.push(self.cell_index(i + 1, j));
        }
        if j > 0 {
            out.push(self.cell_index(i, j - 1));
        }
        if j + 1 < self.ny {
            out.push(self.cell_index(i, j + 1));
        }
        Ok(out)
    }

    fn vertical_face_index(&self, i: usize, j: usize) -> usize {
        j * (self.nx + 1) + i
    }

    fn horizontal_face_index(&self, i: usize, j: usize) -> usize {
        (self.nx + 1) * self.ny + j * self.nx + i
    }

    /// Global face indices of one cell: [left, right, bottom, top].
    pub fn cell_faces(&self, cell: usize) -> GridResult<[usize; 4]> {
        self.check_cell(cell)?;
        let (i, j) = self.cell_ij(cell);
        Ok([
            self.vertical_face_index(i, j),
            self.vertical_face_index(i + 1, j),
            self.horizontal_face_index(i, j),
            self.horizontal_face_index(i, j + 1),
        ])
    }

    /// Canonical face geometry. Interior faces point from the lower-index
    /// side to the higher (left to right, bottom to top); boundary faces
    /// point out of the domain.
    pub fn face(&self, face: usize) -> GridResult<SubControlVolumeFace> {
        let n_vertical = (self.nx + 1) * self.ny;
        if face < n_vertical {
            let i = face % (self.nx + 1);
            let j = face / (self.nx + 1);
            let center = Vector2::new(i as Real * self.dx, (j as Real + 0.5) * self.dy);
            let v0 = self.vertex_index(i, j);
            let v1 = self.vertex_index(i, j + 1);
            let (inside, outside, normal) = if i == 0 {
                (self.cell_index(0, j), vec![], Vector2::new(-1.0, 0.0))
            } else if i == self.nx {
                (self.cell_index(i - 1, j), vec![], Vector2::new(1.0, 0.0))
            } else {
                (
                    self.cell_index(i - 1, j),
                    vec![self.cell_index(i, j)],
                    Vector2::new(1.0, 0.0),
                )
            };
            SubControlVolumeFace::new(self.dy, center, normal, inside, outside, face, 0, [v0, v1])
        } else if face < self.num_faces() {
            let k = face - n_vertical;
            let i = k % self.nx;
            let j = k / self.nx;
            let center = Vector2::new((i as Real + 0.5) * self.dx, j as Real * self.dy);
            let v0 = self.vertex_index(i, j);
            let v1 = self.vertex_index(i + 1, j);
            let (inside, outside, normal) = if j == 0 {
                (self.cell_index(i, 0), vec![], Vector2::new(0.0, -1.0))
            } else if j == self.ny {
                (self.cell_index(i, j - 1), vec![], Vector2::new(0.0, 1.0))
            } else {
                (
                    self.cell_index(i, j - 1),
                    vec![self.cell_index(i, j)],
                    Vector2::new(0.0, 1.0),
                )
            };
            SubControlVolumeFace::new(self.dx, center, normal, inside, outside, face, 1, [v0, v1])
        } else {
            Err(GridError::FaceOob {
                index: face,
                len: self.num_faces(),
            })
        }
    }

    /// Bind an element: build the element-local geometry view with all face
    /// normals pointing out of the bound cell. Binding precedes any residual
    /// or cache-fill call by construction.
    pub fn bind(&self, cell: usize) -> GridResult<FvElementGeometry> {
        self.check_cell(cell)?;
        let scv = SubControlVolume::new(self.cell_volume(cell), self.cell_center(cell)?, 0, cell);
        let mut scvfs = Vec::with_capacity(4);
        for face in self.cell_faces(cell)? {
            let f = self.face(face)?;
            if f.inside_scv_idx() == cell {
                scvfs.push(f);
            } else {
                scvfs.push(f.flipped()?);
            }
        }
        Ok(FvElementGeometry::new(cell, scv, scvfs))
    }

    pub fn is_boundary_vertex(&self, vertex: usize) -> GridResult<bool> {
        self.check_vertex(vertex)?;
        let (i, j) = self.vertex_ij(vertex);
        Ok(i == 0 || i == self.nx || j == 0 || j == self.ny)
    }

    /// Vertices not on the domain boundary, the seeds of MPFA interaction
    /// volumes.
    pub fn interior_vertices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for j in 1..self.ny {
            for i in 1..self.nx {
                out.push(self.vertex_index(i, j));
            }
        }
        out
    }

    /// Cells incident to a vertex (up to four).
    pub fn vertex_cells(&self, vertex: usize) -> GridResult<Vec<usize>> {
        self.check_vertex(vertex)?;
        let (i, j) = self.vertex_ij(vertex);
        let mut out = Vec::with_capacity(4);
        if i > 0 && j > 0 {
            out.push(self.cell_index(i - 1, j - 1));
        }
        if i < self.nx && j > 0 {
            out.push(self.cell_index(i, j - 1));
        }
        if i > 0 && j < self.ny {
            out.push(self.cell_index(i - 1, j));
        }
        if i < self.nx && j < self.ny {
            out.push(self.cell_index(i, j));
        }
        Ok(out)
    }

    /// The two faces of `cell` incident to `vertex` (one per axis).
    pub fn cell_faces_at_vertex(&self, cell: usize, vertex: usize) -> GridResult<[usize; 2]> {
        self.check_cell(cell)?;
        self.check_vertex(vertex)?;
        let (ci, cj) = self.cell_ij(cell);
        let (vi, vj) = self.vertex_ij(vertex);
        let touches = (vi == ci || vi == ci + 1) && (vj == cj || vj == cj + 1);
        if !touches {
            return Err(GridError::FaceInvariant {
                what: "cell is not incident to vertex",
                face: vertex,
            });
        }
        // vertical face at x = vi, horizontal face at y = vj
        Ok([
            self.vertical_face_index(vi, cj),
            self.horizontal_face_index(ci, vj),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_for_small_grid() {
        let g = CartesianGrid::new(2, 2, 2.0, 2.0).unwrap();
        assert_eq!(g.num_cells(), 4);
        assert_eq!(g.num_vertices(), 9);
        // 3*2 vertical + 3*2 horizontal
        assert_eq!(g.num_faces(), 12);
    }

    #[test]
    fn interior_face_orientation() {
        let g = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        // face between cell 0 and cell 1: vertical face i=1, j=0
        let f = g.face(1).unwrap();
        assert!(!f.boundary());
        assert_eq!(f.inside_scv_idx(), 0);
        assert_eq!(f.outside_scv_idx(), Some(1));
        assert!((f.unit_outer_normal() - Vector2::new(1.0, 0.0)).norm() < 1e-14);
        assert!((f.area() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn bind_flips_faces_for_right_cell() {
        let g = CartesianGrid::new(2, 1, 2.0, 1.0).unwrap();
        let fv = g.bind(1).unwrap();
        let shared = fv
            .scvfs()
            .iter()
            .find(|f| f.index() == 1)
            .expect("shared face present");
        assert_eq!(shared.inside_scv_idx(), 1);
        assert_eq!(shared.outside_scv_idx(), Some(0));
        assert!((shared.unit_outer_normal() - Vector2::new(-1.0, 0.0)).norm() < 1e-14);
    }

    #[test]
    fn every_cell_has_four_outward_faces() {
        let g = CartesianGrid::new(3, 2, 3.0, 2.0).unwrap();
        for cell in 0..g.num_cells() {
            let fv = g.bind(cell).unwrap();
            assert_eq!(fv.scvfs().len(), 4);
            let center = fv.scv().center();
            for f in fv.scvfs() {
                assert_eq!(f.inside_scv_idx(), cell);
                // normal must point away from the cell center
                let d = f.center() - center;
                assert!(d.dot(&f.unit_outer_normal()) > 0.0);
            }
        }
    }

    #[test]
    fn vertex_adjacency_at_interior_vertex() {
        let g = CartesianGrid::new(2, 2, 2.0, 2.0).unwrap();
        let interior = g.interior_vertices();
        assert_eq!(interior, vec![4]);
        let cells = g.vertex_cells(4).unwrap();
        assert_eq!(cells, vec![0, 1, 2, 3]);
        assert!(!g.is_boundary_vertex(4).unwrap());
        assert!(g.is_boundary_vertex(0).unwrap());
    }

    #[test]
    fn cell_faces_at_vertex_touch_that_vertex() {
        let g = CartesianGrid::new(2, 2, 2.0, 2.0).unwrap();
        let [fv_vert, fv_horiz] = g.cell_faces_at_vertex(0, 4).unwrap();
        for fidx in [fv_vert, fv_horiz] {
            let f = g.face(fidx).unwrap();
            assert!(f.vertex_indices().contains(&4));
            assert!(f.inside_scv_idx() == 0 || f.outside_scv_idx() == Some(0));
        }
        // cell 0 is not incident to a far vertex
        assert!(g.cell_faces_at_vertex(0, 8).is_err());
    }

    proptest::proptest! {
        #[test]
        fn neighbor_relation_is_symmetric(nx in 1usize..6, ny in 1usize..6) {
            let g = CartesianGrid::new(nx, ny, 1.0, 1.0).unwrap();
            for cell in 0..g.num_cells() {
                for n in g.neighbors(cell).unwrap() {
                    proptest::prop_assert!(g.neighbors(n).unwrap().contains(&cell));
                }
            }
        }

        #[test]
        fn every_face_is_listed_by_its_adjacent_cells(nx in 1usize..6, ny in 1usize..6) {
            let g = CartesianGrid::new(nx, ny, 1.0, 1.0).unwrap();
            for face in 0..g.num_faces() {
                let f = g.face(face).unwrap();
                proptest::prop_assert!(g.cell_faces(f.inside_scv_idx()).unwrap().contains(&face));
                if let Some(out) = f.outside_scv_idx() {
                    proptest::prop_assert!(g.cell_faces(out).unwrap().contains(&face));
                }
            }
        }
    }
}
