//! Sub-control-volume face: a flux-carrying face between two SCVs, or
//! between an SCV and the domain boundary.

use crate::error::{GridError, GridResult};
use crate::Point;
use pf_core::Real;

/// Immutable geometric data of one sub-control-volume face.
///
/// Invariant: exactly one inside SCV; `boundary() == true` iff there is no
/// outside neighbor. Multiple outside indices are permitted for
/// non-conforming interfaces.
#[derive(Clone, Debug)]
pub struct SubControlVolumeFace {
    area: Real,
    center: Point,
    unit_outer_normal: Point,
    inside_scv: usize,
    outside_scvs: Vec<usize>,
    index: usize,
    direction_index: usize,
    vertices: [usize; 2],
}

impl SubControlVolumeFace {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        area: Real,
        center: Point,
        unit_outer_normal: Point,
        inside_scv: usize,
        outside_scvs: Vec<usize>,
        index: usize,
        direction_index: usize,
        vertices: [usize; 2],
    ) -> GridResult<Self> {
        if area <= 0.0 || !area.is_finite() {
            return Err(GridError::FaceInvariant {
                what: "face area must be positive and finite",
                face: index,
            });
        }
        let norm = unit_outer_normal.norm();
        if (norm - 1.0).abs() > 1e-10 {
            return Err(GridError::FaceInvariant {
                what: "outer normal must be a unit vector",
                face: index,
            });
        }
        Ok(Self {
            area,
            center,
            unit_outer_normal,
            inside_scv,
            outside_scvs,
            index,
            direction_index,
            vertices,
        })
    }

    pub fn area(&self) -> Real {
        self.area
    }

    /// Integration point of the face.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Unit normal pointing out of the inside SCV.
    pub fn unit_outer_normal(&self) -> Point {
        self.unit_outer_normal
    }

    pub fn inside_scv_idx(&self) -> usize {
        self.inside_scv
    }

    /// First outside neighbor; callers must check `boundary()` first.
    pub fn outside_scv_idx(&self) -> Option<usize> {
        self.outside_scvs.first().copied()
    }

    pub fn outside_scv_indices(&self) -> &[usize] {
        &self.outside_scvs
    }

    pub fn boundary(&self) -> bool {
        self.outside_scvs.is_empty()
    }

    /// Global face index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Coordinate axis the face normal is aligned with (0 = x, 1 = y).
    /// Meaningful on axis-aligned grids, used by the staggered scheme.
    pub fn direction_index(&self) -> usize {
        self.direction_index
    }

    /// Signed component of the outer normal along the face's own axis
    /// (+1 or -1 on axis-aligned grids). The staggered momentum residual
    /// keys its sign convention off this value.
    pub fn outer_normal_scalar(&self) -> Real {
        self.unit_outer_normal[self.direction_index]
    }

    /// Global indices of the two grid vertices spanning the face.
    pub fn vertex_indices(&self) -> [usize; 2] {
        self.vertices
    }

    /// The same face as seen from the other side: inside/outside swapped,
    /// normal flipped. Errors if this is a boundary face.
    pub fn flipped(&self) -> GridResult<Self> {
        let outside = self.outside_scv_idx().ok_or(GridError::FaceInvariant {
            what: "cannot flip a boundary face",
            face: self.index,
        })?;
        Ok(Self {
            area: self.area,
            center: self.center,
            unit_outer_normal: -self.unit_outer_normal,
            inside_scv: outside,
            outside_scvs: vec![self.inside_scv],
            index: self.index,
            direction_index: self.direction_index,
            vertices: self.vertices,
        })
    }
}
