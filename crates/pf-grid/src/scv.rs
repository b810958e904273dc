//! Sub-control volume: the control volume associated with one cell-centered
//! degree of freedom.

use crate::Point;
use pf_core::Real;

/// Immutable geometric data of one sub-control volume.
///
/// The extrusion factor (pseudo-third-dimension scaling) lives with the
/// volume variables, not here, so the geometry stays purely topological.
#[derive(Clone, Debug)]
pub struct SubControlVolume {
    volume: Real,
    center: Point,
    local_index: usize,
    dof_index: usize,
}

impl SubControlVolume {
    pub fn new(volume: Real, center: Point, local_index: usize, dof_index: usize) -> Self {
        Self {
            volume,
            center,
            local_index,
            dof_index,
        }
    }

    /// Geometric volume (area in 2D) without extrusion.
    pub fn volume(&self) -> Real {
        self.volume
    }

    pub fn center(&self) -> Point {
        self.center
    }

    /// Index within the bound element geometry (0 for cell-centered schemes).
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Global degree-of-freedom index (the cell index for cell-centered
    /// schemes).
    pub fn dof_index(&self) -> usize {
        self.dof_index
    }
}
