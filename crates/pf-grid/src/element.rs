//! Element-bound geometry view.

use crate::scv::SubControlVolume;
use crate::scvf::SubControlVolumeFace;

/// Geometry of one element, bound for a single assembly call.
///
/// All face normals point out of the bound cell. The view is a short-lived
/// value; rebinding another element creates a fresh view instead of mutating
/// shared state.
#[derive(Clone, Debug)]
pub struct FvElementGeometry {
    cell: usize,
    scv: SubControlVolume,
    scvfs: Vec<SubControlVolumeFace>,
}

impl FvElementGeometry {
    pub fn new(cell: usize, scv: SubControlVolume, scvfs: Vec<SubControlVolumeFace>) -> Self {
        Self { cell, scv, scvfs }
    }

    /// Global index of the bound cell.
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// The element's sub-control volume (one per cell for cell-centered
    /// schemes).
    pub fn scv(&self) -> &SubControlVolume {
        &self.scv
    }

    /// All sub-control-volume faces of the element, outward oriented.
    pub fn scvfs(&self) -> &[SubControlVolumeFace] {
        &self.scvfs
    }
}
