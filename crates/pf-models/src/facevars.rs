//! Per-face velocity variables of the staggered scheme.

use pf_core::Real;

/// Velocities around one lateral side of a staggered momentum control
/// volume: the transporting normal velocity of the lateral face, the
/// parallel velocity across it (the upwind partner of the face's own
/// velocity), and the lateral outward direction along the perpendicular
/// axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LateralVelocities {
    pub transporting: Real,
    pub parallel: Real,
    /// +1 or -1: orientation of the lateral face's outward normal.
    pub sign: Real,
}

/// Velocity stencil of one staggered face degree of freedom.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceVariables {
    /// The face's own normal velocity.
    pub velocity_self: Real,
    /// Normal velocity at the opposite face of the inside cell.
    pub velocity_opposite: Real,
    /// The two lateral sides of the half control volume.
    pub lateral: [LateralVelocities; 2],
}

/// Read access to the face variables of any face degree of freedom.
pub trait FaceVarsView {
    fn get(&self, face: usize) -> FaceVariables;
}

impl<F: Fn(usize) -> FaceVariables> FaceVarsView for F {
    fn get(&self, face: usize) -> FaceVariables {
        self(face)
    }
}
