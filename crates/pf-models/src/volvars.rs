//! Per-cell secondary variables derived from the primary solution.

use pf_core::Real;

/// Constitutive state of one sub-control volume. Secondary quantities are
/// recomputed from the primary variables whenever the solution changes; the
/// residual engine reads them through a [`VolVarsView`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeVariables {
    pub pressure: Real,
    pub density: Real,
    pub viscosity: Real,
    pub porosity: Real,
    pub temperature: Real,
    pub enthalpy: Real,
    pub internal_energy: Real,
    pub thermal_conductivity: Real,
    /// Pseudo-third-dimension scaling of volumes and areas.
    pub extrusion_factor: Real,
}

impl Default for VolumeVariables {
    fn default() -> Self {
        Self {
            pressure: 0.0,
            density: 1.0,
            viscosity: 1.0,
            porosity: 1.0,
            temperature: 293.15,
            enthalpy: 0.0,
            internal_energy: 0.0,
            thermal_conductivity: 0.0,
            extrusion_factor: 1.0,
        }
    }
}

impl VolumeVariables {
    /// Phase mobility, the inverse viscosity for single-phase flow.
    pub fn mobility(&self) -> Real {
        1.0 / self.viscosity
    }
}

/// Read access to the volume variables of any degree of freedom in the
/// current stencil. Closures implement it directly, which keeps tests and
/// the assembler's solution-backed views uniform.
pub trait VolVarsView {
    fn get(&self, dof: usize) -> VolumeVariables;
}

impl<F: Fn(usize) -> VolumeVariables> VolVarsView for F {
    fn get(&self, dof: usize) -> VolumeVariables {
        self(dof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobility_is_inverse_viscosity() {
        let v = VolumeVariables {
            viscosity: 4.0,
            ..Default::default()
        };
        assert!((v.mobility() - 0.25).abs() < 1e-14);
    }
}
