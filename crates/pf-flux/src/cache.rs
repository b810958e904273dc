//! Flux-variables cache: precomputed per-face transmissibility data.
//!
//! A cache belongs to one element-local face view (outward from the bound
//! cell) and stores everything the advective flux needs besides the current
//! pressures: the degree-of-freedom stencil, one coefficient per stencil
//! entry, and, on Dirichlet faces, the boundary contribution.

use crate::error::{FluxError, FluxResult};
use pf_core::{ensure_finite, Real};

/// Boundary contribution of a Dirichlet face: `coefficient * value` is added
/// to the stencil sum when evaluating the flux.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirichletData {
    pub coefficient: Real,
    pub value: Real,
}

#[derive(Clone, Debug, Default)]
pub struct FluxVarsCache {
    face: usize,
    stencil: Vec<usize>,
    tij: Vec<Real>,
    dirichlet: Option<DirichletData>,
    sign_switched: bool,
    filled: bool,
}

impl FluxVarsCache {
    pub fn new(face: usize) -> Self {
        Self {
            face,
            ..Self::default()
        }
    }

    /// Global index of the face this cache belongs to.
    pub fn face(&self) -> usize {
        self.face
    }

    /// Store the solved coefficients. Enforces one coefficient per stencil
    /// entry and rejects non-finite values; marks the cache as filled.
    pub fn set_transmissibilities(
        &mut self,
        stencil: Vec<usize>,
        tij: Vec<Real>,
        dirichlet: Option<DirichletData>,
        sign_switched: bool,
    ) -> FluxResult<()> {
        if stencil.len() != tij.len() {
            return Err(FluxError::StencilMismatch {
                face: self.face,
                stencil: stencil.len(),
                coefficients: tij.len(),
            });
        }
        for &t in &tij {
            ensure_finite(t, "transmissibility")?;
        }
        if let Some(d) = &dirichlet {
            ensure_finite(d.coefficient, "dirichlet coefficient")?;
            ensure_finite(d.value, "dirichlet value")?;
        }
        self.stencil = stencil;
        self.tij = tij;
        self.dirichlet = dirichlet;
        self.sign_switched = sign_switched;
        self.filled = true;
        Ok(())
    }

    pub fn filled(&self) -> bool {
        self.filled
    }

    /// Degrees of freedom the face flux depends on, ascending order.
    pub fn stencil(&self) -> &[usize] {
        &self.stencil
    }

    pub fn transmissibilities(&self) -> &[Real] {
        &self.tij
    }

    pub fn dirichlet(&self) -> Option<&DirichletData> {
        self.dirichlet.as_ref()
    }

    /// Whether the bound element sits opposite the face's canonical
    /// orientation; the stored coefficients already account for it.
    pub fn sign_switched(&self) -> bool {
        self.sign_switched
    }

    /// Kirchhoff potential flux out of the bound element, per unit mobility:
    /// the stencil sum plus any Dirichlet contribution. Models multiply by
    /// the upwinded mobility and density afterwards.
    pub fn advective_flux(&self, pressure: &dyn Fn(usize) -> Real) -> FluxResult<Real> {
        if !self.filled {
            return Err(FluxError::NotFilled { face: self.face });
        }
        let mut flux = 0.0;
        for (&dof, &t) in self.stencil.iter().zip(&self.tij) {
            flux += t * pressure(dof);
        }
        if let Some(d) = &self.dirichlet {
            flux += d.coefficient * d.value;
        }
        Ok(flux)
    }
}

/// Caches of all faces of one bound element, in bind order.
#[derive(Clone, Debug, Default)]
pub struct ElementFluxVarsCache {
    caches: Vec<FluxVarsCache>,
}

impl ElementFluxVarsCache {
    pub fn new(caches: Vec<FluxVarsCache>) -> Self {
        Self { caches }
    }

    pub fn caches(&self) -> &[FluxVarsCache] {
        &self.caches
    }

    /// Cache of the face with the given global index.
    pub fn for_face(&self, face: usize) -> FluxResult<&FluxVarsCache> {
        self.caches
            .iter()
            .find(|c| c.face() == face)
            .ok_or(FluxError::NotFilled { face })
    }
}
