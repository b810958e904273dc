//! Per-equation boundary-condition classification of one boundary face.

/// Kind of boundary condition for a single equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BcKind {
    /// Prescribed primary variable, enforced by residual substitution or a
    /// boundary flux through the cache.
    Dirichlet,
    /// Prescribed flux per unit area, overwrites the face flux.
    Neumann,
    /// Zero-gradient outflow; only valid together with a Dirichlet
    /// pressure.
    Outflow,
    /// Dirichlet with a zero velocity target.
    Symmetry,
}

/// One [`BcKind`] per equation of the governing system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryTypes {
    kinds: Vec<BcKind>,
}

impl BoundaryTypes {
    pub fn all_dirichlet(num_eq: usize) -> Self {
        Self {
            kinds: vec![BcKind::Dirichlet; num_eq],
        }
    }

    pub fn all_neumann(num_eq: usize) -> Self {
        Self {
            kinds: vec![BcKind::Neumann; num_eq],
        }
    }

    pub fn set(&mut self, eq: usize, kind: BcKind) -> &mut Self {
        self.kinds[eq] = kind;
        self
    }

    pub fn kind(&self, eq: usize) -> BcKind {
        self.kinds[eq]
    }

    pub fn num_eq(&self) -> usize {
        self.kinds.len()
    }

    pub fn has_dirichlet(&self) -> bool {
        self.kinds.contains(&BcKind::Dirichlet)
    }
}
