//! Compressed sparse row storage with the pattern split from the values.
//!
//! The pattern is built once per grid topology and reused across Newton
//! iterations; only the values change. Writes outside the pattern are
//! errors, never silent extensions.

use crate::error::{AssemblyError, AssemblyResult};
use nalgebra::DMatrix;
use pf_core::Real;

#[derive(Clone, Debug)]
pub struct CsrPattern {
    n_rows: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
}

impl CsrPattern {
    /// Build from per-row column lists. Columns are sorted and deduplicated.
    pub fn from_rows(n_rows: usize, rows: Vec<Vec<usize>>) -> AssemblyResult<Self> {
        if rows.len() != n_rows {
            return Err(AssemblyError::SizeMismatch {
                what: "one column list per row required",
            });
        }
        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_idx = Vec::new();
        row_ptr.push(0);
        for mut cols in rows {
            cols.sort_unstable();
            cols.dedup();
            col_idx.extend_from_slice(&cols);
            row_ptr.push(col_idx.len());
        }
        Ok(Self {
            n_rows,
            row_ptr,
            col_idx,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    pub fn row_indices(&self, row: usize) -> &[usize] {
        &self.col_idx[self.row_ptr[row]..self.row_ptr[row + 1]]
    }

    /// Value-array index of entry (row, col).
    pub fn find(&self, row: usize, col: usize) -> Option<usize> {
        let start = self.row_ptr[row];
        let cols = self.row_indices(row);
        cols.binary_search(&col).ok().map(|k| start + k)
    }
}

#[derive(Clone, Debug)]
pub struct CsrMatrix {
    pattern: CsrPattern,
    values: Vec<Real>,
}

impl CsrMatrix {
    pub fn zeros(pattern: CsrPattern) -> Self {
        let nnz = pattern.nnz();
        Self {
            pattern,
            values: vec![0.0; nnz],
        }
    }

    pub fn pattern(&self) -> &CsrPattern {
        &self.pattern
    }

    pub fn set(&mut self, row: usize, col: usize, value: Real) -> AssemblyResult<()> {
        let idx = self
            .pattern
            .find(row, col)
            .ok_or(AssemblyError::PatternEntryMissing { row, col })?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Real {
        self.pattern
            .find(row, col)
            .map(|idx| self.values[idx])
            .unwrap_or(0.0)
    }

    /// Zero the row and put 1 on the diagonal; ghost rows stay inert in the
    /// global solve.
    pub fn set_identity_row(&mut self, row: usize) -> AssemblyResult<()> {
        let (start, end) = (self.pattern.row_ptr[row], self.pattern.row_ptr[row + 1]);
        for v in &mut self.values[start..end] {
            *v = 0.0;
        }
        self.set(row, row, 1.0)
    }

    pub fn mul_vec(&self, x: &[Real], y: &mut [Real]) {
        for row in 0..self.pattern.n_rows {
            let (start, end) = (self.pattern.row_ptr[row], self.pattern.row_ptr[row + 1]);
            let mut acc = 0.0;
            for k in start..end {
                acc += self.values[k] * x[self.pattern.col_idx[k]];
            }
            y[row] = acc;
        }
    }

    /// Dense copy for the direct linear solve of small systems.
    pub fn to_dense(&self) -> DMatrix<Real> {
        let n = self.pattern.n_rows;
        let mut dense = DMatrix::zeros(n, n);
        for row in 0..n {
            let (start, end) = (self.pattern.row_ptr[row], self.pattern.row_ptr[row + 1]);
            for k in start..end {
                dense[(row, self.pattern.col_idx[k])] = self.values[k];
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiagonal(n: usize) -> CsrMatrix {
        let rows = (0..n)
            .map(|i| {
                let mut cols = vec![i];
                if i > 0 {
                    cols.push(i - 1);
                }
                if i + 1 < n {
                    cols.push(i + 1);
                }
                cols
            })
            .collect();
        let mut m = CsrMatrix::zeros(CsrPattern::from_rows(n, rows).unwrap());
        for i in 0..n {
            m.set(i, i, 2.0).unwrap();
            if i > 0 {
                m.set(i, i - 1, -1.0).unwrap();
            }
            if i + 1 < n {
                m.set(i, i + 1, -1.0).unwrap();
            }
        }
        m
    }

    #[test]
    fn writes_outside_pattern_fail() {
        let mut m = tridiagonal(4);
        assert!(matches!(
            m.set(0, 3, 1.0),
            Err(AssemblyError::PatternEntryMissing { row: 0, col: 3 })
        ));
    }

    #[test]
    fn mat_vec_matches_dense() {
        let m = tridiagonal(5);
        let x: Vec<Real> = (0..5).map(|i| i as Real).collect();
        let mut y = vec![0.0; 5];
        m.mul_vec(&x, &mut y);
        let dense = m.to_dense();
        let xd = nalgebra::DVector::from_vec(x);
        let yd = &dense * &xd;
        for i in 0..5 {
            assert!((y[i] - yd[i]).abs() < 1e-14);
        }
    }

    #[test]
    fn identity_row_is_inert() {
        let mut m = tridiagonal(4);
        m.set_identity_row(2).unwrap();
        assert_eq!(m.get(2, 1), 0.0);
        assert_eq!(m.get(2, 2), 1.0);
        assert_eq!(m.get(2, 3), 0.0);
    }
}
