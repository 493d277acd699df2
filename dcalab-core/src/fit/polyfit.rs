//! Least-squares polynomial fitting on `nalgebra`'s SVD.
//!
//! Columns of the Vandermonde matrix are scaled to unit norm, then solved in
//! the minimum-norm least-squares sense. Singular values below
//! `rows * f64::EPSILON * s_max` are treated as zero, so a rank-deficient
//! design still yields a solution; the numerical rank is reported alongside.

use nalgebra::{DMatrix, DVector, SVD};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolyfitError {
    #[error("SVD did not converge for a {rows}x{columns} design matrix")]
    NoConvergence { rows: usize, columns: usize },

    #[error("least-squares solve failed: {0}")]
    Solve(&'static str),

    #[error("fit produced non-finite coefficients")]
    NonFinite,
}

/// Coefficients in ascending power plus the numerical rank of the design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub coeffs: Vec<f64>,
    pub rank: usize,
}

impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn is_full_rank(&self) -> bool {
        self.rank == self.coeffs.len()
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }
}

/// Fit `y ≈ Σ c_j x^j` for `j = 0..=degree`.
///
/// Callers guarantee `x.len() == y.len()`.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, PolyfitError> {
    let rows = x.len();
    let cols = degree + 1;
    debug_assert_eq!(rows, y.len());

    let mut design = DMatrix::from_fn(rows, cols, |i, j| x[i].powi(j as i32));
    let scale: Vec<f64> = design
        .column_iter()
        .map(|col| match col.norm() {
            n if n > 0.0 && n.is_finite() => n,
            _ => 1.0,
        })
        .collect();
    for (mut col, s) in design.column_iter_mut().zip(&scale) {
        col /= *s;
    }

    let svd = SVD::try_new(design, true, true, f64::EPSILON, 0).ok_or(
        PolyfitError::NoConvergence {
            rows,
            columns: cols,
        },
    )?;
    let s_max = svd.singular_values.max();
    let cutoff = rows as f64 * f64::EPSILON * s_max;
    let rank = svd.rank(cutoff);

    let b = DVector::from_column_slice(y);
    let solution = svd.solve(&b, cutoff).map_err(PolyfitError::Solve)?;

    let coeffs: Vec<f64> = solution.iter().zip(&scale).map(|(c, s)| c / s).collect();
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(PolyfitError::NonFinite);
    }
    Ok(Polynomial { coeffs, rank })
}
