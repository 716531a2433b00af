//! Least-squares line fitting for the BTFR log-log slope.
//!
//! The problem is tiny (two columns, a few hundred rows), so we solve it with
//! SVD, which stays robust even when the design matrix is tall or the
//! velocity range is narrow enough to make the columns nearly collinear.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = slope * x + intercept` and return `(slope, intercept)`.
///
/// Returns `None` when fewer than two points are supplied or the solve fails.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len();
    let mut design = DMatrix::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let rhs = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &rhs)?;
    Some((beta[1], beta[0]))
}
