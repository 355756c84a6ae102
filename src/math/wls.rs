//! Weighted least squares solver.
//!
//! Each grid candidate of the line fitter solves a small linear regression:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2        w_i = 1 / error_i^2
//! ```
//!
//! The Gaussian model is linear in `[continuum, amp_1..amp_k]` given fixed
//! kinematic parameters, so β is re-solved many times during the grid search.
//!
//! Implementation choices:
//! - Rows are pre-scaled by `sqrt(w_i)` and we solve an ordinary
//!   least-squares problem via SVD, which stays robust when blended lines
//!   produce nearly collinear profile columns.
//! - Because weights are inverse variances, the parameter covariance of the
//!   solution is `(X_w^T X_w)^{-1}`, which flux error propagation needs.

use nalgebra::{DMatrix, DVector};

/// Solve a (pre-weighted) least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails; blended
    // complexes can produce nearly degenerate profile columns.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Parameter covariance `(X_w^T X_w)^{-1}` for a weighted design matrix.
///
/// Valid under the absolute-sigma convention (weights are 1/error^2).
/// Returns `None` when the normal matrix is singular or the inverse is not
/// finite.
pub fn parameter_covariance(xw: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let normal = xw.transpose() * xw;
    let inv = normal.try_inverse()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(inv)
    } else {
        None
    }
}
