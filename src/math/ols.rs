//! Least-squares autoregression.
//!
//! Used to seed the non-seasonal AR coefficients before the CSS search:
//!
//! ```text
//! minimize Σ_t (x_t - Σ_i φ_i x_{t-i})^2
//! ```
//!
//! The design matrix is tall (many more rows than lags), so we solve via SVD.
//! Nalgebra's `QR::solve` is intended for square systems and panics for
//! non-square matrices.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Constant or near-constant price series yield nearly collinear lag
    // columns, so accept progressively looser rank cutoffs.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Regress `x_t` on its first `lags` lags (no intercept).
///
/// Returns `None` when there are not at least `2 * lags` usable rows or the
/// solve fails.
pub fn fit_autoregression(x: &[f64], lags: usize) -> Option<Vec<f64>> {
    if lags == 0 {
        return Some(Vec::new());
    }
    let rows = x.len().checked_sub(lags)?;
    if rows < 2 * lags {
        return None;
    }

    let design = DMatrix::from_fn(rows, lags, |r, c| x[lags + r - 1 - c]);
    let target = DVector::from_iterator(rows, x[lags..].iter().copied());

    solve_least_squares(&design, &target).map(|beta| beta.iter().copied().collect())
}
