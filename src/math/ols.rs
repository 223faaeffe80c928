//! Linear least squares solver.
//!
//! Every Levenberg–Marquardt step is a small linear problem
//!
//! ```text
//! minimize || J δ + r ||² + λ || D δ ||²
//! ```
//!
//! which we write as one tall system `[J; √λ D] δ = [-r; 0]` and hand to this
//! solver.
//!
//! Implementation choices:
//! - SVD solves tall (more rows than columns) systems robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is 4, so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_overdetermined_line() {
        // y = 0.5 - 2x sampled exactly at x = [0, 1, 2, 3]
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = DVector::from_row_slice(&[0.5, -1.5, -3.5, -5.5]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 0.5).abs() < 1e-10);
        assert!((beta[1] + 2.0).abs() < 1e-10);
    }
}
