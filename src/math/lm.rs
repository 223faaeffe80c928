//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ r_i(p)²` for a residual function `r: R^n -> R^m`, following
//! MINPACK's `lmdif` recipe:
//!
//! - forward-difference Jacobian (no analytic derivatives needed)
//! - Marquardt scaling `D = diag(||J_j||)` so the damping is invariant to
//!   parameter units
//! - damping `λ` shrinks 10x after an accepted step and grows 10x after a
//!   rejected one
//!
//! Each damped step solves `[J; √λ D] δ = [-r; 0]` through the SVD solver in
//! `math::ols`.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

/// Relative step used for forward differences (√ machine epsilon).
const FD_STEP: f64 = 1.490_116_119_384_765_6e-8;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// Stopping rules.
#[derive(Debug, Clone, Copy)]
pub struct LmOptions {
    pub max_iterations: usize,
    /// Stop when an accepted step reduces SSE by less than this fraction.
    pub ftol: f64,
    /// Stop when an accepted step is smaller than this, relative to `||p||`.
    pub xtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            ftol: 1e-10,
            xtol: 1e-10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LmError {
    /// Residuals were not finite at the starting point.
    NonFiniteStart,
    /// The iteration cap was reached before a stopping rule fired.
    NotConverged { iterations: usize },
}

/// Run Levenberg–Marquardt from `p0`.
///
/// `residuals` must return the same number of residuals for every parameter
/// vector. Non-finite residuals at a trial point reject that step.
pub fn levenberg_marquardt<F>(residuals: F, p0: &[f64], opts: &LmOptions) -> Result<LmSolution, LmError>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = p0.len();
    let mut p = DVector::from_row_slice(p0);
    let mut r = DVector::from_vec(residuals(p.as_slice()));
    if !r.iter().all(|v| v.is_finite()) {
        return Err(LmError::NonFiniteStart);
    }
    let m = r.len();
    let mut sse = r.norm_squared();
    let mut lambda = LAMBDA_INIT;

    for iteration in 1..=opts.max_iterations {
        if sse == 0.0 {
            return Ok(solution(&p, sse, iteration - 1));
        }

        let jac = forward_difference_jacobian(&residuals, &p, &r);
        let scale: Vec<f64> = (0..n).map(|j| jac.column(j).norm().max(1e-12)).collect();

        loop {
            let mut aug = DMatrix::<f64>::zeros(m + n, n);
            let mut rhs = DVector::<f64>::zeros(m + n);
            aug.view_mut((0, 0), (m, n)).copy_from(&jac);
            for i in 0..m {
                rhs[i] = -r[i];
            }
            let damp = lambda.sqrt();
            for j in 0..n {
                aug[(m + j, j)] = damp * scale[j];
            }

            if let Some(delta) = solve_least_squares(&aug, &rhs) {
                let trial = &p + &delta;
                let r_trial = DVector::from_vec(residuals(trial.as_slice()));
                let sse_trial = r_trial.norm_squared();

                if r_trial.len() == m && sse_trial.is_finite() && sse_trial < sse {
                    let reduction = (sse - sse_trial) / sse;
                    let step = delta.norm() / (p.norm() + opts.xtol);

                    p = trial;
                    r = r_trial;
                    sse = sse_trial;
                    lambda = (lambda / 10.0).max(LAMBDA_MIN);
                    debug!("lm iter {iteration}: sse={sse:.6e} lambda={lambda:.1e}");

                    if reduction < opts.ftol || step < opts.xtol {
                        return Ok(solution(&p, sse, iteration));
                    }
                    break;
                }
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No damped step lowers SSE: p is a minimum to working precision.
                return Ok(solution(&p, sse, iteration));
            }
        }
    }

    Err(LmError::NotConverged {
        iterations: opts.max_iterations,
    })
}

fn forward_difference_jacobian<F>(residuals: &F, p: &DVector<f64>, r: &DVector<f64>) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let m = r.len();
    let n = p.len();
    let mut jac = DMatrix::<f64>::zeros(m, n);
    let mut probe = p.clone();

    for j in 0..n {
        let h = if p[j] == 0.0 { FD_STEP } else { FD_STEP * p[j].abs() };
        probe[j] = p[j] + h;
        let shifted = residuals(probe.as_slice());
        for i in 0..m {
            let d = (shifted[i] - r[i]) / h;
            jac[(i, j)] = if d.is_finite() { d } else { 0.0 };
        }
        probe[j] = p[j];
    }

    jac
}

fn solution(p: &DVector<f64>, sse: f64, iterations: usize) -> LmSolution {
    LmSolution {
        params: p.iter().copied().collect(),
        sse,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_exponential_decay() {
        // y = 3 exp(-0.7 t) sampled exactly.
        let t: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = t.iter().map(|&ti| 3.0 * (-0.7 * ti).exp()).collect();

        let sol = levenberg_marquardt(
            |p| {
                t.iter()
                    .zip(&y)
                    .map(|(&ti, &yi)| yi - p[0] * (-p[1] * ti).exp())
                    .collect()
            },
            &[1.0, 0.1],
            &LmOptions::default(),
        )
        .unwrap();

        assert!((sol.params[0] - 3.0).abs() < 1e-6, "{:?}", sol.params);
        assert!((sol.params[1] - 0.7).abs() < 1e-6, "{:?}", sol.params);
        assert!(sol.sse < 1e-12);
    }

    #[test]
    fn non_finite_start_is_rejected() {
        let err = levenberg_marquardt(|_| vec![f64::NAN, 1.0], &[0.0], &LmOptions::default()).unwrap_err();
        assert_eq!(err, LmError::NonFiniteStart);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let opts = LmOptions {
            max_iterations: 1,
            ftol: 0.0,
            xtol: 0.0,
        };
        // Rosenbrock residuals need many iterations from (-1.2, 1).
        let err = levenberg_marquardt(
            |p| vec![10.0 * (p[1] - p[0] * p[0]), 1.0 - p[0]],
            &[-1.2, 1.0],
            &opts,
        )
        .unwrap_err();
        assert_eq!(err, LmError::NotConverged { iterations: 1 });
    }
}
