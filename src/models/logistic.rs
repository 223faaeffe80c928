//! 4-parameter logistic (4PL) evaluation and inversion.
//!
//! Forward:
//!
//! ```text
//! OD(x) = (A - D) / (1 + sign(x/C)·|x/C|^B) + D
//! ```
//!
//! Inverse:
//!
//! ```text
//! conc(y) = C · sign(s)·|s|^(1/B),   s = (A - D)/(y - D) - 1
//! ```
//!
//! Both use `signed_pow` rather than `powf`; see `math::power`. The inverse
//! is only meaningful for `y` strictly between the asymptotes. Callers
//! guard the range (curve sentinels) and check finiteness.

use crate::domain::FitParameters;
use crate::math::signed_pow;

/// OD predicted at concentration `x`.
pub fn logistic4(x: f64, p: &FitParameters) -> f64 {
    let ratio = signed_pow(x / p.c, p.b);
    (p.a - p.d) / (1.0 + ratio) + p.d
}

/// Concentration that produces OD `y`.
pub fn concentration(y: f64, p: &FitParameters) -> f64 {
    let s = (p.a - p.d) / (y - p.d) - 1.0;
    p.c * signed_pow(s, 1.0 / p.b)
}

/// Residuals `y_i - OD(x_i)` for a raw parameter slice `[A, B, C, D]`.
pub fn residuals(params: &[f64], x: &[f64], y: &[f64]) -> Vec<f64> {
    let p = FitParameters::from_slice(params);
    x.iter().zip(y).map(|(&xi, &yi)| yi - logistic4(xi, &p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: FitParameters = FitParameters {
        a: 0.05,
        b: 1.1,
        c: 80.0,
        d: 2.6,
    };

    #[test]
    fn asymptotes_and_midpoint() {
        assert!((logistic4(1e-9, &P) - P.a).abs() < 1e-6);
        assert!((logistic4(1e9, &P) - P.d).abs() < 1e-6);
        assert!((logistic4(P.c, &P) - (P.a + P.d) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_round_trips_inside_asymptotes() {
        let params = [
            P,
            FitParameters { a: 2.4, b: 0.8, c: 15.0, d: 0.02 },
            FitParameters { a: -0.01, b: 2.5, c: 300.0, d: 1.7 },
        ];
        for p in &params {
            let (lo, hi) = if p.a < p.d { (p.a, p.d) } else { (p.d, p.a) };
            for k in 1..20 {
                let y = lo + (hi - lo) * k as f64 / 20.0;
                let back = logistic4(concentration(y, p), p);
                assert!((back - y).abs() < 1e-9, "p={p:?} y={y} back={back}");
            }
        }
    }

    #[test]
    fn inverse_of_forward_recovers_concentration() {
        for &x in &[2.12, 11.4, 60.9, 326.5, 1000.0] {
            let back = concentration(logistic4(x, &P), &P);
            assert!((back - x).abs() / x < 1e-9, "x={x} back={back}");
        }
    }

    #[test]
    fn negative_concentration_stays_finite() {
        // Blank subtraction can leave an OD just under A, giving s < 0.
        let c = concentration(P.a - 0.01, &P);
        assert!(c.is_finite());
        assert!(c < 0.0);
    }
}
