//! Sign-preserving power.
//!
//! Noisy blank-subtracted ODs routinely push the 4PL base `x/C` (forward) or
//! `(A-D)/(y-D) - 1` (inverse) below zero, where `powf` with a fractional
//! exponent returns NaN. Both directions of the curve therefore use
//!
//! ```text
//! sign(v) * |v|^e
//! ```
//!
//! which is odd-symmetric around zero and finite for every finite input.

/// Compute `sign(v) * |v|^e`.
///
/// `sign(0) = 0`, so zero maps to zero for any exponent (including negative
/// exponents, where `0^e` would otherwise be infinite).
pub fn signed_pow(v: f64, e: f64) -> f64 {
    if v == 0.0 {
        return 0.0;
    }
    v.signum() * v.abs().powf(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_powf_on_positive_base() {
        for &(v, e) in &[(2.0, 1.5), (0.25, 0.5), (10.0, -1.2)] {
            assert!((signed_pow(v, e) - f64::powf(v, e)).abs() < 1e-12);
        }
    }

    #[test]
    fn negative_base_is_mirrored_not_nan() {
        let v = signed_pow(-4.0, 0.5);
        assert!((v + 2.0).abs() < 1e-12, "got {v}");
        assert_eq!(signed_pow(0.0, -0.7), 0.0);
    }
}
