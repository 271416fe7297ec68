// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use statrs::function::beta::ln_beta;
use statrs::function::gamma::digamma;
use std::f64::consts::LN_2;

use super::is_shannon;
use crate::error::OracleError;

/// Rényi entropy (bits) of Beta(a, b) on `[0, 1]`.
///
/// `H_alpha = log2[ B(alpha(a-1)+1, alpha(b-1)+1) / B(a, b)^alpha ] / (1 - alpha)`;
/// the integral of the density power diverges unless both Beta arguments are positive.
///
/// The numerator arguments come from `integral x^{alpha(a-1)} (1-x)^{alpha(b-1)} dx`.
/// Reference tables that tabulate `B(alpha a + alpha - 1, alpha b + alpha - 1)`
/// use a different expression; it disagrees with this one for `alpha != 1`
/// and does not tend to the Shannon value as `alpha -> 1`.
pub fn renyi(a: f64, b: f64, alpha: f64) -> Result<f64, OracleError> {
    if !(a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0) {
        return Err(OracleError::InvalidParameter(format!(
            "Beta shape parameters must be positive, got a={a}, b={b}"
        )));
    }
    let ln_b_ab = ln_beta(a, b);

    if is_shannon(alpha) {
        let h = ln_b_ab - (a - 1.0) * digamma(a) - (b - 1.0) * digamma(b)
            + (a + b - 2.0) * digamma(a + b);
        return Ok(h / LN_2);
    }

    let a_alpha = alpha * (a - 1.0) + 1.0;
    let b_alpha = alpha * (b - 1.0) + 1.0;
    if a_alpha <= 0.0 || b_alpha <= 0.0 {
        return Err(OracleError::InvalidParameter(format!(
            "Rényi entropy of Beta(a={a}, b={b}) diverges for alpha={alpha}"
        )));
    }
    Ok((ln_beta(a_alpha, b_alpha) - alpha * ln_b_ab) / (1.0 - alpha) / LN_2)
}
