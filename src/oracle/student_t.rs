// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use statrs::function::beta::ln_beta;
use statrs::function::gamma::{digamma, ln_gamma};
use std::f64::consts::{LN_2, PI};

use super::is_shannon;
use crate::error::OracleError;

/// Rényi entropy (bits) of a `dimension`-variate Student-t with `nu` degrees of
/// freedom and scale matrix `Sigma` (given as `log2 det Sigma`).
///
/// For `alpha != 1`:
///
/// `1/(1-alpha) log2[ B(d/2, alpha(nu+d)/2 - d/2) / B(nu/2, d/2)^alpha ]
///   + 1/2 log2((nu pi)^d det Sigma) - log2 Gamma(d/2)`
///
/// and the Shannon limit is
///
/// `1/2 log2 det Sigma + log2[(nu pi)^{d/2} B(d/2, nu/2) / Gamma(d/2)]
///   + (nu+d)/2 [psi((nu+d)/2) - psi(nu/2)] / ln 2`.
pub fn renyi(dimension: usize, nu: f64, log2_det: f64, alpha: f64) -> Result<f64, OracleError> {
    if !(nu.is_finite() && nu > 0.0) {
        return Err(OracleError::InvalidParameter(format!(
            "degrees of freedom must be positive, got {nu}"
        )));
    }
    if dimension == 0 {
        return Err(OracleError::InvalidParameter("dimension must be at least 1".into()));
    }
    let d = dimension as f64;
    let half_d = d / 2.0;
    let log2_volume = 0.5 * (d * (nu * PI).log2() + log2_det);
    let log2_gamma_half_d = ln_gamma(half_d) / LN_2;

    if is_shannon(alpha) {
        let half_nu_d = (nu + d) / 2.0;
        let tail = half_nu_d * (digamma(half_nu_d) - digamma(nu / 2.0)) / LN_2;
        return Ok(log2_volume + ln_beta(half_d, nu / 2.0) / LN_2 - log2_gamma_half_d + tail);
    }

    let second = alpha * (nu + d) / 2.0 - half_d;
    if second <= 0.0 {
        return Err(OracleError::InvalidParameter(format!(
            "Rényi entropy of Student-t(nu={nu}) in {dimension}-D diverges for alpha={alpha}"
        )));
    }
    let log2_beta_ratio = (ln_beta(half_d, second) - alpha * ln_beta(nu / 2.0, half_d)) / LN_2;
    Ok(log2_beta_ratio / (1.0 - alpha) + log2_volume - log2_gamma_half_d)
}
