// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::f64::consts::{E, PI};

use super::is_shannon;

/// Rényi entropy (bits) of `N(0, sigma^2)`.
pub fn renyi_1d(sigma: f64, alpha: f64) -> f64 {
    if is_shannon(alpha) {
        (2.0 * PI * E * sigma * sigma).log2() / 2.0
    } else {
        (2.0 * PI).log2() / 2.0 + sigma.log2() + alpha.log2() / (alpha - 1.0) / 2.0
    }
}

/// Rényi entropy (bits) of a `dimension`-variate Gaussian given `log2 det Sigma`.
pub fn renyi_nd(dimension: usize, log2_det: f64, alpha: f64) -> f64 {
    let d = dimension as f64;
    if is_shannon(alpha) {
        (2.0 * PI * E).log2() * d / 2.0 + log2_det / 2.0
    } else {
        (2.0 * PI).log2() * d / 2.0 + log2_det / 2.0 + d * alpha.log2() / (alpha - 1.0) / 2.0
    }
}
