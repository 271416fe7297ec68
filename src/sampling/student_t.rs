// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand_distr::{ChiSquared, Distribution};

use super::gaussian;
use crate::distributions::Scale;
use crate::error::SamplingError;

/// Mixing law `chi^2(nu)` of the Student-t scale mixture.
pub fn mixing(nu: f64) -> Result<ChiSquared<f64>, SamplingError> {
    if !(nu.is_finite() && nu > 0.0) {
        return Err(SamplingError::InvalidParameter(format!(
            "degrees of freedom must be positive, got {nu}"
        )));
    }
    ChiSquared::new(nu).map_err(|e| SamplingError::InvalidParameter(e.to_string()))
}

/// Divide each Gaussian row by `sqrt(W / nu)` with an independent `W ~ chi^2(nu)`.
pub fn mix_rows(rows: &mut Array2<f64>, chi_squared: &ChiSquared<f64>, nu: f64, rng: &mut StdRng) {
    for mut row in rows.axis_iter_mut(Axis(0)) {
        let w = chi_squared.sample(rng);
        row *= (nu / w).sqrt();
    }
}

/// Multivariate Student-t rows as a scale mixture of Gaussians.
pub fn sample(scale: &Scale, nu: f64, size: usize, rng: &mut StdRng) -> Result<Array2<f64>, SamplingError> {
    let chi_squared = mixing(nu)?;
    let mut rows = gaussian::sample(scale, size, rng)?;
    mix_rows(&mut rows, &chi_squared, nu, rng);
    Ok(rows)
}
