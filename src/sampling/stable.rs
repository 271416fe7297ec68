// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array2, Axis};
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::Exp1;
use std::f64::consts::PI;

use super::gaussian;
use crate::distributions::Scale;
use crate::error::SamplingError;

/// Totally skewed positive stable variate with index `a` in `(0, 1]` and
/// Laplace transform `E exp(-s A) = exp(-s^a)` (Chambers–Mallows–Stuck in Kanter's form).
pub fn positive_stable(a: f64, rng: &mut StdRng) -> f64 {
    if a >= 1.0 {
        return 1.0;
    }
    let theta = loop {
        let t = PI * rng.r#gen::<f64>();
        if t > 0.0 {
            break t;
        }
    };
    let w: f64 = rng.sample(Exp1);
    let numerator = (a * theta).sin() / theta.sin().powf(1.0 / a);
    numerator * (((1.0 - a) * theta).sin() / w).powf((1.0 - a) / a)
}

/// Sub-Gaussian elliptical stable rows `sqrt(A) * G` with `G ~ N(0, Sigma)`
/// and `A` positive `stability/2`-stable, independent per row.
///
/// The characteristic function is `exp(-(t' Sigma t / 2)^{stability/2})`;
/// at `stability = 2` the rows are exactly Gaussian.
pub fn sample(scale: &Scale, stability: f64, size: usize, rng: &mut StdRng) -> Result<Array2<f64>, SamplingError> {
    check_stability(stability)?;
    let mut rows = gaussian::sample(scale, size, rng)?;
    subordinate_rows(&mut rows, stability, rng);
    Ok(rows)
}

pub fn check_stability(stability: f64) -> Result<(), SamplingError> {
    if stability > 0.0 && stability <= 2.0 {
        Ok(())
    } else {
        Err(SamplingError::InvalidParameter(format!(
            "stability index must lie in (0, 2], got {stability}"
        )))
    }
}

/// Scale each row by `sqrt(A)`; a no-op at `stability = 2`.
pub fn subordinate_rows(rows: &mut Array2<f64>, stability: f64, rng: &mut StdRng) {
    let a = stability / 2.0;
    if a >= 1.0 {
        return;
    }
    for mut row in rows.axis_iter_mut(Axis(0)) {
        row *= positive_stable(a, rng).sqrt();
    }
}
