// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! kNN (exponential-family) Rényi and Shannon entropy estimators, in bits.
//!
//! Leonenko–Pronzato, for `alpha != 1`:
//!
//! ```text
//! I_alpha = ((N-1) C_k V_m)^(1-alpha) * mean_i rho_{k,i}^(m (1-alpha))
//! C_k     = (Gamma(k) / Gamma(k + 1 - alpha))^(1 / (1-alpha))
//! H_alpha = log2(I_alpha) / (1 - alpha)
//! ```
//!
//! Kozachenko–Leonenko (the `alpha -> 1` limit of both methods):
//!
//! ```text
//! H = (psi(N) - psi(k)) / ln 2 + log2(V_m) + m * mean_i log2(rho_{k,i})
//! ```
//!
//! `V_m` is the volume of the unit ball of the chosen metric in `m` dimensions.
//! Points with a zero radius (duplicates) are dropped from the sums.

use ndarray::ArrayView2;
use statrs::function::gamma::{digamma, ln_gamma};
use std::f64::consts::{LN_2, PI};

use super::dataset::{NeighborRadii, neighbor_radii};
use super::{Estimates, Estimator, EstimatorConfig, IndexSet, Method, Metric};
use crate::error::EstimatorError;
use crate::numeric::{NumericBackend, log2_sum_exp2};
use crate::oracle::SHANNON_TOLERANCE;

/// `log2` of the unit-ball volume in `m` dimensions.
pub fn log2_unit_ball_volume(metric: Metric, m: usize) -> f64 {
    let m_f = m as f64;
    match metric {
        // pi^{m/2} / Gamma(m/2 + 1)
        Metric::Euclidean => m_f / 2.0 * PI.log2() - ln_gamma(m_f / 2.0 + 1.0) / LN_2,
        // 2^m / m!
        Metric::Manhattan => m_f - ln_gamma(m_f + 1.0) / LN_2,
        // 2^m
        Metric::Chebyshev => m_f,
    }
}

/// kNN entropy estimator configured once per sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KnnEstimator {
    config: EstimatorConfig,
}

impl KnnEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Entropy of order `alpha` from the `k`-th neighbour radii.
    pub fn entropy_for_k(
        &self,
        radii: &NeighborRadii,
        n_samples: usize,
        dimension: usize,
        k: usize,
        alpha: f64,
    ) -> Result<f64, EstimatorError> {
        let rho = radii.kth(k);
        let log2_volume = log2_unit_ball_volume(self.config.metric, dimension);
        let m = dimension as f64;

        if (alpha - 1.0).abs() < SHANNON_TOLERANCE {
            return kozachenko_leonenko(rho, n_samples, k, m, log2_volume);
        }
        match self.config.method {
            Method::KozachenkoLeonenko => Err(EstimatorError::UnsupportedAlpha {
                alpha,
                reason: "Kozachenko-Leonenko estimates Shannon entropy only".into(),
            }),
            Method::LeonenkoPronzato => {
                leonenko_pronzato(rho, n_samples, k, m, log2_volume, alpha, self.config.backend)
            }
        }
    }
}

fn positive_log2_radii(rho: &[f64]) -> Result<Vec<f64>, EstimatorError> {
    let logs: Vec<f64> = rho.iter().filter(|&&r| r > 0.0).map(|r| r.log2()).collect();
    if logs.is_empty() {
        return Err(EstimatorError::Arithmetic("all neighbour distances are zero".into()));
    }
    Ok(logs)
}

fn kozachenko_leonenko(
    rho: &[f64],
    n_samples: usize,
    k: usize,
    m: f64,
    log2_volume: f64,
) -> Result<f64, EstimatorError> {
    let logs = positive_log2_radii(rho)?;
    let mean_log2_rho = logs.iter().sum::<f64>() / logs.len() as f64;
    let value = (digamma(n_samples as f64) - digamma(k as f64)) / LN_2 + log2_volume + m * mean_log2_rho;
    finite(value)
}

fn leonenko_pronzato(
    rho: &[f64],
    n_samples: usize,
    k: usize,
    m: f64,
    log2_volume: f64,
    alpha: f64,
    backend: NumericBackend,
) -> Result<f64, EstimatorError> {
    let k_f = k as f64;
    if !(alpha > 0.0 && alpha < k_f + 1.0) {
        return Err(EstimatorError::UnsupportedAlpha {
            alpha,
            reason: format!("Leonenko-Pronzato with k = {k} needs 0 < alpha < {}", k + 1),
        });
    }
    let one_minus_alpha = 1.0 - alpha;
    let logs = positive_log2_radii(rho)?;

    // (1 - alpha) log2 C_k
    let log2_c_k_scaled = (ln_gamma(k_f) - ln_gamma(k_f + 1.0 - alpha)) / LN_2;
    let log2_prefactor =
        one_minus_alpha * (((n_samples - 1) as f64).log2() + log2_volume) + log2_c_k_scaled;

    let terms: Vec<f64> = logs.iter().map(|l| m * one_minus_alpha * l).collect();
    let log2_mean = log2_sum_exp2(&terms, backend) - (logs.len() as f64).log2();
    if !log2_mean.is_finite() {
        return Err(EstimatorError::Arithmetic(format!(
            "non-finite neighbour power sum at alpha = {alpha}"
        )));
    }
    finite((log2_prefactor + log2_mean) / one_minus_alpha)
}

fn finite(value: f64) -> Result<f64, EstimatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimatorError::Arithmetic(format!("non-finite entropy estimate {value}")))
    }
}

impl Estimator for KnnEstimator {
    /// Every set's estimate is the mean of its per-`k` estimates.
    fn estimate(
        &self,
        data: ArrayView2<'_, f64>,
        alphas: &[f64],
        index_sets: &[IndexSet],
    ) -> Result<Estimates, EstimatorError> {
        if index_sets.is_empty() || index_sets.iter().any(IndexSet::is_empty) {
            return Err(EstimatorError::InvalidInput("index sets must be non-empty".into()));
        }
        if index_sets.iter().any(|s| s.indices().contains(&0)) {
            return Err(EstimatorError::InvalidInput("neighbour indices start at 1".into()));
        }
        let k_max = index_sets.iter().map(IndexSet::max).max().unwrap_or(1);
        let (n_samples, dimension) = data.dim();
        let radii = neighbor_radii(data, self.config.metric, k_max)?;

        let mut estimates = Estimates::new();
        for &alpha in alphas {
            for set in index_sets {
                let mut total = 0.0;
                for &k in set.indices() {
                    total += self.entropy_for_k(&radii, n_samples, dimension, k, alpha)?;
                }
                estimates.insert(alpha, set.clone(), total / set.indices().len() as f64);
            }
        }
        Ok(estimates)
    }
}
