// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closed-form Rényi entropies ("oracle" values), in bits.
//!
//! Orders with `|alpha - 1| < 1e-12` are evaluated with the Shannon closed
//! form; the general Rényi expression is `0/0` there.

pub mod beta;
pub mod gaussian;
pub mod student_t;

use nalgebra::DMatrix;
use ndarray::Array2;

use crate::distributions::{DistributionDescriptor, Family, Scale};
use crate::error::OracleError;
use crate::numeric::NumericBackend;

/// Tolerance under which an order is treated as the Shannon limit.
pub const SHANNON_TOLERANCE: f64 = 1e-12;

pub(crate) fn is_shannon(alpha: f64) -> bool {
    (alpha - 1.0).abs() < SHANNON_TOLERANCE
}

/// Ground-truth entropy of a parametric distribution.
pub trait Oracle: Sync {
    /// Rényi entropy of order `alpha` in bits.
    fn entropy(&self, descriptor: &DistributionDescriptor, alpha: f64) -> Result<f64, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&DistributionDescriptor, f64) -> Result<f64, OracleError> + Sync,
{
    fn entropy(&self, descriptor: &DistributionDescriptor, alpha: f64) -> Result<f64, OracleError> {
        self(descriptor, alpha)
    }
}

/// Analytic oracle for the Gaussian, Student-t, Beta and (at stability 2)
/// elliptical-stable families.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticOracle {
    backend: NumericBackend,
}

impl AnalyticOracle {
    pub fn new(backend: NumericBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> NumericBackend {
        self.backend
    }
}

impl Oracle for AnalyticOracle {
    fn entropy(&self, descriptor: &DistributionDescriptor, alpha: f64) -> Result<f64, OracleError> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(OracleError::InvalidParameter(format!(
                "Rényi order must be positive and finite, got {alpha}"
            )));
        }
        let scale = descriptor.scale();
        let dimension = descriptor.dimension();

        match descriptor.family() {
            Family::Gaussian => match scale {
                Scale::Scalar(sigma) => Ok(gaussian::renyi_1d(positive_sigma(*sigma)?, alpha)),
                _ => Ok(gaussian::renyi_nd(dimension, log2_determinant(scale, self.backend)?, alpha)),
            },
            Family::StudentT { degrees_of_freedom } => student_t::renyi(
                dimension,
                degrees_of_freedom,
                log2_determinant(scale, self.backend)?,
                alpha,
            ),
            Family::Beta { a, b } => match scale.univariate_sigma() {
                // Rényi entropies shift by log2(sigma) under scaling of the support
                Some(sigma) => Ok(beta::renyi(a, b, alpha)? + positive_sigma(sigma)?.log2()),
                None => Err(OracleError::InvalidParameter(format!(
                    "Beta distribution needs a scalar or one-dimensional structured scale, got a {}-D {} scale",
                    dimension,
                    scale.kind()
                ))),
            },
            Family::EllipticalStable { stability } => {
                if (stability - 2.0).abs() < SHANNON_TOLERANCE {
                    Ok(gaussian::renyi_nd(dimension, log2_determinant(scale, self.backend)?, alpha))
                } else {
                    Err(OracleError::UnsupportedFamily(descriptor.family().to_string()))
                }
            }
        }
    }
}

fn positive_sigma(sigma: f64) -> Result<f64, OracleError> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(sigma)
    } else {
        Err(OracleError::InvalidParameter(format!("scale must be positive and finite, got {sigma}")))
    }
}

/// `log2 det Sigma` of the covariance described by `scale`.
pub fn log2_determinant(scale: &Scale, backend: NumericBackend) -> Result<f64, OracleError> {
    match scale {
        Scale::Scalar(sigma) => Ok(2.0 * positive_sigma(*sigma)?.log2()),
        Scale::Matrix(covariance) => log2_determinant_spd(covariance),
        Scale::Structured { sigma, dimension, correlation } => {
            let sigma = positive_sigma(*sigma)?;
            if *dimension == 0 {
                return Err(OracleError::InvalidParameter("dimension must be at least 1".into()));
            }
            Ok(*dimension as f64 * 2.0 * sigma.log2() + correlation.log2_determinant(*dimension, backend)?)
        }
    }
}

/// `log2 det` of an explicit symmetric positive-definite matrix via Cholesky.
pub fn log2_determinant_spd(matrix: &Array2<f64>) -> Result<f64, OracleError> {
    let (rows, cols) = matrix.dim();
    if rows != cols || rows == 0 {
        return Err(OracleError::InvalidParameter(format!(
            "covariance must be a non-empty square matrix, got {rows}x{cols}"
        )));
    }
    let max_abs = matrix.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    for i in 0..rows {
        for j in (i + 1)..rows {
            if (matrix[[i, j]] - matrix[[j, i]]).abs() > 1e-10 * max_abs.max(1.0) {
                return Err(OracleError::InvalidParameter(format!(
                    "covariance is not symmetric at ({i}, {j})"
                )));
            }
        }
    }

    let dense = DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]]);
    let cholesky = dense.cholesky().ok_or_else(|| {
        OracleError::InvalidParameter("covariance is not positive-definite".into())
    })?;
    let l = cholesky.l();
    Ok(2.0 * (0..rows).map(|i| l[(i, i)].log2()).sum::<f64>())
}
