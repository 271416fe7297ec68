// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::{Normal, StandardNormal};

use crate::distributions::Scale;
use crate::error::SamplingError;

/// Relative eigenvalue tolerance below which a negative eigenvalue is rounding noise.
const EIGEN_EPS: f64 = 1e-12;

/// Linear map `V diag(sqrt(lambda))` taking standard normals to `N(0, Sigma)`.
#[derive(Debug, Clone)]
pub struct CovarianceFactor {
    transform: DMatrix<f64>,
}

impl CovarianceFactor {
    /// Eigendecompose `covariance`; fails before any sampling if it is not a
    /// square, symmetric, positive-semidefinite matrix.
    pub fn from_covariance(covariance: &Array2<f64>) -> Result<Self, SamplingError> {
        let (rows, cols) = covariance.dim();
        if rows != cols || rows == 0 {
            return Err(SamplingError::InvalidParameter(format!(
                "covariance must be a non-empty square matrix, got {rows}x{cols}"
            )));
        }
        let max_abs = covariance.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if !max_abs.is_finite() {
            return Err(SamplingError::InvalidParameter("covariance has non-finite entries".into()));
        }
        for i in 0..rows {
            for j in (i + 1)..rows {
                if (covariance[[i, j]] - covariance[[j, i]]).abs() > 1e-10 * max_abs.max(1.0) {
                    return Err(SamplingError::InvalidParameter(format!(
                        "covariance is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }

        let dense = DMatrix::from_fn(rows, cols, |i, j| covariance[[i, j]]);
        let eigen = SymmetricEigen::new(dense);
        let tolerance = EIGEN_EPS * max_abs;
        let mut standard_deviations = Vec::with_capacity(rows);
        for &lambda in eigen.eigenvalues.iter() {
            if lambda < -tolerance {
                return Err(SamplingError::InvalidParameter(format!(
                    "covariance is not positive-semidefinite (eigenvalue {lambda})"
                )));
            }
            standard_deviations.push(lambda.max(0.0).sqrt());
        }

        let mut transform = eigen.eigenvectors;
        for (j, sd) in standard_deviations.into_iter().enumerate() {
            transform.column_mut(j).scale_mut(sd);
        }
        Ok(Self { transform })
    }

    pub fn dimension(&self) -> usize {
        self.transform.nrows()
    }

    /// Draw `size` rows of `N(0, Sigma)`.
    ///
    /// The `dimension x size` block of standard normals is scaled by
    /// `sqrt(lambda)`, rotated by the eigenvectors and transposed into rows.
    pub fn sample(&self, size: usize, rng: &mut StdRng) -> Array2<f64> {
        let d = self.dimension();
        let uncorrelated = DMatrix::<f64>::from_fn(d, size, |_, _| rng.sample(StandardNormal));
        let correlated = &self.transform * uncorrelated;
        Array2::from_shape_fn((size, d), |(i, j)| correlated[(j, i)])
    }
}

/// Validated Gaussian source for one [`Scale`]; correlated scales keep their factor.
#[derive(Debug, Clone)]
pub enum GaussianSource {
    Scalar(Normal<f64>),
    Correlated(CovarianceFactor),
}

impl GaussianSource {
    pub fn from_scale(scale: &Scale) -> Result<Self, SamplingError> {
        match scale {
            Scale::Scalar(sigma) => {
                let normal = Normal::new(0.0, positive_sigma(*sigma)?)
                    .map_err(|e| SamplingError::InvalidParameter(e.to_string()))?;
                Ok(GaussianSource::Scalar(normal))
            }
            Scale::Matrix(covariance) => Ok(GaussianSource::Correlated(CovarianceFactor::from_covariance(covariance)?)),
            Scale::Structured { sigma, .. } => {
                positive_sigma(*sigma)?;
                Ok(GaussianSource::Correlated(CovarianceFactor::from_covariance(&scale.covariance())?))
            }
        }
    }

    pub fn sample(&self, size: usize, rng: &mut StdRng) -> Array2<f64> {
        match self {
            GaussianSource::Scalar(normal) => Array2::from_shape_fn((size, 1), |_| rng.sample(normal)),
            GaussianSource::Correlated(factor) => factor.sample(size, rng),
        }
    }
}

fn positive_sigma(sigma: f64) -> Result<f64, SamplingError> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(sigma)
    } else {
        Err(SamplingError::InvalidParameter(format!("scale must be positive and finite, got {sigma}")))
    }
}

/// Gaussian rows for any [`Scale`].
pub fn sample(scale: &Scale, size: usize, rng: &mut StdRng) -> Result<Array2<f64>, SamplingError> {
    Ok(GaussianSource::from_scale(scale)?.sample(size, rng))
}
