// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parametric distribution descriptors.
//!
//! A [`DistributionDescriptor`] pairs a [`Family`] (with its shape parameters)
//! and a [`Scale`]. Both are tagged, so the oracle and the sample generator
//! dispatch on variants rather than on the runtime shape of a value.

pub mod correlation;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;
pub use correlation::{Correlation, CorrelationType};

/// Parametric family and its shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Family {
    Gaussian,
    StudentT { degrees_of_freedom: f64 },
    /// Beta(a, b) on `[0, σ]`; one-dimensional only
    Beta { a: f64, b: f64 },
    /// Sub-Gaussian symmetric stable law with stability index in `(0, 2]`
    EllipticalStable { stability: f64 },
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Gaussian => write!(f, "Gaussian"),
            Family::StudentT { degrees_of_freedom } => write!(f, "Student-t(nu={degrees_of_freedom})"),
            Family::Beta { a, b } => write!(f, "Beta(a={a}, b={b})"),
            Family::EllipticalStable { stability } => write!(f, "elliptical-stable(stability={stability})"),
        }
    }
}

/// Family selector as named on the command line, without shape parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    #[default]
    Gaussian,
    StudentT,
    Beta,
    EllipticalStable,
}

/// Shape parameters used to turn a [`NoiseType`] into a [`Family`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParameters {
    pub degrees_of_freedom: f64,
    pub stability: f64,
    pub beta_a: f64,
    pub beta_b: f64,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self { degrees_of_freedom: 3.0, stability: 2.0, beta_a: 2.0, beta_b: 2.0 }
    }
}

impl NoiseType {
    pub fn family(&self, shape: &ShapeParameters) -> Family {
        match self {
            NoiseType::Gaussian => Family::Gaussian,
            NoiseType::StudentT => Family::StudentT { degrees_of_freedom: shape.degrees_of_freedom },
            NoiseType::Beta => Family::Beta { a: shape.beta_a, b: shape.beta_b },
            NoiseType::EllipticalStable => Family::EllipticalStable { stability: shape.stability },
        }
    }
}

impl FromStr for NoiseType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "gaussian" | "normal" => Ok(NoiseType::Gaussian),
            "student_t" | "student" => Ok(NoiseType::StudentT),
            "beta" => Ok(NoiseType::Beta),
            "elliptical_stable" | "stable" => Ok(NoiseType::EllipticalStable),
            _ => Err(ConfigurationError::UnknownNoiseType(s.to_string())),
        }
    }
}

/// Scale of a distribution.
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    /// One-dimensional scale σ; the covariance is σ²
    Scalar(f64),
    /// Explicit covariance matrix
    Matrix(Array2<f64>),
    /// Covariance σ²·C(ρ) with a correlation skeleton known in closed form
    Structured { sigma: f64, dimension: usize, correlation: Correlation },
}

impl Scale {
    /// Number of coordinates; for a matrix this is its row count.
    pub fn dimension(&self) -> usize {
        match self {
            Scale::Scalar(_) => 1,
            Scale::Matrix(m) => m.nrows(),
            Scale::Structured { dimension, .. } => *dimension,
        }
    }

    /// Scale σ of a univariate scale: a scalar, or a structured scale of
    /// dimension 1 (where the correlation skeleton is the 1x1 identity).
    pub fn univariate_sigma(&self) -> Option<f64> {
        match self {
            Scale::Scalar(sigma) => Some(*sigma),
            Scale::Structured { sigma, dimension: 1, .. } => Some(*sigma),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Scale::Scalar(_) => "scalar",
            Scale::Matrix(_) => "matrix",
            Scale::Structured { .. } => "structured",
        }
    }

    /// Materialise the covariance matrix.
    pub fn covariance(&self) -> Array2<f64> {
        match self {
            Scale::Scalar(sigma) => Array2::from_elem((1, 1), sigma * sigma),
            Scale::Matrix(m) => m.clone(),
            Scale::Structured { sigma, dimension, correlation } => {
                correlation.skeleton(*dimension) * (sigma * sigma)
            }
        }
    }
}

/// Immutable description of one generative distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionDescriptor {
    family: Family,
    scale: Scale,
}

impl DistributionDescriptor {
    pub fn new(family: Family, scale: Scale) -> Self {
        Self { family, scale }
    }

    /// One-dimensional Gaussian with standard deviation `sigma`.
    pub fn gaussian_1d(sigma: f64) -> Self {
        Self::new(Family::Gaussian, Scale::Scalar(sigma))
    }

    /// Multivariate Gaussian with covariance `covariance`.
    pub fn gaussian(covariance: Array2<f64>) -> Self {
        Self::new(Family::Gaussian, Scale::Matrix(covariance))
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn dimension(&self) -> usize {
        self.scale.dimension()
    }
}

impl fmt::Display for DistributionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scale {
            Scale::Scalar(sigma) => write!(f, "{} 1-D sigma={}", self.family, sigma),
            Scale::Matrix(m) => write!(f, "{} {}-D explicit covariance", self.family, m.nrows()),
            Scale::Structured { sigma, dimension, correlation } => {
                write!(f, "{} {}-D sigma={} {}", self.family, dimension, sigma, correlation)
            }
        }
    }
}
