// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation skeletons and their determinants.
//!
//! The determinants are evaluated in closed form so that high-dimensional
//! oracle values never need an `O(n^3)` factorisation:
//!
//! - weakly correlated (tridiagonal) matrices use the three-term recurrence
//!   `D_n = D_{n-1} - rho^2 D_{n-2}` with `D_0 = D_1 = 1`;
//! - strongly correlated (compound symmetry) matrices use
//!   `det = (1 - rho)^{n-1} (1 + (n-1) rho)`.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, OracleError};
use crate::numeric::{BigFloat, NumericBackend};

/// Shape of the correlation matrix used by multivariate sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationType {
    #[default]
    Identity,
    /// Unit diagonal, `rho` on the first off-diagonals
    WeaklyCorrelated,
    /// Unit diagonal, `rho` everywhere else
    StronglyCorrelated,
}

impl FromStr for CorrelationType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "identity" | "none" => Ok(CorrelationType::Identity),
            "weakly_correlated" | "weak" => Ok(CorrelationType::WeaklyCorrelated),
            "strongly_correlated" | "strong" => Ok(CorrelationType::StronglyCorrelated),
            _ => Err(ConfigurationError::UnknownCorrelationType(s.to_string())),
        }
    }
}

impl fmt::Display for CorrelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorrelationType::Identity => "identity",
            CorrelationType::WeaklyCorrelated => "weakly_correlated",
            CorrelationType::StronglyCorrelated => "strongly_correlated",
        };
        f.write_str(name)
    }
}

/// Correlation structure with its strength `rho`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub kind: CorrelationType,
    pub strength: f64,
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CorrelationType::Identity => write!(f, "identity"),
            kind => write!(f, "{kind}(rho={})", self.strength),
        }
    }
}

impl Correlation {
    pub fn new(kind: CorrelationType, strength: f64) -> Self {
        Self { kind, strength }
    }

    pub fn identity() -> Self {
        Self::new(CorrelationType::Identity, 0.0)
    }

    /// Correlation matrix of order `n`.
    pub fn skeleton(&self, n: usize) -> Array2<f64> {
        let rho = self.strength;
        match self.kind {
            CorrelationType::Identity => Array2::eye(n),
            CorrelationType::WeaklyCorrelated => Array2::from_shape_fn((n, n), |(i, j)| {
                if i == j {
                    1.0
                } else if i.abs_diff(j) == 1 {
                    rho
                } else {
                    0.0
                }
            }),
            CorrelationType::StronglyCorrelated => {
                Array2::from_shape_fn((n, n), |(i, j)| if i == j { 1.0 } else { rho })
            }
        }
    }

    /// `log2 det C` of the order-`n` skeleton.
    ///
    /// Fails when the skeleton is not positive-definite for this `n`.
    pub fn log2_determinant(&self, n: usize, backend: NumericBackend) -> Result<f64, OracleError> {
        if !self.strength.is_finite() {
            return Err(OracleError::InvalidParameter(format!(
                "correlation strength must be finite, got {}",
                self.strength
            )));
        }
        match self.kind {
            CorrelationType::Identity => Ok(0.0),
            CorrelationType::WeaklyCorrelated => log2_tridiagonal_determinant(n, self.strength, backend),
            CorrelationType::StronglyCorrelated => log2_compound_symmetry_determinant(n, self.strength),
        }
    }
}

/// Determinant of the tridiagonal correlation matrix by direct recurrence in `f64`.
pub fn tridiagonal_determinant(n: usize, rho: f64) -> f64 {
    let rho2 = rho * rho;
    let (mut d_prev, mut d) = (1.0, 1.0);
    for _ in 2..=n {
        let next = d - rho2 * d_prev;
        d_prev = d;
        d = next;
    }
    d
}

/// `log2` of the tridiagonal determinant.
///
/// `Float64` runs the recurrence on the ratios `r_k = D_k / D_{k-1}`, which
/// stays in range for any `n`. `ArbitraryPrecision` runs it on `D_k` itself in
/// [`BigFloat`]. Every leading minor must be positive.
pub fn log2_tridiagonal_determinant(
    n: usize,
    rho: f64,
    backend: NumericBackend,
) -> Result<f64, OracleError> {
    let not_positive_definite = |k: usize| {
        OracleError::InvalidParameter(format!(
            "tridiagonal correlation with rho={rho} is not positive-definite (leading minor {k} <= 0)"
        ))
    };
    if n <= 1 {
        return Ok(0.0);
    }
    let rho2 = rho * rho;

    match backend.precision_bits() {
        None => {
            let mut log2_det = 0.0;
            let mut ratio = 1.0;
            for k in 2..=n {
                ratio = 1.0 - rho2 / ratio;
                if ratio <= 0.0 || !ratio.is_finite() {
                    return Err(not_positive_definite(k));
                }
                log2_det += ratio.log2();
            }
            Ok(log2_det)
        }
        Some(precision) => {
            let rho2 = BigFloat::from_f64(rho2, precision);
            let mut d_prev = BigFloat::one(precision);
            let mut d = BigFloat::one(precision);
            for k in 2..=n {
                let next = d.sub(&rho2.mul(&d_prev));
                if !next.is_positive() {
                    return Err(not_positive_definite(k));
                }
                d_prev = d;
                d = next;
            }
            d.log2().ok_or_else(|| not_positive_definite(n))
        }
    }
}

/// `log2` of the compound-symmetry determinant `(1-rho)^{n-1} (1+(n-1) rho)`.
pub fn log2_compound_symmetry_determinant(n: usize, rho: f64) -> Result<f64, OracleError> {
    if n <= 1 {
        return Ok(0.0);
    }
    let m = (n - 1) as f64;
    if rho >= 1.0 || rho <= -1.0 / m {
        return Err(OracleError::InvalidParameter(format!(
            "compound-symmetry correlation of order {n} needs -1/{m} < rho < 1, got {rho}"
        )));
    }
    Ok(m * (1.0 - rho).log2() + (1.0 + m * rho).log2())
}
