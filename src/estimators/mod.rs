// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entropy estimators driven by the sweep.
//!
//! The sweep only sees the [`Estimator`] contract: a sample matrix, the Rényi
//! orders and the neighbour index sets go in; one estimate per
//! `(alpha, index set)` comes out. [`KnnEstimator`] is the bundled
//! implementation; tests and callers may inject any other.

pub mod dataset;
pub mod knn;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, EstimatorError};
use crate::numeric::NumericBackend;
pub use knn::KnnEstimator;

/// Tolerance used to match a requested order against the orders of an [`Estimates`].
const ALPHA_MATCH_EPS: f64 = 1e-12;

/// Sorted, duplicate-free set of neighbour indices `k`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexSet(Vec<usize>);

impl IndexSet {
    pub fn new(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self(indices)
    }

    pub fn single(k: usize) -> Self {
        Self(vec![k])
    }

    /// `[1], [2], ..., [maximal_index]`
    pub fn singletons(maximal_index: usize) -> Vec<Self> {
        (1..=maximal_index).map(Self::single).collect()
    }

    pub fn union(sets: &[IndexSet]) -> Self {
        Self::new(sets.iter().flat_map(|s| s.0.iter().copied()).collect())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest index, 0 for the empty set.
    pub fn max(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// Column label, e.g. `1,2,3`.
    pub fn label(&self) -> String {
        self.0.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.label())
    }
}

impl From<Vec<usize>> for IndexSet {
    fn from(indices: Vec<usize>) -> Self {
        Self::new(indices)
    }
}

/// Entropy estimates keyed by order, then by index set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Estimates {
    by_alpha: Vec<(f64, BTreeMap<IndexSet, f64>)>,
}

impl Estimates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alpha: f64, set: IndexSet, value: f64) {
        match self.by_alpha.iter_mut().find(|(a, _)| (a - alpha).abs() < ALPHA_MATCH_EPS) {
            Some((_, sets)) => {
                sets.insert(set, value);
            }
            None => self.by_alpha.push((alpha, BTreeMap::from([(set, value)]))),
        }
    }

    pub fn get(&self, alpha: f64, set: &IndexSet) -> Option<f64> {
        self.by_alpha
            .iter()
            .find(|(a, _)| (a - alpha).abs() < ALPHA_MATCH_EPS)
            .and_then(|(_, sets)| sets.get(set).copied())
    }

    pub fn alphas(&self) -> impl Iterator<Item = f64> + '_ {
        self.by_alpha.iter().map(|(a, _)| *a)
    }

    pub fn len(&self) -> usize {
        self.by_alpha.iter().map(|(_, sets)| sets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entropy estimator invoked once per trial.
pub trait Estimator: Sync {
    /// Estimate the Rényi entropy (bits) of `data` (rows = samples) for every
    /// order in `alphas` and every set in `index_sets`.
    fn estimate(
        &self,
        data: ArrayView2<'_, f64>,
        alphas: &[f64],
        index_sets: &[IndexSet],
    ) -> Result<Estimates, EstimatorError>;
}

impl<F> Estimator for F
where
    F: Fn(ArrayView2<'_, f64>, &[f64], &[IndexSet]) -> Result<Estimates, EstimatorError> + Sync,
{
    fn estimate(
        &self,
        data: ArrayView2<'_, f64>,
        alphas: &[f64],
        index_sets: &[IndexSet],
    ) -> Result<Estimates, EstimatorError> {
        self(data, alphas, index_sets)
    }
}

/// kNN estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Method {
    /// Rényi entropy of any order `0 < alpha < k + 1`
    #[default]
    LeonenkoPronzato,
    /// Shannon entropy only
    KozachenkoLeonenko,
}

impl FromStr for Method {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "leonenkopronzato" | "lp" => Ok(Method::LeonenkoPronzato),
            "kozachenkoleonenko" | "kl" => Ok(Method::KozachenkoLeonenko),
            _ => Err(ConfigurationError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::LeonenkoPronzato => f.write_str("LeonenkoPronzato"),
            Method::KozachenkoLeonenko => f.write_str("KozachenkoLeonenko"),
        }
    }
}

/// Distance used for neighbour search and the matching unit-ball volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl FromStr for Metric {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "l1" | "cityblock" => Ok(Metric::Manhattan),
            "chebyshev" | "linf" | "max" => Ok(Metric::Chebyshev),
            _ => Err(ConfigurationError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Chebyshev => "chebyshev",
        };
        f.write_str(name)
    }
}

/// Estimator settings, fixed for a whole sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub method: Method,
    pub metric: Metric,
    pub backend: NumericBackend,
}
