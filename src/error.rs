// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for every layer of the validation pipeline.

use std::io;
use thiserror::Error;

/// Result type for sweep-level operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Errors raised while evaluating a closed-form entropy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Malformed descriptor: bad scale, covariance or shape parameter
    #[error("invalid distribution parameter: {0}")]
    InvalidParameter(String),

    /// The family has no closed-form Rényi entropy for the given parameters
    #[error("no closed-form entropy for {0}")]
    UnsupportedFamily(String),
}

/// Errors raised while drawing synthetic samples.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// Malformed descriptor, detected before any sample is drawn
    #[error("invalid distribution parameter: {0}")]
    InvalidParameter(String),
}

/// Errors raised by an entropy estimator for a single call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// The sample matrix or index sets cannot be processed
    #[error("invalid estimator input: {0}")]
    InvalidInput(String),

    /// The requested order is outside the estimator's domain
    #[error("alpha = {alpha} is not supported: {reason}")]
    UnsupportedAlpha { alpha: f64, reason: String },

    /// Non-finite or otherwise unusable intermediate value
    #[error("arithmetic failure: {0}")]
    Arithmetic(String),
}

/// Errors raised while building a sweep configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("unknown correlation type '{0}' (expected identity, weakly_correlated or strongly_correlated)")]
    UnknownCorrelationType(String),

    #[error("unknown noise type '{0}' (expected gaussian, student_t, beta or elliptical_stable)")]
    UnknownNoiseType(String),

    #[error("unknown estimation method '{0}' (expected LeonenkoPronzato or KozachenkoLeonenko)")]
    UnknownMethod(String),

    #[error("unknown metric '{0}' (expected euclidean, manhattan or chebyshev)")]
    UnknownMetric(String),

    /// Structurally valid but semantically unusable value
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("cannot read configuration file: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that terminate a sweep.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    /// Estimator failure under `FailurePolicy::Abort`
    #[error("estimator failed at {cell}: {source}")]
    Estimator {
        cell: String,
        #[source]
        source: EstimatorError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Aggregation over zero trial outcomes
    #[error("cannot aggregate an empty set of trial outcomes")]
    EmptyTrialSet,

    #[error("report output failed: {0}")]
    Io(#[from] io::Error),
}
