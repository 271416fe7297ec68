// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sweep settings as read from a JSON file and the command line.
//!
//! Family, correlation, method and metric names stay strings here so that an
//! unknown name surfaces as the matching [`ConfigurationError`] variant when
//! the settings are turned into a [`SweepConfig`], before any sweep starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::distributions::{Correlation, CorrelationType, NoiseType, ShapeParameters};
use crate::error::ConfigurationError;
use crate::estimators::{EstimatorConfig, IndexSet, Method, Metric};
use crate::numeric::NumericBackend;
use crate::sweep::{
    DEFAULT_ALPHAS, DEFAULT_REPEAT_COUNT, DEFAULT_SAMPLE_SIZES, DEFAULT_SIGMAS, Execution, FailurePolicy,
    SweepConfig,
};

/// Flat, serialisable form of every sweep knob. All keys are optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSettings {
    pub output: String,
    /// Empty for a one-dimensional sweep
    pub dimensions: Vec<usize>,
    pub method: String,
    pub alphas: Vec<f64>,
    pub samples: Vec<usize>,
    pub sigmas: Vec<f64>,
    pub repeat: usize,
    pub correlation_type: String,
    pub correlation_strength: f64,
    pub maximal_index: usize,
    pub noise_type: String,
    pub degrees_of_freedom: f64,
    pub stability: f64,
    pub beta_a: f64,
    pub beta_b: f64,
    pub arbitrary_precision: bool,
    pub precision_digits: u32,
    pub metric: String,
    pub seed: u64,
    pub parallel: bool,
    pub fail_fast: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        let shape = ShapeParameters::default();
        Self {
            output: "complete_statistics".to_string(),
            dimensions: Vec::new(),
            method: Method::default().to_string(),
            alphas: DEFAULT_ALPHAS.to_vec(),
            samples: DEFAULT_SAMPLE_SIZES.to_vec(),
            sigmas: DEFAULT_SIGMAS.to_vec(),
            repeat: DEFAULT_REPEAT_COUNT,
            correlation_type: CorrelationType::default().to_string(),
            correlation_strength: 0.0,
            maximal_index: 3,
            noise_type: "gaussian".to_string(),
            degrees_of_freedom: shape.degrees_of_freedom,
            stability: shape.stability,
            beta_a: shape.beta_a,
            beta_b: shape.beta_b,
            arbitrary_precision: false,
            precision_digits: 50,
            metric: Metric::default().to_string(),
            seed: 0,
            parallel: false,
            fail_fast: false,
        }
    }
}

impl SweepSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn backend(&self) -> NumericBackend {
        NumericBackend::from_flags(self.arbitrary_precision, self.precision_digits)
    }

    pub fn estimator_config(&self) -> Result<EstimatorConfig, ConfigurationError> {
        if self.arbitrary_precision && self.precision_digits == 0 {
            return Err(ConfigurationError::Invalid("precision digits must be at least 1".into()));
        }
        Ok(EstimatorConfig {
            method: self.method.parse()?,
            metric: self.metric.parse()?,
            backend: self.backend(),
        })
    }

    /// Validated sweep configuration covering every requested dimension.
    pub fn sweep_config(&self) -> Result<SweepConfig, ConfigurationError> {
        let correlation_type: CorrelationType = self.correlation_type.parse()?;
        let noise_type: NoiseType = self.noise_type.parse()?;
        if self.maximal_index == 0 {
            return Err(ConfigurationError::Invalid("maximal index must be at least 1".into()));
        }

        let config = SweepConfig {
            dimensions: self.dimensions.clone(),
            sigmas: self.sigmas.clone(),
            alphas: self.alphas.clone(),
            sample_sizes: self.samples.clone(),
            index_sets: IndexSet::singletons(self.maximal_index),
            repeat_count: self.repeat,
            noise_type,
            shape: ShapeParameters {
                degrees_of_freedom: self.degrees_of_freedom,
                stability: self.stability,
                beta_a: self.beta_a,
                beta_b: self.beta_b,
            },
            correlation: Correlation::new(correlation_type, self.correlation_strength),
            seed: self.seed,
            failure_policy: if self.fail_fast { FailurePolicy::Abort } else { FailurePolicy::SkipTrial },
            execution: if self.parallel { Execution::Parallel } else { Execution::Sequential },
        };
        config.validate()?;
        Ok(config)
    }

    /// One `(dimensions, report path)` pair per output file:
    /// `{output}.txt` for a one-dimensional sweep, `{output}_{d}.txt` per dimension otherwise.
    pub fn report_plan(&self) -> Vec<(Vec<usize>, PathBuf)> {
        if self.dimensions.is_empty() {
            vec![(Vec::new(), PathBuf::from(format!("{}.txt", self.output)))]
        } else {
            self.dimensions
                .iter()
                .map(|&d| (vec![d], PathBuf::from(format!("{}_{d}.txt", self.output))))
                .collect()
        }
    }
}
