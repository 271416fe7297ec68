// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summary statistics over the repeated trials of one grid cell.

use ndarray::Array1;
use std::time::Duration;

use crate::error::{Result, SweepError};

/// One successful estimator call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    pub entropy_estimate: f64,
    pub duration_seconds: f64,
    /// `oracle - entropy_estimate`
    pub difference: f64,
}

impl TrialOutcome {
    pub fn new(oracle: f64, entropy_estimate: f64, duration: Duration) -> Self {
        Self {
            entropy_estimate,
            duration_seconds: duration.as_secs_f64(),
            difference: oracle - entropy_estimate,
        }
    }
}

/// Statistics of one `(cell, index set)` block.
///
/// Standard deviations are population ones (`ddof = 0`); the third moment of
/// the difference is the raw central moment, not the skewness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRecord {
    pub mean_entropy: f64,
    pub std_entropy: f64,
    pub mean_duration: f64,
    pub std_duration: f64,
    pub mean_difference: f64,
    pub std_difference: f64,
    pub third_moment_difference: f64,
    /// Successful trials
    pub trials: usize,
    /// Trials skipped after an estimator failure
    pub failures: usize,
}

impl AggregateRecord {
    /// Record of a block where every trial failed: all statistics are NaN.
    pub fn all_failed(failures: usize) -> Self {
        Self {
            mean_entropy: f64::NAN,
            std_entropy: f64::NAN,
            mean_duration: f64::NAN,
            std_duration: f64::NAN,
            mean_difference: f64::NAN,
            std_difference: f64::NAN,
            third_moment_difference: f64::NAN,
            trials: 0,
            failures,
        }
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    /// The seven reported statistics, in column order.
    pub fn columns(&self) -> [f64; 7] {
        [
            self.mean_entropy,
            self.std_entropy,
            self.mean_duration,
            self.std_duration,
            self.mean_difference,
            self.std_difference,
            self.third_moment_difference,
        ]
    }
}

fn mean_and_std(values: &Array1<f64>) -> (f64, f64) {
    let mean = values.mean().unwrap_or(f64::NAN);
    (mean, values.std(0.0))
}

fn third_central_moment(values: &Array1<f64>, mean: f64) -> f64 {
    values.mapv(|v| (v - mean).powi(3)).mean().unwrap_or(f64::NAN)
}

/// Aggregate the outcomes of one block; fails on an empty slice.
pub fn aggregate(outcomes: &[TrialOutcome]) -> Result<AggregateRecord> {
    if outcomes.is_empty() {
        return Err(SweepError::EmptyTrialSet);
    }
    let entropy: Array1<f64> = outcomes.iter().map(|o| o.entropy_estimate).collect();
    let duration: Array1<f64> = outcomes.iter().map(|o| o.duration_seconds).collect();
    let difference: Array1<f64> = outcomes.iter().map(|o| o.difference).collect();

    let (mean_entropy, std_entropy) = mean_and_std(&entropy);
    let (mean_duration, std_duration) = mean_and_std(&duration);
    let (mean_difference, std_difference) = mean_and_std(&difference);

    Ok(AggregateRecord {
        mean_entropy,
        std_entropy,
        mean_duration,
        std_duration,
        mean_difference,
        std_difference,
        third_moment_difference: third_central_moment(&difference, mean_difference),
        trials: outcomes.len(),
        failures: 0,
    })
}
