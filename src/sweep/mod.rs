// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grid sweep: oracle vs. estimator over dimensions, scales, orders and sample sizes.
//!
//! The leaves of the sweep are materialised up front as an ordered list of
//! [`GridCell`]s (`dimension x sigma x alpha x sample_size`, last axis fastest).
//! Every cell evaluates each index set of [`GridSweep::evaluated_index_sets`]
//! with `repeat_count` independent trials and aggregates them into one
//! [`AggregateRecord`] per set.
//!
//! Each `(cell, index set)` pair owns a `StdRng` derived from the base seed, so
//! sequential and parallel runs draw identical samples.

pub mod aggregate;
pub mod report;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::distributions::{Correlation, DistributionDescriptor, NoiseType, Scale, ShapeParameters};
use crate::error::{ConfigurationError, EstimatorError, Result, SweepError};
use crate::estimators::{Estimator, IndexSet};
use crate::oracle::{Oracle, SHANNON_TOLERANCE};
use crate::sampling::Generator;
pub use aggregate::{AggregateRecord, TrialOutcome, aggregate};
pub use report::ReportWriter;

/// Rényi orders swept by default.
pub const DEFAULT_ALPHAS: &[f64] = &[
    0.1, 0.2, 0.3, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 0.99, 1.0, 1.01, 1.05, 1.1, 1.2, 1.3, 1.4, 1.5, 1.7, 1.8, 1.9,
];

/// Sample sizes swept by default.
pub const DEFAULT_SAMPLE_SIZES: &[usize] = &[500, 5000, 50000];

/// Scales swept by default.
pub const DEFAULT_SIGMAS: &[f64] = &[1.0];

/// Trials per `(cell, index set)` by default.
pub const DEFAULT_REPEAT_COUNT: usize = 3;

/// Trials between two progress messages.
const PROGRESS_EVERY: usize = 10;

/// What to do when the estimator fails on a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure, count it in `failures` and continue
    #[default]
    SkipTrial,
    /// Stop the sweep with [`SweepError::Estimator`]
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    #[default]
    Sequential,
    /// Cells are evaluated in batches of the rayon pool size
    Parallel,
}

/// One sweep leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub dimension: usize,
    pub sigma: f64,
    pub alpha: f64,
    pub sample_size: usize,
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dimension={} sigma={} alpha={} sample_size={}",
            self.dimension, self.sigma, self.alpha, self.sample_size
        )
    }
}

/// Aggregated results of one cell, one record per evaluated index set.
#[derive(Debug, Clone, PartialEq)]
pub struct CellResult {
    pub cell: GridCell,
    pub oracle: f64,
    pub records: Vec<(IndexSet, AggregateRecord)>,
}

impl CellResult {
    pub fn record(&self, set: &IndexSet) -> Option<&AggregateRecord> {
        self.records.iter().find(|(s, _)| s == set).map(|(_, r)| r)
    }

    /// Record of the combined (last) index set.
    pub fn combined(&self) -> Option<&AggregateRecord> {
        self.records.last().map(|(_, r)| r)
    }
}

/// Axes and knobs of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Target dimensions; empty for a one-dimensional sweep with scalar scales
    pub dimensions: Vec<usize>,
    pub sigmas: Vec<f64>,
    pub alphas: Vec<f64>,
    pub sample_sizes: Vec<usize>,
    pub index_sets: Vec<IndexSet>,
    pub repeat_count: usize,
    pub noise_type: NoiseType,
    pub shape: ShapeParameters,
    pub correlation: Correlation,
    pub seed: u64,
    pub failure_policy: FailurePolicy,
    pub execution: Execution,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            dimensions: Vec::new(),
            sigmas: DEFAULT_SIGMAS.to_vec(),
            alphas: DEFAULT_ALPHAS.to_vec(),
            sample_sizes: DEFAULT_SAMPLE_SIZES.to_vec(),
            index_sets: IndexSet::singletons(3),
            repeat_count: DEFAULT_REPEAT_COUNT,
            noise_type: NoiseType::default(),
            shape: ShapeParameters::default(),
            correlation: Correlation::identity(),
            seed: 0,
            failure_policy: FailurePolicy::default(),
            execution: Execution::default(),
        }
    }
}

impl SweepConfig {
    pub fn is_multivariate(&self) -> bool {
        !self.dimensions.is_empty()
    }

    /// Reject empty axes and out-of-domain values before anything runs.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let invalid = |msg: String| Err(ConfigurationError::Invalid(msg));
        if self.sigmas.is_empty() || self.alphas.is_empty() || self.sample_sizes.is_empty() {
            return invalid("sigmas, alphas and sample sizes must be non-empty".into());
        }
        if self.index_sets.is_empty() || self.index_sets.iter().any(IndexSet::is_empty) {
            return invalid("at least one non-empty index set is required".into());
        }
        if self.index_sets.iter().any(|s| s.indices().contains(&0)) {
            return invalid("neighbour indices start at 1".into());
        }
        if self.repeat_count == 0 {
            return invalid("repeat count must be at least 1".into());
        }
        if let Some(sigma) = self.sigmas.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return invalid(format!("sigma must be positive and finite, got {sigma}"));
        }
        if let Some(alpha) = self.alphas.iter().find(|a| !(a.is_finite() && **a > 0.0)) {
            return invalid(format!("alpha must be positive and finite, got {alpha}"));
        }
        if self.sample_sizes.contains(&0) {
            return invalid("sample sizes must be positive".into());
        }
        if self.dimensions.contains(&0) {
            return invalid("dimensions must be positive".into());
        }
        if self.noise_type == NoiseType::EllipticalStable {
            let stability = self.shape.stability;
            if !(stability > 0.0 && stability <= 2.0) {
                return invalid(format!("stability must lie in (0, 2], got {stability}"));
            }
            if (stability - 2.0).abs() >= SHANNON_TOLERANCE {
                return invalid(format!(
                    "elliptical-stable noise has closed-form entropies only at stability 2, got {stability}"
                ));
            }
        }
        if !self.correlation.strength.is_finite() {
            return invalid(format!("correlation strength must be finite, got {}", self.correlation.strength));
        }
        Ok(())
    }

    /// Descriptor of the generating distribution at `sigma` and `dimension`.
    pub fn descriptor(&self, sigma: f64, dimension: usize) -> DistributionDescriptor {
        let scale = if self.is_multivariate() {
            Scale::Structured { sigma, dimension, correlation: self.correlation }
        } else {
            Scale::Scalar(sigma)
        };
        DistributionDescriptor::new(self.noise_type.family(&self.shape), scale)
    }
}

/// Totals of a completed sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSummary {
    pub cells: usize,
    pub trials: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

/// splitmix64 finaliser.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of the RNG for `(cell_index, set_index)`.
pub fn trial_seed(base: u64, cell_index: usize, set_index: usize) -> u64 {
    mix(mix(base ^ mix(cell_index as u64)) ^ set_index as u64)
}

/// Sweep driver with injected generator, estimator and oracle.
pub struct GridSweep<G, E, O> {
    config: SweepConfig,
    generator: G,
    estimator: E,
    oracle: O,
    cells: Vec<GridCell>,
    index_sets: Vec<IndexSet>,
}

impl<G: Generator, E: Estimator, O: Oracle> GridSweep<G, E, O> {
    pub fn new(config: SweepConfig, generator: G, estimator: E, oracle: O) -> Result<Self> {
        config.validate()?;

        let dimensions = if config.is_multivariate() { config.dimensions.clone() } else { vec![1] };
        let mut cells = Vec::with_capacity(
            dimensions.len() * config.sigmas.len() * config.alphas.len() * config.sample_sizes.len(),
        );
        for &dimension in &dimensions {
            for &sigma in &config.sigmas {
                for &alpha in &config.alphas {
                    for &sample_size in &config.sample_sizes {
                        cells.push(GridCell { dimension, sigma, alpha, sample_size });
                    }
                }
            }
        }

        let mut index_sets = config.index_sets.clone();
        if index_sets.len() > 1 {
            index_sets.push(IndexSet::union(&config.index_sets));
        }

        Ok(Self { config, generator, estimator, oracle, cells, index_sets })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Sweep leaves in report order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Configured index sets followed by their union; a single configured set
    /// is its own union and appears once.
    pub fn evaluated_index_sets(&self) -> &[IndexSet] {
        &self.index_sets
    }

    /// Lazily evaluate the cells in order. The iterator stops after the first error.
    pub fn run(&self) -> SweepRun<'_, G, E, O> {
        SweepRun { sweep: self, next: 0, oracle_cache: None, pending: Vec::new(), failed: false }
    }

    /// Run the whole sweep, writing the header and one flushed row per cell.
    pub fn run_to_report<W: Write>(&self, writer: &mut ReportWriter<W>) -> Result<SweepSummary> {
        let started = Instant::now();
        info!(
            "sweep started: {} cells x {} index sets x {} trials ({:?}, {:?})",
            self.cells.len(),
            self.index_sets.len(),
            self.config.repeat_count,
            self.config.execution,
            self.config.failure_policy
        );
        writer.write_header(&self.index_sets)?;

        let mut summary = SweepSummary { cells: 0, trials: 0, failures: 0, elapsed: Duration::ZERO };
        for result in self.run() {
            let result = result?;
            writer.write_row(&result)?;
            summary.cells += 1;
            for (_, record) in &result.records {
                summary.trials += record.trials;
                summary.failures += record.failures;
            }
        }
        summary.elapsed = started.elapsed();
        info!(
            "sweep finished: {} cells, {} trials, {} failures in {:.3}s",
            summary.cells,
            summary.trials,
            summary.failures,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }

    /// Oracle value for the cell at `index`, evaluated once per `(dimension, sigma, alpha)`.
    fn oracle_value(&self, index: usize, cache: &mut Option<(usize, f64)>) -> Result<f64> {
        let cell = &self.cells[index];
        // Cells sharing (dimension, sigma, alpha) are contiguous
        let group = index / self.config.sample_sizes.len();
        if let Some((cached_group, value)) = *cache {
            if cached_group == group {
                return Ok(value);
            }
        }
        let descriptor = self.config.descriptor(cell.sigma, cell.dimension);
        let value = self.oracle.entropy(&descriptor, cell.alpha)?;
        debug!("oracle {descriptor} alpha={}: {value}", cell.alpha);
        *cache = Some((group, value));
        Ok(value)
    }

    fn evaluate_cell(&self, index: usize, oracle: f64) -> Result<CellResult> {
        let cell = self.cells[index];
        let descriptor = self.config.descriptor(cell.sigma, cell.dimension);
        let alphas = [cell.alpha];
        let repeat = self.config.repeat_count;
        let mut draw = self.generator.bind(&descriptor)?;

        let mut records = Vec::with_capacity(self.index_sets.len());
        for (set_index, set) in self.index_sets.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(trial_seed(self.config.seed, index, set_index));
            let mut outcomes = Vec::with_capacity(repeat);
            let mut failures = 0;

            for trial in 1..=repeat {
                if trial % PROGRESS_EVERY == 0 {
                    debug!("{cell} index set {set}: trial {trial}/{repeat}");
                }
                let data = draw(cell.sample_size, &mut rng)?;

                let start = Instant::now();
                let estimate = self
                    .estimator
                    .estimate(data.view(), &alphas, std::slice::from_ref(set))
                    .and_then(|estimates| {
                        estimates.get(cell.alpha, set).ok_or_else(|| {
                            EstimatorError::InvalidInput(format!("no estimate returned for alpha={} {set}", cell.alpha))
                        })
                    });
                let duration = start.elapsed();

                match estimate {
                    Ok(value) => outcomes.push(TrialOutcome::new(oracle, value, duration)),
                    Err(source) => match self.config.failure_policy {
                        FailurePolicy::SkipTrial => {
                            warn!("{cell} index set {set}: trial {trial} skipped: {source}");
                            failures += 1;
                        }
                        FailurePolicy::Abort => {
                            return Err(SweepError::Estimator { cell: format!("{cell} index set {set}"), source });
                        }
                    },
                }
            }

            let record = if outcomes.is_empty() {
                AggregateRecord::all_failed(failures)
            } else {
                aggregate(&outcomes)?.with_failures(failures)
            };
            records.push((set.clone(), record));
        }

        info!("{cell} done (oracle {oracle})");
        Ok(CellResult { cell, oracle, records })
    }
}

/// Iterator over cell results, in cell order.
pub struct SweepRun<'a, G, E, O> {
    sweep: &'a GridSweep<G, E, O>,
    next: usize,
    oracle_cache: Option<(usize, f64)>,
    /// Evaluated cells of the current parallel batch, reversed
    pending: Vec<Result<CellResult>>,
    failed: bool,
}

impl<G: Generator, E: Estimator, O: Oracle> SweepRun<'_, G, E, O> {
    fn fill_batch(&mut self) {
        let sweep = self.sweep;
        let end = (self.next + rayon::current_num_threads().max(1)).min(sweep.cells.len());

        let mut jobs = Vec::with_capacity(end - self.next);
        for index in self.next..end {
            match sweep.oracle_value(index, &mut self.oracle_cache) {
                Ok(oracle) => jobs.push((index, oracle)),
                Err(e) => {
                    // Cells before the failing one still run and are reported
                    let mut results: Vec<_> =
                        jobs.par_iter().map(|&(i, oracle)| sweep.evaluate_cell(i, oracle)).collect();
                    results.push(Err(e));
                    results.reverse();
                    self.pending = results;
                    self.next = sweep.cells.len();
                    return;
                }
            }
        }
        let mut results: Vec<_> = jobs.par_iter().map(|&(i, oracle)| sweep.evaluate_cell(i, oracle)).collect();
        results.reverse();
        self.pending = results;
        self.next = end;
    }
}

impl<G: Generator, E: Estimator, O: Oracle> Iterator for SweepRun<'_, G, E, O> {
    type Item = Result<CellResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match self.sweep.config.execution {
            Execution::Sequential => {
                if self.next >= self.sweep.cells.len() {
                    return None;
                }
                let index = self.next;
                self.next += 1;
                self.sweep
                    .oracle_value(index, &mut self.oracle_cache)
                    .and_then(|oracle| self.sweep.evaluate_cell(index, oracle))
            }
            Execution::Parallel => {
                if self.pending.is_empty() {
                    if self.next >= self.sweep.cells.len() {
                        return None;
                    }
                    self.fill_batch();
                }
                self.pending.pop()?
            }
        };
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}
