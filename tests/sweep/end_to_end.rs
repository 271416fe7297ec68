// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use renyi_oracle::distributions::{Correlation, CorrelationType, DistributionDescriptor, NoiseType};
use renyi_oracle::error::{EstimatorError, SweepError};
use renyi_oracle::estimators::{Estimates, IndexSet, KnnEstimator};
use renyi_oracle::oracle::{AnalyticOracle, Oracle};
use renyi_oracle::sampling::SampleGenerator;
use renyi_oracle::sweep::{Execution, GridSweep, ReportWriter, SweepConfig};

use crate::test_helpers::{
    ArrayView2, CountingOracle, STANDARD_NORMAL_SHANNON_BITS, assert_abs_diff_eq, constant_estimates,
    mean_estimator, uniform_generator,
};

fn exact_estimator(
    _: ArrayView2<'_, f64>,
    alphas: &[f64],
    sets: &[IndexSet],
) -> Result<Estimates, EstimatorError> {
    Ok(constant_estimates(alphas, sets, STANDARD_NORMAL_SHANNON_BITS))
}

#[test]
fn exact_estimator_has_zero_difference() {
    let config = SweepConfig {
        sigmas: vec![1.0],
        alphas: vec![1.0],
        sample_sizes: vec![100],
        index_sets: vec![IndexSet::single(1)],
        repeat_count: 5,
        ..SweepConfig::default()
    };
    let sweep = GridSweep::new(config, SampleGenerator, exact_estimator, AnalyticOracle::default()).unwrap();
    let results: Vec<_> = sweep.run().collect::<Result<_, _>>().unwrap();
    assert_eq!(results.len(), 1);

    let record = results[0].combined().unwrap();
    assert_abs_diff_eq!(results[0].oracle, STANDARD_NORMAL_SHANNON_BITS, epsilon = 1e-12);
    assert_abs_diff_eq!(record.mean_entropy, 2.047, epsilon = 1e-3);
    assert_abs_diff_eq!(record.mean_difference, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(record.std_difference, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(record.std_entropy, 0.0, epsilon = 1e-12);
    assert_eq!((record.trials, record.failures), (5, 0));
}

#[test]
fn oracle_runs_once_per_sigma_and_alpha() {
    for execution in [Execution::Sequential, Execution::Parallel] {
        let counting = CountingOracle::new(1.0);
        let config = SweepConfig {
            sigmas: vec![0.5, 2.0],
            alphas: vec![0.3, 1.0, 1.7],
            sample_sizes: vec![10, 20, 30, 40],
            repeat_count: 1,
            execution,
            ..SweepConfig::default()
        };
        let oracle = |d: &DistributionDescriptor, alpha: f64| counting.entropy(d, alpha);
        let sweep = GridSweep::new(config, uniform_generator, mean_estimator, oracle).unwrap();
        let cells = sweep.run().count();
        assert_eq!(cells, 24);
        assert_eq!(counting.calls(), 6, "{execution:?}");
    }
}

#[test]
fn knn_sweep_tracks_correlated_gaussian_oracle() {
    let config = SweepConfig {
        dimensions: vec![2],
        sigmas: vec![1.5],
        alphas: vec![0.8, 1.0],
        sample_sizes: vec![3000],
        index_sets: IndexSet::singletons(2),
        repeat_count: 2,
        correlation: Correlation::new(CorrelationType::WeaklyCorrelated, 0.3),
        ..SweepConfig::default()
    };
    let sweep = GridSweep::new(config, SampleGenerator, KnnEstimator::default(), AnalyticOracle::default()).unwrap();
    for result in sweep.run() {
        let result = result.unwrap();
        assert_eq!(result.records.len(), 3);
        for (set, record) in &result.records {
            assert!(record.mean_difference.abs() < 0.2, "{} {set}: {}", result.cell, record.mean_difference);
        }
    }
}

#[test]
fn oracle_failure_stops_the_sweep() {
    let config = SweepConfig {
        dimensions: vec![2],
        noise_type: NoiseType::Beta,
        sigmas: vec![1.0],
        alphas: vec![0.5],
        sample_sizes: vec![10],
        ..SweepConfig::default()
    };
    let sweep = GridSweep::new(config, SampleGenerator, KnnEstimator::default(), AnalyticOracle::default()).unwrap();
    let mut writer = ReportWriter::new(Vec::new());
    assert!(matches!(sweep.run_to_report(&mut writer), Err(SweepError::Oracle(_))));
    assert_eq!(writer.rows_written(), 0);
}
