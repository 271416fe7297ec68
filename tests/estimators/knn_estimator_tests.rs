// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use renyi_oracle::distributions::DistributionDescriptor;
use renyi_oracle::error::EstimatorError;
use renyi_oracle::estimators::{Estimator, EstimatorConfig, IndexSet, KnnEstimator, Method, Metric};
use renyi_oracle::numeric::NumericBackend;
use renyi_oracle::oracle::{AnalyticOracle, Oracle};

use crate::test_helpers::{Array2, assert_abs_diff_eq, assert_entropy_values_close, generate_gaussian_data};

fn knn(metric: Metric) -> KnnEstimator {
    KnnEstimator::new(EstimatorConfig { metric, ..EstimatorConfig::default() })
}

#[test]
fn recovers_gaussian_oracle_in_two_dimensions() {
    let data = generate_gaussian_data(5000, 2, 1.0, 42);
    let oracle = AnalyticOracle::default();
    let truth = DistributionDescriptor::gaussian(Array2::eye(2));
    let sets = [IndexSet::new(vec![1, 2, 3])];
    let alphas = [0.6, 0.9, 1.0, 1.3];
    let estimates = knn(Metric::Euclidean).estimate(data.view(), &alphas, &sets).unwrap();
    for alpha in alphas {
        let expected = oracle.entropy(&truth, alpha).unwrap();
        let got = estimates.get(alpha, &sets[0]).unwrap();
        assert_entropy_values_close(got, expected, 0.15, &format!("2-D Gaussian alpha={alpha}"));
    }
}

#[test]
fn all_metrics_estimate_the_same_entropy() {
    let data = generate_gaussian_data(4000, 3, 1.0, 7);
    let sets = [IndexSet::single(3)];
    let expected = AnalyticOracle::default()
        .entropy(&DistributionDescriptor::gaussian(Array2::eye(3)), 1.0)
        .unwrap();
    for metric in [Metric::Euclidean, Metric::Manhattan, Metric::Chebyshev] {
        let h = knn(metric).estimate(data.view(), &[1.0], &sets).unwrap().get(1.0, &sets[0]).unwrap();
        assert_entropy_values_close(h, expected, 0.2, &format!("{metric}"));
    }
}

#[test]
fn scaling_shifts_entropy_by_dimension_bits() {
    // H(2X) = H(X) + d, exactly, for every order and both neighbour-search paths
    for dims in [2usize, 12] {
        let data = generate_gaussian_data(600, dims, 1.0, 11);
        let doubled = &data * 2.0;
        let sets = [IndexSet::single(1), IndexSet::single(4)];
        let alphas = [0.5, 1.0, 1.5];
        let est = knn(Metric::Euclidean);
        let base = est.estimate(data.view(), &alphas, &sets).unwrap();
        let scaled = est.estimate(doubled.view(), &alphas, &sets).unwrap();
        for alpha in alphas {
            for set in &sets {
                assert_abs_diff_eq!(
                    scaled.get(alpha, set).unwrap(),
                    base.get(alpha, set).unwrap() + dims as f64,
                    epsilon = 1e-9
                );
            }
        }
    }
}

#[test]
fn combined_set_is_mean_of_members() {
    let data = generate_gaussian_data(1000, 2, 1.0, 3);
    let sets = [IndexSet::single(1), IndexSet::single(2), IndexSet::new(vec![1, 2])];
    let est = knn(Metric::Euclidean).estimate(data.view(), &[0.8], &sets).unwrap();
    let mean = (est.get(0.8, &sets[0]).unwrap() + est.get(0.8, &sets[1]).unwrap()) / 2.0;
    assert_abs_diff_eq!(est.get(0.8, &sets[2]).unwrap(), mean, epsilon = 1e-12);
}

#[test]
fn backends_agree_on_extreme_exponents() {
    // m (1 - alpha) log2 rho is near -1800 here, below the smallest f64
    let data = generate_gaussian_data(300, 60, 1e-10, 5);
    let sets = [IndexSet::single(1)];
    let float = knn(Metric::Euclidean).estimate(data.view(), &[0.01], &sets).unwrap();

    let precise = KnnEstimator::new(EstimatorConfig {
        backend: NumericBackend::ArbitraryPrecision { decimal_digits: 50 },
        ..EstimatorConfig::default()
    });
    let exact = precise.estimate(data.view(), &[0.01], &sets).unwrap();
    let h = float.get(0.01, &sets[0]).unwrap();
    assert!(h.is_finite());
    assert_abs_diff_eq!(h, exact.get(0.01, &sets[0]).unwrap(), epsilon = 1e-6);
}

#[test]
fn float_power_sum_survives_terms_beyond_f64_range() {
    // 300 * 0.9 * log2(rho) exceeds 1024 for the typical radius of a 300-D standard normal
    let data = generate_gaussian_data(300, 300, 1.0, 11);
    let sets = [IndexSet::single(1)];
    let float = knn(Metric::Euclidean).estimate(data.view(), &[0.1], &sets).unwrap();
    let h = float.get(0.1, &sets[0]).unwrap();
    assert!(h.is_finite());

    let precise = KnnEstimator::new(EstimatorConfig {
        backend: NumericBackend::ArbitraryPrecision { decimal_digits: 40 },
        ..EstimatorConfig::default()
    });
    let exact = precise.estimate(data.view(), &[0.1], &sets).unwrap();
    assert_abs_diff_eq!(h, exact.get(0.1, &sets[0]).unwrap(), epsilon = 1e-6);
}

#[test]
fn shannon_only_method_rejects_other_orders() {
    let data = generate_gaussian_data(200, 1, 1.0, 1);
    let kl = KnnEstimator::new(EstimatorConfig { method: Method::KozachenkoLeonenko, ..EstimatorConfig::default() });
    let err = kl.estimate(data.view(), &[0.5], &[IndexSet::single(1)]).unwrap_err();
    assert!(matches!(err, EstimatorError::UnsupportedAlpha { .. }));
}

#[test]
fn duplicate_points_do_not_break_the_estimate() {
    let mut data = generate_gaussian_data(500, 2, 1.0, 8);
    for i in 0..50 {
        let row = data.row(i).to_owned();
        data.row_mut(i + 50).assign(&row);
    }
    let sets = [IndexSet::single(2)];
    let h = knn(Metric::Euclidean).estimate(data.view(), &[0.7], &sets).unwrap();
    assert!(h.get(0.7, &sets[0]).unwrap().is_finite());
}
