// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array2;
use renyi_oracle::distributions::{Correlation, DistributionDescriptor, Family, Scale};
use renyi_oracle::error::OracleError;
use renyi_oracle::oracle::{AnalyticOracle, Oracle};

use crate::test_helpers::assert_abs_diff_eq;

fn beta(a: f64, b: f64, sigma: f64) -> DistributionDescriptor {
    DistributionDescriptor::new(Family::Beta { a, b }, Scale::Scalar(sigma))
}

#[test]
fn uniform_has_log_width_entropy() {
    let oracle = AnalyticOracle::default();
    for alpha in [0.2, 1.0, 1.8, 3.0] {
        assert_abs_diff_eq!(oracle.entropy(&beta(1.0, 1.0, 1.0), alpha).unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(oracle.entropy(&beta(1.0, 1.0, 4.0), alpha).unwrap(), 2.0, epsilon = 1e-12);
    }
}

#[test]
fn beta_two_two_values() {
    let oracle = AnalyticOracle::default();
    let d = beta(2.0, 2.0, 1.0);
    assert_abs_diff_eq!(oracle.entropy(&d, 1.0).unwrap(), -0.18047076590621733, epsilon = 1e-10);
    // Integral of (6x(1-x))^2 is 6/5
    assert_abs_diff_eq!(oracle.entropy(&d, 2.0).unwrap(), -(1.2f64.log2()), epsilon = 1e-10);
}

#[test]
fn continuous_at_shannon_limit() {
    let oracle = AnalyticOracle::default();
    let d = beta(2.5, 0.7, 1.0);
    let at_one = oracle.entropy(&d, 1.0).unwrap();
    assert_abs_diff_eq!(oracle.entropy(&d, 1.0 + 1e-6).unwrap(), at_one, epsilon = 1e-4);
    assert_abs_diff_eq!(oracle.entropy(&d, 1.0 - 1e-6).unwrap(), at_one, epsilon = 1e-4);
}

#[test]
fn invalid_beta_descriptors() {
    let oracle = AnalyticOracle::default();
    // alpha (b - 1) + 1 <= 0
    assert!(matches!(oracle.entropy(&beta(2.0, 0.5, 1.0), 2.5), Err(OracleError::InvalidParameter(_))));
    assert!(oracle.entropy(&beta(-1.0, 2.0, 1.0), 0.5).is_err());
    let multivariate = DistributionDescriptor::new(Family::Beta { a: 2.0, b: 2.0 }, Scale::Matrix(Array2::eye(2)));
    assert!(oracle.entropy(&multivariate, 0.5).is_err());
}

#[test]
fn one_dimensional_structured_scale_matches_scalar() {
    let oracle = AnalyticOracle::default();
    let structured = DistributionDescriptor::new(
        Family::Beta { a: 2.0, b: 3.0 },
        Scale::Structured { sigma: 2.5, dimension: 1, correlation: Correlation::identity() },
    );
    for alpha in [0.5, 1.0, 1.5] {
        assert_abs_diff_eq!(
            oracle.entropy(&structured, alpha).unwrap(),
            oracle.entropy(&beta(2.0, 3.0, 2.5), alpha).unwrap(),
            epsilon = 1e-12
        );
    }

    let wide = DistributionDescriptor::new(
        Family::Beta { a: 2.0, b: 3.0 },
        Scale::Structured { sigma: 2.5, dimension: 2, correlation: Correlation::identity() },
    );
    match oracle.entropy(&wide, 0.5) {
        Err(OracleError::InvalidParameter(msg)) => assert!(msg.contains("2-D structured")),
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}
