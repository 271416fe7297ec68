// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array2, Axis, array};
use renyi_oracle::distributions::{Correlation, CorrelationType, DistributionDescriptor, Family, Scale};
use renyi_oracle::error::SamplingError;
use renyi_oracle::sampling::{Generator, SampleGenerator};

use crate::test_helpers::{Rng, SeedableRng, StdRng, assert_abs_diff_eq};

fn sample_covariance(x: &Array2<f64>) -> Array2<f64> {
    let mean = x.mean_axis(Axis(0)).unwrap();
    let centered = x - &mean;
    centered.t().dot(&centered) / x.nrows() as f64
}

#[test]
fn every_family_yields_size_by_dimension() {
    let structured = Scale::Structured { sigma: 1.0, dimension: 4, correlation: Correlation::identity() };
    let cases = [
        (Family::Gaussian, structured.clone(), 4),
        (Family::StudentT { degrees_of_freedom: 3.0 }, structured.clone(), 4),
        (Family::EllipticalStable { stability: 1.5 }, structured, 4),
        (Family::Beta { a: 2.0, b: 2.0 }, Scale::Scalar(1.0), 1),
    ];
    let mut rng = StdRng::seed_from_u64(1);
    for (family, scale, dimension) in cases {
        let x = SampleGenerator.generate(&DistributionDescriptor::new(family, scale), 123, &mut rng).unwrap();
        assert_eq!(x.dim(), (123, dimension), "{family}");
        assert!(x.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn structured_gaussian_has_target_covariance() {
    let scale = Scale::Structured {
        sigma: 2.0,
        dimension: 3,
        correlation: Correlation::new(CorrelationType::WeaklyCorrelated, 0.4),
    };
    let target = scale.covariance();
    let mut rng = StdRng::seed_from_u64(17);
    let x = SampleGenerator.generate(&DistributionDescriptor::new(Family::Gaussian, scale), 100_000, &mut rng).unwrap();
    let cov = sample_covariance(&x);
    for i in 0..3 {
        for j in 0..3 {
            assert_abs_diff_eq!(cov[[i, j]], target[[i, j]], epsilon = 0.1);
        }
    }
}

#[test]
fn student_t_variance() {
    let mut rng = StdRng::seed_from_u64(23);
    let d = DistributionDescriptor::new(Family::StudentT { degrees_of_freedom: 6.0 }, Scale::Scalar(1.0));
    let x = SampleGenerator.generate(&d, 200_000, &mut rng).unwrap();
    // nu / (nu - 2)
    assert_abs_diff_eq!(sample_covariance(&x)[[0, 0]], 1.5, epsilon = 0.05);
}

#[test]
fn same_seed_same_sample() {
    let d = DistributionDescriptor::new(Family::StudentT { degrees_of_freedom: 5.0 }, Scale::Scalar(1.0));
    let a = SampleGenerator.generate(&d, 50, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = SampleGenerator.generate(&d, 50, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn non_square_covariance_fails_before_sampling() {
    let d = DistributionDescriptor::gaussian(Array2::zeros((2, 3)));
    let mut rng = StdRng::seed_from_u64(99);
    let err = SampleGenerator.generate(&d, 10, &mut rng).unwrap_err();
    assert!(matches!(err, SamplingError::InvalidParameter(_)));
    // No draw was consumed from the stream
    let mut fresh = StdRng::seed_from_u64(99);
    assert_eq!(rng.r#gen::<u64>(), fresh.r#gen::<u64>());
}

#[test]
fn asymmetric_covariance_is_rejected() {
    let d = DistributionDescriptor::gaussian(array![[1.0, 0.2], [0.0, 1.0]]);
    let mut rng = StdRng::seed_from_u64(3);
    assert!(SampleGenerator.generate(&d, 10, &mut rng).is_err());
}
