// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use nalgebra::DMatrix;
use renyi_oracle::distributions::correlation::{
    log2_compound_symmetry_determinant, log2_tridiagonal_determinant, tridiagonal_determinant,
};
use renyi_oracle::distributions::{Correlation, CorrelationType};
use renyi_oracle::numeric::NumericBackend;

use crate::test_helpers::assert_abs_diff_eq;

const PRECISE: NumericBackend = NumericBackend::ArbitraryPrecision { decimal_digits: 50 };

fn direct_determinant(kind: CorrelationType, n: usize, rho: f64) -> f64 {
    let skeleton = Correlation::new(kind, rho).skeleton(n);
    DMatrix::from_fn(n, n, |i, j| skeleton[[i, j]]).determinant()
}

#[test]
fn recurrence_matches_direct_determinant() {
    for n in 2..=5 {
        for rho in [0.0, 0.1, 0.5, 0.9] {
            let direct = direct_determinant(CorrelationType::WeaklyCorrelated, n, rho);
            assert_abs_diff_eq!(tridiagonal_determinant(n, rho), direct, epsilon = 1e-12);
        }
    }
}

#[test]
fn log_determinants_match_direct_determinant() {
    for n in 2..=5 {
        for rho in [0.0, 0.1, 0.45] {
            let direct = direct_determinant(CorrelationType::WeaklyCorrelated, n, rho).log2();
            for backend in [NumericBackend::Float64, PRECISE] {
                assert_abs_diff_eq!(log2_tridiagonal_determinant(n, rho, backend).unwrap(), direct, epsilon = 1e-10);
            }
            let direct = direct_determinant(CorrelationType::StronglyCorrelated, n, rho).log2();
            assert_abs_diff_eq!(log2_compound_symmetry_determinant(n, rho).unwrap(), direct, epsilon = 1e-10);
        }
    }
}

#[test]
fn backends_agree_on_long_recurrences() {
    for n in [10, 50, 200] {
        let float = log2_tridiagonal_determinant(n, 0.45, NumericBackend::Float64).unwrap();
        let precise = log2_tridiagonal_determinant(n, 0.45, PRECISE).unwrap();
        assert_abs_diff_eq!(float, precise, epsilon = 1e-8);
    }
}

#[test]
fn arbitrary_precision_survives_f64_underflow() {
    // The plain recurrence leaves the normal f64 range long before n = 5000
    assert!(tridiagonal_determinant(5000, 0.45) < f64::MIN_POSITIVE);
    let precise = log2_tridiagonal_determinant(5000, 0.45, PRECISE).unwrap();
    let float = log2_tridiagonal_determinant(5000, 0.45, NumericBackend::Float64).unwrap();
    assert!(precise < -1100.0);
    assert_abs_diff_eq!(precise, float, epsilon = 1e-6);
}

#[test]
fn indefinite_tridiagonal_is_rejected() {
    // 1 - 2 rho^2 < 0 at rho = 0.9
    for backend in [NumericBackend::Float64, PRECISE] {
        assert!(log2_tridiagonal_determinant(3, 0.9, backend).is_err());
    }
    assert!(log2_tridiagonal_determinant(2, 0.9, NumericBackend::Float64).is_ok());
}
