// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Numeric backends shared by the oracle and the kNN estimator.
//!
//! `NumericBackend` is chosen once per sweep. `Float64` uses plain `f64`
//! arithmetic. `ArbitraryPrecision` routes long determinant recurrences,
//! which under- or overflow at high dimension, and estimator power sums
//! through [`BigFloat`], a binary floating-point number with a `BigInt`
//! mantissa and an unbounded exponent.

use num_bigint::{BigInt, Sign};
use num_traits::{Float, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// Arithmetic used for precision-sensitive accumulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericBackend {
    #[default]
    Float64,
    /// Mantissas carry at least `decimal_digits` significant decimal digits
    ArbitraryPrecision { decimal_digits: u32 },
}

impl NumericBackend {
    pub fn from_flags(arbitrary_precision: bool, decimal_digits: u32) -> Self {
        if arbitrary_precision {
            NumericBackend::ArbitraryPrecision { decimal_digits }
        } else {
            NumericBackend::Float64
        }
    }

    /// Mantissa width in bits, `None` for `Float64`.
    pub fn precision_bits(&self) -> Option<u64> {
        match *self {
            NumericBackend::Float64 => None,
            NumericBackend::ArbitraryPrecision { decimal_digits } => {
                // log2(10) bits per decimal digit plus guard bits
                let bits = (decimal_digits.max(1) as f64 * std::f64::consts::LOG2_10).ceil() as u64;
                Some(bits.max(64) + 8)
            }
        }
    }
}

/// Binary floating-point value `mantissa * 2^exponent` with a bounded mantissa width.
#[derive(Debug, Clone, PartialEq)]
pub struct BigFloat {
    mantissa: BigInt,
    exponent: i64,
    precision: u64,
}

impl BigFloat {
    pub fn zero(precision: u64) -> Self {
        Self { mantissa: BigInt::zero(), exponent: 0, precision }
    }

    pub fn one(precision: u64) -> Self {
        Self { mantissa: BigInt::from(1), exponent: 0, precision }
    }

    /// Exact conversion from a finite `f64`.
    pub fn from_f64(x: f64, precision: u64) -> Self {
        if x == 0.0 || !x.is_finite() {
            return Self::zero(precision);
        }
        let (m, e, sign) = x.integer_decode();
        let sign = if sign < 0 { Sign::Minus } else { Sign::Plus };
        let mantissa = BigInt::from_biguint(sign, m.into());
        Self { mantissa, exponent: e as i64, precision }.normalized()
    }

    /// `2^log2_value`, representable far outside the `f64` exponent range.
    pub fn from_log2(log2_value: f64, precision: u64) -> Self {
        if log2_value == f64::NEG_INFINITY {
            return Self::zero(precision);
        }
        let whole = log2_value.floor();
        let frac = log2_value - whole;
        let mut out = Self::from_f64(frac.exp2(), precision);
        out.exponent += whole as i64;
        out
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa.sign() == Sign::Plus
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        // Skip alignment when one operand is below the other's last mantissa bit
        let top_self = self.exponent + self.mantissa.bits() as i64;
        let top_other = other.exponent + other.mantissa.bits() as i64;
        let precision = self.precision.max(other.precision);
        let guard = precision as i64 + 2;
        if top_self - top_other > guard {
            return self.clone();
        }
        if top_other - top_self > guard {
            return other.clone();
        }

        let exponent = self.exponent.min(other.exponent);
        let a = &self.mantissa << (self.exponent - exponent) as usize;
        let b = &other.mantissa << (other.exponent - exponent) as usize;
        Self { mantissa: a + b, exponent, precision }.normalized()
    }

    pub fn neg(&self) -> Self {
        Self { mantissa: -self.mantissa.clone(), exponent: self.exponent, precision: self.precision }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self {
            mantissa: &self.mantissa * &other.mantissa,
            exponent: self.exponent + other.exponent,
            precision: self.precision.max(other.precision),
        }
        .normalized()
    }

    /// Base-2 logarithm of a positive value, `None` otherwise.
    pub fn log2(&self) -> Option<f64> {
        if !self.is_positive() {
            return None;
        }
        let magnitude = self.mantissa.magnitude();
        let bits = magnitude.bits();
        let shift = bits.saturating_sub(63);
        let top = (magnitude >> shift as usize).to_u64()? as f64;
        Some(top.log2() + shift as f64 + self.exponent as f64)
    }

    /// Nearest `f64`; saturates to zero or infinity outside the `f64` range.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let magnitude = self.mantissa.magnitude();
        let shift = magnitude.bits().saturating_sub(63);
        let top = (magnitude >> shift as usize).to_u64().unwrap_or(u64::MAX) as f64;
        let value = scale_pow2(top, self.exponent + shift as i64);
        if self.is_positive() { value } else { -value }
    }

    fn normalized(mut self) -> Self {
        if self.mantissa.is_zero() {
            self.exponent = 0;
            return self;
        }
        let bits = self.mantissa.bits();
        if bits > self.precision {
            let shift = bits - self.precision;
            let sign = self.mantissa.sign();
            let magnitude = self.mantissa.magnitude() >> shift as usize;
            self.mantissa = BigInt::from_biguint(sign, magnitude);
            self.exponent += shift as i64;
        }
        self
    }
}

/// `v * 2^e` without intermediate overflow of the power.
fn scale_pow2(mut v: f64, mut e: i64) -> f64 {
    while e > 1000 {
        v *= 2f64.powi(1000);
        e -= 1000;
        if v.is_infinite() {
            return v;
        }
    }
    while e < -1000 {
        v *= 2f64.powi(-1000);
        e += 1000;
        if v == 0.0 {
            return v;
        }
    }
    v * 2f64.powi(e as i32)
}

/// `log2(sum_i 2^{t_i})` for terms given in log2 space.
///
/// `Float64` shifts every term by the largest one before exponentiating, so
/// only the result has to fit in an `f64`; `ArbitraryPrecision` accumulates in
/// [`BigFloat`] and keeps the small terms a 53-bit mantissa would drop.
pub fn log2_sum_exp2(terms_log2: &[f64], backend: NumericBackend) -> f64 {
    match backend.precision_bits() {
        None => {
            let max = terms_log2.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !max.is_finite() {
                return max;
            }
            let sum: f64 = terms_log2.iter().map(|t| (t - max).exp2()).sum();
            max + sum.log2()
        }
        Some(precision) => {
            let mut acc = BigFloat::zero(precision);
            for &t in terms_log2 {
                acc = acc.add(&BigFloat::from_log2(t, precision));
            }
            acc.log2().unwrap_or(f64::NEG_INFINITY)
        }
    }
}
