// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synthetic i.i.d. samples from parametric distributions.
//!
//! Every generator returns a `size x dimension` matrix (rows = samples,
//! columns = coordinates), the layout the kNN estimators consume.

pub mod gaussian;
pub mod stable;
pub mod student_t;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand_distr::{Beta, ChiSquared, Distribution};

use crate::distributions::{DistributionDescriptor, Family, Scale};
use crate::error::SamplingError;
use gaussian::GaussianSource;

/// Draw function bound to one descriptor: `(size, rng) -> rows`.
pub type BoundGenerator<'a> = Box<dyn FnMut(usize, &mut StdRng) -> Result<Array2<f64>, SamplingError> + 'a>;

/// Source of synthetic samples for a descriptor.
pub trait Generator: Sync {
    fn generate(
        &self,
        descriptor: &DistributionDescriptor,
        size: usize,
        rng: &mut StdRng,
    ) -> Result<Array2<f64>, SamplingError>;

    /// Fix the descriptor for a run of draws. The default calls
    /// [`Generator::generate`] each time; implementations override it to do
    /// per-descriptor setup once.
    fn bind<'a>(&'a self, descriptor: &'a DistributionDescriptor) -> Result<BoundGenerator<'a>, SamplingError> {
        Ok(Box::new(move |size: usize, rng: &mut StdRng| self.generate(descriptor, size, rng)))
    }
}

impl<F> Generator for F
where
    F: Fn(&DistributionDescriptor, usize, &mut StdRng) -> Result<Array2<f64>, SamplingError> + Sync,
{
    fn generate(
        &self,
        descriptor: &DistributionDescriptor,
        size: usize,
        rng: &mut StdRng,
    ) -> Result<Array2<f64>, SamplingError> {
        self(descriptor, size, rng)
    }
}

/// Generator covering every [`Family`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleGenerator;

impl Generator for SampleGenerator {
    fn generate(
        &self,
        descriptor: &DistributionDescriptor,
        size: usize,
        rng: &mut StdRng,
    ) -> Result<Array2<f64>, SamplingError> {
        Ok(PreparedSampler::new(descriptor)?.sample(size, rng))
    }

    /// Validates the descriptor and factorises its covariance once.
    fn bind<'a>(&'a self, descriptor: &'a DistributionDescriptor) -> Result<BoundGenerator<'a>, SamplingError> {
        let prepared = PreparedSampler::new(descriptor)?;
        Ok(Box::new(move |size: usize, rng: &mut StdRng| Ok(prepared.sample(size, rng))))
    }
}

/// A descriptor with its parameters checked and its covariance factorised.
#[derive(Debug, Clone)]
pub enum PreparedSampler {
    Gaussian(GaussianSource),
    StudentT { gaussian: GaussianSource, chi_squared: ChiSquared<f64>, nu: f64 },
    EllipticalStable { gaussian: GaussianSource, stability: f64 },
    Beta { beta: Beta<f64>, sigma: f64 },
}

impl PreparedSampler {
    pub fn new(descriptor: &DistributionDescriptor) -> Result<Self, SamplingError> {
        let scale = descriptor.scale();
        Ok(match descriptor.family() {
            Family::Gaussian => PreparedSampler::Gaussian(GaussianSource::from_scale(scale)?),
            Family::StudentT { degrees_of_freedom } => PreparedSampler::StudentT {
                chi_squared: student_t::mixing(degrees_of_freedom)?,
                gaussian: GaussianSource::from_scale(scale)?,
                nu: degrees_of_freedom,
            },
            Family::EllipticalStable { stability } => {
                stable::check_stability(stability)?;
                PreparedSampler::EllipticalStable { gaussian: GaussianSource::from_scale(scale)?, stability }
            }
            Family::Beta { a, b } => prepare_beta(scale, a, b)?,
        })
    }

    pub fn sample(&self, size: usize, rng: &mut StdRng) -> Array2<f64> {
        match self {
            PreparedSampler::Gaussian(gaussian) => gaussian.sample(size, rng),
            PreparedSampler::StudentT { gaussian, chi_squared, nu } => {
                let mut rows = gaussian.sample(size, rng);
                student_t::mix_rows(&mut rows, chi_squared, *nu, rng);
                rows
            }
            PreparedSampler::EllipticalStable { gaussian, stability } => {
                let mut rows = gaussian.sample(size, rng);
                stable::subordinate_rows(&mut rows, *stability, rng);
                rows
            }
            PreparedSampler::Beta { beta, sigma } => Array2::from_shape_fn((size, 1), |_| sigma * beta.sample(rng)),
        }
    }
}

fn prepare_beta(scale: &Scale, a: f64, b: f64) -> Result<PreparedSampler, SamplingError> {
    let sigma = match scale.univariate_sigma() {
        Some(sigma) if sigma.is_finite() && sigma > 0.0 => sigma,
        Some(sigma) => {
            return Err(SamplingError::InvalidParameter(format!(
                "scale must be positive and finite, got {sigma}"
            )));
        }
        None => {
            return Err(SamplingError::InvalidParameter(format!(
                "Beta distribution needs a scalar or one-dimensional structured scale, got a {}-D {} scale",
                scale.dimension(),
                scale.kind()
            )));
        }
    };
    let beta = Beta::new(a, b).map_err(|e| {
        SamplingError::InvalidParameter(format!("Beta(a={a}, b={b}): {e}"))
    })?;
    Ok(PreparedSampler::Beta { beta, sigma })
}
