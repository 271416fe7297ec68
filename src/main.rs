// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `renyi-sweep`: compare kNN Rényi entropy estimates with closed-form values
//! over a grid of dimensions, scales, orders and sample sizes.

use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use renyi_oracle::config::SweepSettings;
use renyi_oracle::error::Result;
use renyi_oracle::estimators::KnnEstimator;
use renyi_oracle::oracle::AnalyticOracle;
use renyi_oracle::sampling::SampleGenerator;
use renyi_oracle::sweep::{GridSweep, ReportWriter, SweepConfig};

#[derive(Parser, Debug)]
#[command(name = "renyi-sweep")]
#[command(about = "Validate kNN Rényi entropy estimators against closed-form oracle values")]
#[command(version)]
struct Cli {
    /// JSON file with sweep settings; flags given here override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base filename of the report(s)
    #[arg(long)]
    output: Option<String>,

    /// Target dimensions; omit for a one-dimensional sweep
    #[arg(long, num_args = 1..)]
    dimensions: Option<Vec<usize>>,

    /// Estimation method: LeonenkoPronzato or KozachenkoLeonenko
    #[arg(long)]
    method: Option<String>,

    /// Rényi orders
    #[arg(long, num_args = 1..)]
    alphas: Option<Vec<f64>>,

    /// Sample sizes
    #[arg(long, num_args = 1..)]
    samples: Option<Vec<usize>>,

    /// Scales (standard deviations)
    #[arg(long, num_args = 1..)]
    sigmas: Option<Vec<f64>>,

    /// Trials per cell and index set
    #[arg(long)]
    repeat: Option<usize>,

    /// identity, weakly_correlated or strongly_correlated
    #[arg(long)]
    correlation_type: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    correlation_strength: Option<f64>,

    /// Index sets become [1], ..., [K] plus their union
    #[arg(long)]
    maximal_index: Option<usize>,

    /// gaussian, student_t, beta or elliptical_stable
    #[arg(long)]
    noise_type: Option<String>,

    #[arg(long)]
    degrees_of_freedom: Option<f64>,

    /// Stability index of the elliptical-stable family, in (0, 2]
    #[arg(long)]
    stability: Option<f64>,

    #[arg(long)]
    beta_a: Option<f64>,

    #[arg(long)]
    beta_b: Option<f64>,

    /// Accumulate determinants and power sums in arbitrary precision
    #[arg(long)]
    arbitrary_precision: bool,

    /// Significant decimal digits of the arbitrary-precision backend
    #[arg(long)]
    precision_digits: Option<u32>,

    /// euclidean, manhattan or chebyshev
    #[arg(long)]
    metric: Option<String>,

    /// Base seed of every per-cell random stream
    #[arg(long)]
    seed: Option<u64>,

    /// Evaluate cells on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Abort on the first estimator failure instead of skipping the trial
    #[arg(long)]
    fail_fast: bool,
}

impl Cli {
    fn settings(self) -> Result<SweepSettings> {
        let mut s = match &self.config {
            Some(path) => SweepSettings::from_json_file(path)?,
            None => SweepSettings::default(),
        };
        if let Some(v) = self.output {
            s.output = v;
        }
        if let Some(v) = self.dimensions {
            s.dimensions = v;
        }
        if let Some(v) = self.method {
            s.method = v;
        }
        if let Some(v) = self.alphas {
            s.alphas = v;
        }
        if let Some(v) = self.samples {
            s.samples = v;
        }
        if let Some(v) = self.sigmas {
            s.sigmas = v;
        }
        if let Some(v) = self.repeat {
            s.repeat = v;
        }
        if let Some(v) = self.correlation_type {
            s.correlation_type = v;
        }
        if let Some(v) = self.correlation_strength {
            s.correlation_strength = v;
        }
        if let Some(v) = self.maximal_index {
            s.maximal_index = v;
        }
        if let Some(v) = self.noise_type {
            s.noise_type = v;
        }
        if let Some(v) = self.degrees_of_freedom {
            s.degrees_of_freedom = v;
        }
        if let Some(v) = self.stability {
            s.stability = v;
        }
        if let Some(v) = self.beta_a {
            s.beta_a = v;
        }
        if let Some(v) = self.beta_b {
            s.beta_b = v;
        }
        if let Some(v) = self.precision_digits {
            s.precision_digits = v;
        }
        if let Some(v) = self.metric {
            s.metric = v;
        }
        if let Some(v) = self.seed {
            s.seed = v;
        }
        s.arbitrary_precision |= self.arbitrary_precision;
        s.parallel |= self.parallel;
        s.fail_fast |= self.fail_fast;
        Ok(s)
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings()?;
    let base = settings.sweep_config()?;
    let estimator_config = settings.estimator_config()?;
    let estimator = KnnEstimator::new(estimator_config);
    let oracle = AnalyticOracle::new(estimator_config.backend);

    // Build every sweep first so a bad setting fails before any report is written
    let mut sweeps = Vec::new();
    for (dimensions, path) in settings.report_plan() {
        let config = SweepConfig { dimensions, ..base.clone() };
        sweeps.push((GridSweep::new(config, SampleGenerator, estimator, oracle)?, path));
    }

    for (sweep, path) in sweeps {
        log::info!("writing {}", path.display());
        let mut writer = ReportWriter::new(BufWriter::new(File::create(&path)?));
        sweep.run_to_report(&mut writer)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
