// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::Write;
use std::path::PathBuf;

use renyi_oracle::config::SweepSettings;
use renyi_oracle::distributions::{CorrelationType, NoiseType};
use renyi_oracle::error::ConfigurationError;
use renyi_oracle::estimators::{IndexSet, Method, Metric};
use renyi_oracle::numeric::NumericBackend;
use renyi_oracle::sweep::{Execution, FailurePolicy};

fn settings_file(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn json_settings_build_the_sweep() {
    let file = settings_file(
        r#"{
            "output": "run",
            "dimensions": [3, 10],
            "method": "KozachenkoLeonenko",
            "alphas": [1.0],
            "samples": [100],
            "correlation_type": "strongly_correlated",
            "correlation_strength": 0.25,
            "maximal_index": 4,
            "noise_type": "student_t",
            "degrees_of_freedom": 5.0,
            "arbitrary_precision": true,
            "precision_digits": 30,
            "metric": "manhattan",
            "parallel": true,
            "fail_fast": true
        }"#,
    );
    let settings = SweepSettings::from_json_file(file.path()).unwrap();
    let config = settings.sweep_config().unwrap();
    assert_eq!(config.noise_type, NoiseType::StudentT);
    assert_eq!(config.shape.degrees_of_freedom, 5.0);
    assert_eq!(config.correlation.kind, CorrelationType::StronglyCorrelated);
    assert_eq!(config.index_sets, IndexSet::singletons(4));
    assert_eq!(config.execution, Execution::Parallel);
    assert_eq!(config.failure_policy, FailurePolicy::Abort);

    let estimator = settings.estimator_config().unwrap();
    assert_eq!(estimator.method, Method::KozachenkoLeonenko);
    assert_eq!(estimator.metric, Metric::Manhattan);
    assert_eq!(estimator.backend, NumericBackend::ArbitraryPrecision { decimal_digits: 30 });

    let plan = settings.report_plan();
    assert_eq!(plan, vec![(vec![3], PathBuf::from("run_3.txt")), (vec![10], PathBuf::from("run_10.txt"))]);
}

#[test]
fn one_dimensional_plan_uses_plain_filename() {
    let plan = SweepSettings::default().report_plan();
    assert_eq!(plan, vec![(Vec::new(), PathBuf::from("complete_statistics.txt"))]);
}

#[test]
fn bad_files_are_configuration_errors() {
    let unknown = settings_file(r#"{"correlation_type": "toeplitz"}"#);
    let settings = SweepSettings::from_json_file(unknown.path()).unwrap();
    assert!(matches!(settings.sweep_config(), Err(ConfigurationError::UnknownCorrelationType(_))));

    let malformed = settings_file("{ not json");
    assert!(matches!(SweepSettings::from_json_file(malformed.path()), Err(ConfigurationError::Parse(_))));

    let missing = SweepSettings::from_json_file("/nonexistent/renyi-sweep.json");
    assert!(matches!(missing, Err(ConfigurationError::Io(_))));

    let empty_axis = SweepSettings { samples: Vec::new(), ..SweepSettings::default() };
    assert!(matches!(empty_axis.sweep_config(), Err(ConfigurationError::Invalid(_))));
}

#[test]
fn stable_noise_needs_a_closed_form_before_any_report() {
    let file = settings_file(r#"{"dimensions": [2], "noise_type": "elliptical_stable", "stability": 1.5}"#);
    let settings = SweepSettings::from_json_file(file.path()).unwrap();
    match settings.sweep_config() {
        Err(ConfigurationError::Invalid(msg)) => assert!(msg.contains("stability 2")),
        other => panic!("expected Invalid, got {other:?}"),
    }

    let at_two = SweepSettings { noise_type: "elliptical_stable".into(), ..SweepSettings::default() };
    assert_eq!(at_two.sweep_config().unwrap().noise_type, NoiseType::EllipticalStable);
}
