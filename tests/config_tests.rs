use entroseq::config::{Config, DualPolicy, EstimatorKind, SourceKind};
use std::{env, fs, path::PathBuf};

fn write_config(name: &str, contents: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("config_tests");
    fs::create_dir_all(&dir).expect("failed to create test directory");

    let file = dir.join(name);
    fs::write(&file, contents).expect("failed to write config file");
    file
}

#[test]
fn minimal_config_uses_defaults() {
    let file = write_config(
        "minimal.toml",
        "input_file = \"dataset.csv\"\ncolumn = \"time\"\n",
    );

    let cfg = Config::from_file(&file).expect("failed to load config");
    assert_eq!(cfg.window, 10);
    assert_eq!(cfg.estimator, EstimatorKind::Std);
    assert_eq!(cfg.source, SourceKind::Gaussian);
    assert_eq!(cfg.bayes_prior, 1.0);
    assert_eq!(cfg.dual_policy, DualPolicy::SubtractBoth);
    assert!(cfg.correction.is_none());
}

#[test]
fn full_config_is_accepted() {
    let file = write_config(
        "full.toml",
        r#"
input_file = "dataset.csv"
column = "time"
max_rows = 500
window = 20
estimator = "bayesian"
source = "classical+quantum"
bayes_prior = 2.0
dual_policy = "average"

[correction]
scale = 50.0
multiplier = 2

[credentials]
random_api_key = "classical-key"
qrng_api_key = "quantum-key"
"#,
    );

    let cfg = Config::from_file(&file).expect("failed to load config");
    assert_eq!(cfg.source, SourceKind::Dual);
    assert_eq!(cfg.dual_policy, DualPolicy::Average);
    assert_eq!(cfg.correction.as_ref().map(|c| c.multiplier), Some(2));
}

#[test]
fn unrecognized_estimator_is_rejected() {
    let file = write_config(
        "bad_estimator.toml",
        "input_file = \"dataset.csv\"\ncolumn = \"time\"\nestimator = \"stdev\"\n",
    );

    assert!(Config::from_file(&file).is_err());
}

#[test]
fn zero_window_is_rejected() {
    let file = write_config(
        "bad_window.toml",
        "input_file = \"dataset.csv\"\ncolumn = \"time\"\nwindow = 0\n",
    );

    assert!(Config::from_file(&file).is_err());
}

#[test]
fn remote_source_requires_its_credential() {
    let file = write_config(
        "missing_key.toml",
        "input_file = \"dataset.csv\"\ncolumn = \"time\"\nsource = \"classical\"\n",
    );

    assert!(Config::from_file(&file).is_err());
}

#[test]
fn dual_source_requires_both_credentials() {
    let contents = String::new()
        + "input_file = \"dataset.csv\"\n"
        + "column = \"time\"\n"
        + "source = \"classical+quantum\"\n"
        + "[credentials]\n"
        + "random_api_key = \"classical-key\"\n";
    let file = write_config("dual_missing_key.toml", &contents);

    assert!(Config::from_file(&file).is_err());
}
