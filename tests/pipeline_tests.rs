use entroseq::analysis::{compare_series, difference_series};
use entroseq::config::{DualPolicy, EstimatorKind};
use entroseq::dataset::{Dataset, read_column, write_column};
use entroseq::engine::WindowedGenerator;
use entroseq::entropy::GaussianSource;
use entroseq::stats::SpreadEstimator;
use std::{env, fs, path::PathBuf};

fn generator(window: usize, integral: bool) -> WindowedGenerator {
    WindowedGenerator::new(
        window,
        integral,
        SpreadEstimator::new(EstimatorKind::Std, 1.0),
        None,
    )
}

#[test]
fn generated_series_matches_the_input_length() {
    let series: Vec<f64> = (1..=20).map(|val| val as f64).collect();
    let mut source = GaussianSource::new().expect("failed to construct source");

    let generated = generator(10, true).generate(&series, &mut source);

    assert_eq!(generated.len(), series.len());
    assert!(generated[..10].iter().all(|&val| val == 0.0));
    assert!(generated[10..].iter().all(|val| val.is_finite()));

    let diffs = difference_series(&series, &[generated.clone()], 10, DualPolicy::SubtractBoth);
    assert_eq!(diffs.len(), 10);
    for (k, &diff) in diffs.iter().enumerate() {
        assert_eq!(diff, series[10 + k] - generated[10 + k]);
    }
}

#[test]
fn integral_domain_coerces_generated_values() {
    let series: Vec<f64> = (1..=30).map(|val| val as f64 * 3.0).collect();
    let mut source = GaussianSource::new().expect("failed to construct source");

    let generated = generator(10, true).generate(&series, &mut source);
    assert!(generated.iter().all(|val| val.fract() == 0.0));
}

#[test]
fn short_series_is_all_warm_up() {
    let series = [1.0, 2.0, 3.0];
    let mut source = GaussianSource::new().expect("failed to construct source");

    let generated = generator(10, false).generate(&series, &mut source);
    assert_eq!(generated, vec![0.0; 3]);

    let diffs = difference_series(&series, &[generated], 10, DualPolicy::SubtractBoth);
    assert!(diffs.is_empty());
}

#[test]
fn dual_policies_combine_two_series() {
    let series = vec![0.0, 0.0, 10.0, 20.0];
    let gen_a = vec![0.0, 0.0, 4.0, 6.0];
    let gen_b = vec![0.0, 0.0, 2.0, 10.0];
    let generated = [gen_a, gen_b];

    let subtracted = difference_series(&series, &generated, 2, DualPolicy::SubtractBoth);
    assert_eq!(subtracted, vec![4.0, 4.0]);

    let averaged = difference_series(&series, &generated, 2, DualPolicy::Average);
    assert_eq!(averaged, vec![7.0, 12.0]);
}

#[test]
fn comparison_reports_a_perfect_match() {
    let original: Vec<f64> = (0..10).map(|val| val as f64).collect();
    let report = compare_series(&original, &original);

    assert_eq!(report.n_vals, 10);
    assert!((report.pearson - 1.0).abs() < 1e-12);
    assert_eq!(report.original.min, 0.0);
    assert_eq!(report.generated.max, 9.0);
}

#[test]
fn comparison_aligns_mismatched_lengths() {
    let original: Vec<f64> = (0..10).map(|val| val as f64).collect();
    let generated: Vec<f64> = (0..6).map(|val| val as f64 * 2.0).collect();

    let report = compare_series(&original, &generated);
    assert_eq!(report.n_vals, 6);
}

fn test_file(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("pipeline_tests");
    fs::create_dir_all(&dir).expect("failed to create test directory");
    dir.join(name)
}

#[test]
fn dataset_parses_timestamps_to_epoch_seconds() {
    let file = test_file("timestamps.csv");
    fs::write(
        &file,
        "time,other\n\
         2024-02-11T00:00:00.000000Z,1\n\
         2024-02-11T00:00:01.500000Z,2\n",
    )
    .expect("failed to write dataset file");

    let dataset = Dataset::from_csv(&file, "time", None).expect("failed to load dataset");
    assert_eq!(dataset.values(), &[1707609600.0, 1707609601.0]);
    assert!(dataset.integral());
}

#[test]
fn dataset_parses_floats_and_honors_the_row_cap() {
    let file = test_file("floats.csv");
    fs::write(&file, "value\n1.5\n2.5\n3.5\n4.5\n").expect("failed to write dataset file");

    let dataset = Dataset::from_csv(&file, "value", Some(3)).expect("failed to load dataset");
    assert_eq!(dataset.values(), &[1.5, 2.5, 3.5]);
    assert!(!dataset.integral());
}

#[test]
fn dataset_rejects_an_unknown_column() {
    let file = test_file("unknown_column.csv");
    fs::write(&file, "value\n1.0\n").expect("failed to write dataset file");

    assert!(Dataset::from_csv(&file, "missing", None).is_err());
}

#[test]
fn column_files_round_trip() {
    let file = test_file("column.csv");
    let values = [1.0, -2.5, 3.25];

    write_column(&file, "value", &values).expect("failed to write column");
    let read_back = read_column(&file).expect("failed to read column");
    assert_eq!(read_back, values);
}
