use std::{env, fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let mut dataset_contents = String::from("index,value\n");
    for i_row in 0..40 {
        dataset_contents += &format!("{i_row},{}\n", 100.0 + (i_row % 7) as f64 * 3.5);
    }
    fs::write(test_dir.join("dataset.csv"), dataset_contents)
        .expect("failed to write dataset file");

    let config_contents = String::new()
        + "input_file = \"dataset.csv\"\n"
        + "column = \"value\"\n"
        + "window = 10\n"
        + "estimator = \"std\"\n"
        + "source = \"gaussian\"\n";
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_entroseq"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--work-dir", test_dir_str, "generate"]);
    run_bin(&["--work-dir", test_dir_str, "generate"]);

    for run_idx in ["run-0000", "run-0001"] {
        let generated = fs::read_to_string(test_dir.join(run_idx).join("generated.csv"))
            .expect("failed to read generated values");
        assert_eq!(generated.lines().count(), 31);

        let diffs = fs::read_to_string(test_dir.join(run_idx).join("differences.csv"))
            .expect("failed to read difference series");
        assert_eq!(diffs.lines().count(), 31);
    }

    run_bin(&["--work-dir", test_dir_str, "compare", "--run-idx", "0"]);
    assert!(test_dir.join("run-0000").join("comparison.json").is_file());

    run_bin(&["--work-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("run-0000").exists());
    assert!(!test_dir.join("run-0001").exists());

    fs::remove_dir_all(&test_dir).ok();
}
