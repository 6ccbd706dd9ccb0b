use crate::analysis;
use crate::config::Config;
use crate::dataset::{self, Dataset};
use crate::engine::WindowedGenerator;
use crate::entropy;
use crate::stats::{CorrelationProfiler, SpreadEstimator};
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

pub struct Manager {
    work_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
        let work_dir = work_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(work_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { work_dir, cfg })
    }

    /// Run the pipeline once and persist its outputs into the next run
    /// directory.
    pub fn generate(&self) -> Result<()> {
        let dataset = self.load_dataset().context("failed to load dataset")?;
        log::info!("dataset size: {}", dataset.values().len());
        if dataset.values().len() <= self.cfg.window {
            log::warn!("dataset is not longer than the window, the trimmed output will be empty");
        }

        // The trend profile is computed once, up front, before any
        // per-position correction is applied.
        let trend_coeffs = self.cfg.correction.as_ref().map(|correction| {
            CorrelationProfiler::new(self.cfg.window, correction.scale, correction.multiplier)
                .profile(dataset.values())
        });

        let generator = WindowedGenerator::new(
            self.cfg.window,
            dataset.integral(),
            SpreadEstimator::new(self.cfg.estimator, self.cfg.bayes_prior),
            trend_coeffs,
        );

        let mut sources =
            entropy::build_sources(&self.cfg).context("failed to construct sources")?;

        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;
        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let trim = self.cfg.window.min(dataset.values().len());
        let single_source = sources.len() == 1;

        let mut generated_vec = Vec::with_capacity(sources.len());
        for source in &mut sources {
            log::info!("generating new values with the {} source", source.name());
            let generated = generator.generate(dataset.values(), source.as_mut());

            let file = if single_source {
                run_dir.join("generated.csv")
            } else {
                run_dir.join(format!("generated-{}.csv", source.name()))
            };
            dataset::write_column(&file, "value", &generated[trim..])
                .context("failed to save generated values")?;
            log::info!("wrote {file:?}");

            generated_vec.push(generated);
        }

        let diffs = analysis::difference_series(
            dataset.values(),
            &generated_vec,
            self.cfg.window,
            self.cfg.dual_policy,
        );
        let file = run_dir.join("differences.csv");
        dataset::write_column(&file, "difference", &diffs)
            .context("failed to save difference series")?;
        log::info!("wrote {file:?}");

        Ok(())
    }

    /// Compare the original column against the generated output of a run.
    pub fn compare(&self, run_idx: usize) -> Result<()> {
        let run_dir = self.run_dir(run_idx);

        let dataset = self.load_dataset().context("failed to load dataset")?;
        let trim = self.cfg.window.min(dataset.values().len());
        let trimmed = &dataset.values()[trim..];

        let pattern = run_dir.join("generated*.csv");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;

        let mut reports = Vec::new();
        for path in glob(pattern)
            .context("failed to glob generated files")?
            .filter_map(Result::ok)
        {
            let generated = dataset::read_column(&path)
                .with_context(|| format!("failed to read {path:?}"))?;
            let report = analysis::compare_series(trimmed, &generated);

            let name = path.file_name().context("file has no name")?;
            reports.push(serde_json::json!({
                "file": name.to_string_lossy(),
                "report": report,
            }));
        }
        if reports.is_empty() {
            bail!("no generated output in {run_dir:?}");
        }

        let file = run_dir.join("comparison.json");
        let writer = BufWriter::new(
            File::create(&file).with_context(|| format!("failed to create {file:?}"))?,
        );
        serde_json::to_writer_pretty(writer, &reports).context("failed to save reports")?;
        log::info!("wrote {file:?}");

        Ok(())
    }

    /// Remove all run directories.
    pub fn clean(&self) -> Result<()> {
        let pattern = self.work_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for run_dir in glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
        {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }
        Ok(())
    }

    fn load_dataset(&self) -> Result<Dataset> {
        let input_file = if self.cfg.input_file.is_relative() {
            self.work_dir.join(&self.cfg.input_file)
        } else {
            self.cfg.input_file.clone()
        };
        Dataset::from_csv(&input_file, &self.cfg.column, self.cfg.max_rows)
    }

    fn count_run_dirs(&self) -> Result<usize> {
        let pattern = self.work_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .count();
        Ok(count)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.work_dir.join(format!("run-{run_idx:04}"))
    }
}
