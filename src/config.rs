use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::RangeBounds,
    path::{Path, PathBuf},
};

/// Pipeline configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input dataset file (CSV with a header row).
    pub input_file: PathBuf,
    /// Name of the column to consume.
    pub column: String,
    /// Optional cap on the number of rows consumed.
    #[serde(default)]
    pub max_rows: Option<usize>,

    /// Window length used for spread estimation and trend blocks.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Spread estimator applied to every window.
    #[serde(default)]
    pub estimator: EstimatorKind,
    /// Entropy source that produces the replacement values.
    #[serde(default)]
    pub source: SourceKind,

    /// Prior for the Bayesian spread estimator.
    #[serde(default = "default_prior")]
    pub bayes_prior: f64,

    /// How the two generated series are combined in dual-source mode.
    #[serde(default)]
    pub dual_policy: DualPolicy,

    /// Trend correction applied to windows before estimation (absent = disabled).
    #[serde(default)]
    pub correction: Option<Correction>,

    /// API credentials for the remote sources.
    #[serde(default)]
    pub credentials: Credentials,
}

fn default_window() -> usize {
    10
}

fn default_prior() -> f64 {
    1.0
}

/// Spread estimator selection.
///
/// An unrecognized tag is rejected when the configuration is deserialized.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    #[default]
    Std,
    Mad,
    Iqr,
    Bayesian,
}

/// Entropy source selection.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Classical,
    Quantum,
    #[default]
    Gaussian,
    #[serde(rename = "classical+quantum")]
    Dual,
}

/// Combination policy for the difference series in dual-source mode.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DualPolicy {
    /// Subtract both generated series from the original value.
    #[default]
    SubtractBoth,
    /// Subtract the mean of the two generated series.
    Average,
}

/// Trend correction constants.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Correction {
    /// Scale applied to each block correlation coefficient.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Integer multiplier applied after scaling.
    #[serde(default = "default_multiplier")]
    pub multiplier: i64,
}

fn default_scale() -> f64 {
    100.0
}

fn default_multiplier() -> i64 {
    1
}

/// Opaque API credentials, required only for the remote sources.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub random_api_key: Option<String>,
    pub qrng_api_key: Option<String>,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.column.is_empty() {
            bail!("column name must not be empty");
        }

        check_num(self.window, 1..100_000).context("invalid window length")?;
        if let Some(max_rows) = self.max_rows {
            check_num(max_rows, 1..).context("invalid row cap")?;
        }

        check_num(self.bayes_prior, 0.0..f64::INFINITY).context("invalid Bayesian prior")?;

        if let Some(correction) = &self.correction {
            check_num(correction.scale, 0.0..1e9).context("invalid correction scale")?;
            check_num(correction.multiplier, 1..1_000_000)
                .context("invalid correction multiplier")?;
        }

        // A missing credential would only surface as failed requests deep in
        // the scan, so refuse to start without one.
        if self.uses_classical() && !has_key(&self.credentials.random_api_key) {
            bail!("the classical source requires credentials.random_api_key");
        }
        if self.uses_quantum() && !has_key(&self.credentials.qrng_api_key) {
            bail!("the quantum source requires credentials.qrng_api_key");
        }

        Ok(())
    }

    pub fn uses_classical(&self) -> bool {
        matches!(self.source, SourceKind::Classical | SourceKind::Dual)
    }

    pub fn uses_quantum(&self) -> bool {
        matches!(self.source, SourceKind::Quantum | SourceKind::Dual)
    }
}

fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|key| !key.is_empty())
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
