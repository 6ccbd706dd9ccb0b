use crate::config::EstimatorKind;

/// Spread estimator applied to every window of a run.
///
/// The variant and the Bayesian prior are fixed at construction;
/// estimation itself is a pure function of the sample.
pub struct SpreadEstimator {
    kind: EstimatorKind,
    prior: f64,
}

impl SpreadEstimator {
    pub fn new(kind: EstimatorKind, prior: f64) -> Self {
        Self { kind, prior }
    }

    /// Estimate the spread of a sample.
    ///
    /// Returns 0 for samples with fewer than 2 elements; this is a defined
    /// degenerate result, not an error.
    pub fn estimate(&self, sample: &[f64]) -> f64 {
        if sample.len() < 2 {
            return 0.0;
        }
        match self.kind {
            EstimatorKind::Std => compute_var(sample).sqrt(),
            EstimatorKind::Mad => compute_mad_spread(sample),
            EstimatorKind::Iqr => compute_iqr_spread(sample),
            EstimatorKind::Bayesian => compute_bayesian_spread(sample, self.prior),
        }
    }
}

pub fn compute_mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return f64::NAN;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Sample variance with Bessel's correction.
pub fn compute_var(sample: &[f64]) -> f64 {
    let n_vals = sample.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(sample);
    sample.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}

fn compute_median(sample: &[f64]) -> f64 {
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n_vals = sorted.len();
    if n_vals % 2 == 1 {
        sorted[n_vals / 2]
    } else {
        (sorted[n_vals / 2 - 1] + sorted[n_vals / 2]) / 2.0
    }
}

/// Quantile by linear interpolation between order statistics.
fn compute_quantile(sorted: &[f64], quantile: f64) -> f64 {
    let pos = quantile * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    sorted[below] + (sorted[above] - sorted[below]) * (pos - below as f64)
}

/// Median absolute deviation scaled to a normal-consistent standard deviation.
fn compute_mad_spread(sample: &[f64]) -> f64 {
    const MAD_TO_STD: f64 = 1.4826;

    let median = compute_median(sample);
    let abs_devs: Vec<f64> = sample.iter().map(|&val| (val - median).abs()).collect();
    compute_median(&abs_devs) * MAD_TO_STD
}

/// Interquartile range scaled to a normal-consistent standard deviation.
fn compute_iqr_spread(sample: &[f64]) -> f64 {
    const IQR_TO_STD: f64 = 1.349;

    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    (compute_quantile(&sorted, 0.75) - compute_quantile(&sorted, 0.25)) / IQR_TO_STD
}

/// Square root of the posterior mean of the variance under an inverse-gamma
/// prior with shape `n/2` and scale `n * s^2 / 2 + prior`.
///
/// The posterior mean `scale / (shape - 1)` diverges for n <= 2, where the
/// plug-in estimate is returned instead.
fn compute_bayesian_spread(sample: &[f64], prior: f64) -> f64 {
    let n_vals = sample.len() as f64;
    let sample_var = compute_var(sample);

    let shape = n_vals / 2.0;
    if shape <= 1.0 {
        return sample_var.sqrt();
    }
    let scale = n_vals * sample_var / 2.0 + prior;
    (scale / (shape - 1.0)).sqrt()
}

/// Pearson correlation coefficient; 0 when either sample is degenerate.
pub fn compute_pearson(sample_a: &[f64], sample_b: &[f64]) -> f64 {
    let n_vals = sample_a.len().min(sample_b.len());
    if n_vals < 2 {
        return 0.0;
    }
    let mean_a = compute_mean(&sample_a[..n_vals]);
    let mean_b = compute_mean(&sample_b[..n_vals]);

    let mut cov_sum = 0.0;
    let mut var_a_sum = 0.0;
    let mut var_b_sum = 0.0;
    for (&val_a, &val_b) in sample_a.iter().zip(sample_b.iter()) {
        let diff_a = val_a - mean_a;
        let diff_b = val_b - mean_b;
        cov_sum += diff_a * diff_b;
        var_a_sum += diff_a * diff_a;
        var_b_sum += diff_b * diff_b;
    }

    let denom = (var_a_sum * var_b_sum).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cov_sum / denom
}

/// Coarse per-block trend profiler.
///
/// Partitions the series into non-overlapping blocks of the window length and
/// maps each block to one scaled, truncated correlation coefficient between
/// the block's standardized values and their positions.
pub struct CorrelationProfiler {
    window: usize,
    scale: f64,
    multiplier: i64,
}

impl CorrelationProfiler {
    pub fn new(window: usize, scale: f64, multiplier: i64) -> Self {
        Self {
            window,
            scale,
            multiplier,
        }
    }

    /// Compute one coefficient per full block; a trailing partial block is
    /// dropped. Constant blocks yield 0 so the block index map stays aligned.
    pub fn profile(&self, series: &[f64]) -> Vec<i64> {
        let n_blocks = series.len() / self.window;
        let mut coeffs = Vec::with_capacity(n_blocks);

        for i_block in 0..n_blocks {
            let block = &series[i_block * self.window..(i_block + 1) * self.window];
            coeffs.push(self.block_coefficient(i_block, block));
        }

        coeffs
    }

    fn block_coefficient(&self, i_block: usize, block: &[f64]) -> i64 {
        let mean = compute_mean(block);
        let std_dev = compute_var(block).sqrt();
        if !(std_dev > 0.0) {
            log::warn!("block {i_block} is constant, using a neutral trend coefficient");
            return 0;
        }

        let standardized: Vec<f64> = block.iter().map(|&val| (val - mean) / std_dev).collect();
        let positions: Vec<f64> = (0..block.len()).map(|pos| pos as f64).collect();

        let corr = compute_pearson(&standardized, &positions);
        (corr * self.scale * self.multiplier as f64) as i64
    }
}
