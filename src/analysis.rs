use crate::config::DualPolicy;
use crate::stats::{compute_mean, compute_pearson, compute_var};
use serde::{Deserialize, Serialize};

/// Elementwise difference between the original series and the generated
/// series, restricted to the region past the warm-up prefix.
///
/// With a single generated series the policy is irrelevant; with two (dual
/// mode) it decides how the pair is combined.
pub fn difference_series(
    series: &[f64],
    generated: &[Vec<f64>],
    window: usize,
    policy: DualPolicy,
) -> Vec<f64> {
    let mut diffs = Vec::with_capacity(series.len().saturating_sub(window));

    for i_val in window..series.len() {
        let diff = match policy {
            DualPolicy::SubtractBoth => generated
                .iter()
                .fold(series[i_val], |acc, vals| acc - vals[i_val]),
            DualPolicy::Average => {
                series[i_val]
                    - generated.iter().map(|vals| vals[i_val]).sum::<f64>()
                        / generated.len() as f64
            }
        };
        diffs.push(diff);
    }

    diffs
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub n_vals: usize,
    pub original: ColumnSummary,
    pub generated: ColumnSummary,
    pub pearson: f64,
}

/// Compare the original column against a generated column.
///
/// Both are truncated to the shorter length and min-max normalized before
/// the correlation is computed.
pub fn compare_series(original: &[f64], generated: &[f64]) -> ComparisonReport {
    let n_vals = original.len().min(generated.len());
    let original = &original[..n_vals];
    let generated = &generated[..n_vals];

    ComparisonReport {
        n_vals,
        original: summarize(original),
        generated: summarize(generated),
        pearson: compute_pearson(&normalize(original), &normalize(generated)),
    }
}

fn summarize(vals: &[f64]) -> ColumnSummary {
    ColumnSummary {
        mean: compute_mean(vals),
        std_dev: compute_var(vals).sqrt(),
        min: vals.iter().copied().fold(f64::INFINITY, f64::min),
        max: vals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

fn normalize(vals: &[f64]) -> Vec<f64> {
    let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0) {
        return vec![0.0; vals.len()];
    }
    vals.iter().map(|&val| (val - min) / range).collect()
}
