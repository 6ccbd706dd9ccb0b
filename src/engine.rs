use crate::entropy::EntropySource;
use crate::stats::SpreadEstimator;

/// Windowed generator.
///
/// Scans the input series and, past the warm-up prefix, replaces each value
/// with a sample from the entropy source bounded by the spread estimates of
/// the preceding and following windows.
pub struct WindowedGenerator {
    window: usize,
    integral: bool,
    estimator: SpreadEstimator,
    trend_coeffs: Option<Vec<i64>>,
}

impl WindowedGenerator {
    pub fn new(
        window: usize,
        integral: bool,
        estimator: SpreadEstimator,
        trend_coeffs: Option<Vec<i64>>,
    ) -> Self {
        Self {
            window,
            integral,
            estimator,
            trend_coeffs,
        }
    }

    /// Produce a generated series of the same length as the input.
    ///
    /// The first `window` entries are placeholder zeros and carry no meaning;
    /// callers must discard them before comparison.
    pub fn generate(&self, series: &[f64], source: &mut dyn EntropySource) -> Vec<f64> {
        let n_vals = series.len();
        let mut generated = Vec::with_capacity(n_vals);

        for i_val in 0..n_vals {
            if i_val < self.window {
                generated.push(0.0);
                continue;
            }

            let lower_range_value = self.window_spread(series, i_val - self.window, i_val);
            // The following window may be shorter than the configured length
            // near the tail, down to empty at the last position.
            let upper_range_value =
                self.window_spread(series, i_val + 1, n_vals.min(i_val + 1 + self.window));

            let value = source
                .generate(1, lower_range_value, upper_range_value)
                .first()
                .copied()
                .unwrap_or_default();

            generated.push(if self.integral { value.trunc() } else { value });
        }

        generated
    }

    /// Spread of `series[start..end]`, with each sample shifted by the trend
    /// coefficient of the block containing its series index when correction
    /// is enabled.
    fn window_spread(&self, series: &[f64], start: usize, end: usize) -> f64 {
        let window = &series[start..end];
        match &self.trend_coeffs {
            None => self.estimator.estimate(window),
            Some(coeffs) => {
                let shifted: Vec<f64> = window
                    .iter()
                    .enumerate()
                    .map(|(offset, &val)| {
                        let i_block = (start + offset) / self.window;
                        val + coeffs.get(i_block).copied().unwrap_or(0) as f64
                    })
                    .collect();
                self.estimator.estimate(&shifted)
            }
        }
    }
}
