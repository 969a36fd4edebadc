//! Descriptive statistics for one distribution of per-flow values.
//!
//! Box statistics follow the usual box-plot convention: quartiles by linear
//! interpolation, whiskers at the most extreme samples within 1.5 IQR of the
//! box. Samples beyond the whiskers are not reported.

use serde::Serialize;

/// Whisker reach as a multiple of the interquartile range
pub const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Summary of one box in a box plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
}

impl BoxStats {
    /// Summarise a set of samples; `None` when there are no finite samples
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let reach = WHISKER_IQR_FACTOR * (q3 - q1);

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= q1 - reach)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= q3 + reach)
            .unwrap_or(q3);

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
        })
    }
}

/// Quantile `q` in [0, 1] of sorted, non-empty samples, linearly interpolated
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
