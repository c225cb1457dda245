//! Percentile statistics and robust normalisation
//!
//! Percentiles use linear interpolation between closest ranks, so results are
//! deterministic for identical input and match the usual "linear" definition.

/// Spread below which a percentile range is treated as degenerate
pub const DEGENERATE_SPREAD: f64 = 1e-9;

/// Default lower percentile for [`robust_norm`]
pub const DEFAULT_LOW_PERCENTILE: f64 = 5.0;

/// Default upper percentile for [`robust_norm`]
pub const DEFAULT_HIGH_PERCENTILE: f64 = 95.0;

/// Percentile of a set of values
///
/// # Arguments
///
/// * `values` - Samples (any order)
/// * `q` - Percentile in [0, 100]; clamped into range
///
/// # Returns
///
/// Linearly interpolated percentile, or 0.0 for an empty slice
///
/// # Example
///
/// ```
/// use stratum_motion::signal::percentile;
///
/// let values = [4.0, 1.0, 3.0, 2.0, 5.0];
/// assert_eq!(percentile(&values, 50.0), 3.0);
/// assert_eq!(percentile(&values, 25.0), 2.0);
/// ```
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 100.0) };
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Median of a set of values (mean of the two middle values for even
/// lengths), 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Robust normalisation to [0, 1] with the default 5th/95th percentiles
///
/// See [`robust_norm_with`].
pub fn robust_norm(signal: &[f64]) -> Vec<f64> {
    robust_norm_with(signal, DEFAULT_LOW_PERCENTILE, DEFAULT_HIGH_PERCENTILE)
}

/// Robust normalisation to [0, 1] with configurable percentiles
///
/// Maps the `lo` percentile to 0 and the `hi` percentile to 1, clipping
/// anything outside. If the percentile spread is below
/// [`DEGENERATE_SPREAD`] the output is all zeros. An empty input gives an
/// empty output.
///
/// # Example
///
/// ```
/// use stratum_motion::signal::robust_norm;
///
/// let y = robust_norm(&[7.0; 16]);
/// assert!(y.iter().all(|&v| v == 0.0));
/// ```
pub fn robust_norm_with(signal: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }

    let mut sorted = signal.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let a = percentile_sorted(&sorted, lo);
    let b = percentile_sorted(&sorted, hi);
    let spread = b - a;

    if !(spread >= DEGENERATE_SPREAD) {
        return vec![0.0; signal.len()];
    }

    signal
        .iter()
        .map(|&x| {
            let y = (x - a) / spread;
            if y.is_nan() {
                0.0
            } else {
                y.clamp(0.0, 1.0)
            }
        })
        .collect()
}

/// Zero-mean, unit-variance copy of a signal
///
/// Returns `None` when the (population) standard deviation is below
/// [`DEGENERATE_SPREAD`], or for an empty signal.
pub fn standardize(signal: &[f64]) -> Option<Vec<f64>> {
    if signal.is_empty() {
        return None;
    }
    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;
    let var = signal.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if !(std >= DEGENERATE_SPREAD) {
        return None;
    }
    Some(signal.iter().map(|x| (x - mean) / std).collect())
}
