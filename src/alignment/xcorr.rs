//! Cross-correlation offset estimation
//!
//! Resamples both envelopes once onto the overlap of their raw time axes and
//! picks the best lag of the full linear cross-correlation. Cheaper than the
//! grid search, but the overlap is fixed before shifting, so large offsets
//! lose more signal at the edges.

use super::envelope::Envelope;
use super::offset::{search_is_usable, time_grid, OffsetEstimate};
use crate::config::AlignmentConfig;
use crate::signal::standardize;
use serde::{Deserialize, Serialize};

/// Minimum overlap, in grid steps, before the correlation is attempted
const MIN_OVERLAP_STEPS: f64 = 5.0;

/// Minimum number of resampled points
const MIN_GRID_POINTS: usize = 10;

/// Lag of a cross-correlation, in grid steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    /// Lag `k` in `c[k] = sum_n a[n + k] * m[n]`
    pub lag: isize,
    /// Correlation value
    pub value: f64,
}

/// Full linear cross-correlation restricted to `|lag| <= max_lag`
///
/// `c[k] = sum_n a[n + k] * m[n]` over indices inside both signals. Lags are
/// returned in increasing order.
pub fn cross_correlation(a: &[f64], m: &[f64], max_lag: usize) -> Vec<LagCorrelation> {
    if a.is_empty() || m.is_empty() {
        return Vec::new();
    }
    let lo = -((m.len() - 1).min(max_lag) as isize);
    let hi = ((a.len() - 1).min(max_lag)) as isize;

    (lo..=hi)
        .map(|lag| {
            let value = (0..m.len() as isize)
                .filter_map(|n| {
                    let i = n + lag;
                    (i >= 0 && (i as usize) < a.len()).then(|| a[i as usize] * m[n as usize])
                })
                .sum::<f64>();
            LagCorrelation { lag, value }
        })
        .collect()
}

/// Estimate the global audio-to-motion offset by cross-correlation
///
/// Same sign convention as [`super::estimate_offset`]: the result is added to
/// audio timestamps, `motion(t) ≈ audio(t - offset_s)`. If the motion trails
/// the audio by `d` seconds the best lag is `-d / step`, so the offset is
/// `-lag * step`.
///
/// # Returns
///
/// Zero offset when the search range or resolution is unusable, either
/// envelope is shorter than `config.min_samples`, the raw overlap is shorter
/// than five grid steps or holds fewer than ten grid points, or either
/// resampled envelope is flat over the overlap
pub fn estimate_offset_xcorr(audio: &Envelope, motion: &Envelope, config: &AlignmentConfig) -> OffsetEstimate {
    log::debug!(
        "Estimating offset by cross-correlation: {} audio samples, {} motion samples",
        audio.len(),
        motion.len()
    );

    if !search_is_usable(config) {
        return OffsetEstimate::zero();
    }
    if audio.len() < config.min_samples || motion.len() < config.min_samples {
        return OffsetEstimate::zero();
    }
    let ((a0, a1), (m0, m1)) = match (audio.span(), motion.span()) {
        (Some(a), Some(m)) => (a, m),
        _ => return OffsetEstimate::zero(),
    };

    let step = config.resolution_s;
    let t_min = a0.max(m0);
    let t_max = a1.min(m1);
    if t_max <= t_min + MIN_OVERLAP_STEPS * step {
        log::debug!("Overlap too short for cross-correlation, offset = 0");
        return OffsetEstimate::zero();
    }

    let grid = time_grid(t_min, t_max, step);
    if grid.len() < MIN_GRID_POINTS {
        return OffsetEstimate::zero();
    }

    let a: Vec<f64> = grid.iter().map(|&t| audio.interp(t)).collect();
    let m: Vec<f64> = grid.iter().map(|&t| motion.interp(t)).collect();
    let (a, m) = match (standardize(&a), standardize(&m)) {
        (Some(a), Some(m)) => (a, m),
        _ => {
            log::debug!("Zero-variance envelope over the overlap, offset = 0");
            return OffsetEstimate::zero();
        }
    };

    let max_lag = (config.max_offset_s / step).floor() as usize;
    let corr = cross_correlation(&a, &m, max_lag);

    // First maximum wins, as in a left-to-right argmax
    let best = corr.iter().copied().fold(None::<LagCorrelation>, |best, c| match best {
        Some(b) if c.value <= b.value => Some(b),
        _ => Some(c),
    });

    match best {
        Some(b) => {
            let offset_s = -(b.lag as f64) * step;
            log::debug!("Best lag {} ({:.3}s), corr={:.3}", b.lag, offset_s, b.value);
            OffsetEstimate {
                offset_s,
                score: Some(b.value / grid.len() as f64),
                candidates: corr.len(),
            }
        }
        None => OffsetEstimate::zero(),
    }
}
