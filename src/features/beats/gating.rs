//! Event gating
//!
//! Candidate selection and rechecks between fusion and the final event set:
//! adaptive NMS separation, prominence/area gating of local maxima, and the
//! hard threshold recheck after phase snapping.

use crate::config::{BeatParams, ExtendedParams};
use crate::signal::{estimate_period_from_autocorr, local_maxima, prominence_and_area};

/// Clamp range of the tempo-derived NMS separation, in seconds.
pub const ADAPTIVE_NMS_RANGE_S: (f64, f64) = (0.08, 0.25);

/// NMS separation in seconds and the period it was derived from
///
/// With `adaptive_nms`, half the autocorrelation period of the score is
/// clamped into [`ADAPTIVE_NMS_RANGE_S`]. Otherwise, or when no period is
/// found, the configured `nms_separation_s` is used.
pub fn nms_separation(score: &[f64], fps: f64, params: &BeatParams) -> (f64, Option<f64>) {
    if !params.adaptive_nms {
        return (params.nms_separation_s, None);
    }
    match estimate_period_from_autocorr(score, fps) {
        Some(period) => {
            let (lo, hi) = ADAPTIVE_NMS_RANGE_S;
            ((0.5 * period).clamp(lo, hi), Some(period))
        }
        None => (params.nms_separation_s, None),
    }
}

/// Local maxima that pass hysteresis, prominence and area tests
///
/// The test window is `max(1, round(prom_window_s · fps))` frames on each side.
pub fn gated_candidates(score: &[f64], hysteresis: &[bool], fps: f64, ext: &ExtendedParams) -> Vec<usize> {
    let radius = ((ext.prom_window_s * fps).round_ties_even().max(1.0)) as usize;
    let maxima = local_maxima(score);

    let candidates: Vec<usize> = (0..score.len())
        .filter(|&i| maxima[i] && hysteresis.get(i).copied().unwrap_or(false))
        .filter(|&i| {
            let (prominence, area) = prominence_and_area(score, i, radius);
            prominence >= ext.min_prominence && area >= ext.min_area
        })
        .collect();

    log::debug!(
        "Gating kept {} of {} local maxima (radius {} frames)",
        candidates.len(),
        maxima.iter().filter(|&&m| m).count(),
        radius
    );
    candidates
}

/// Keep events whose score reaches `thr_hi` within `±radius` frames.
pub fn hard_recheck(events: &[usize], score: &[f64], thr_hi: f64, radius: usize) -> Vec<usize> {
    let n = score.len();
    events
        .iter()
        .copied()
        .filter(|&e| {
            let lo = e.saturating_sub(radius).min(n);
            let hi = (e + radius + 1).min(n);
            score[lo..hi].iter().any(|&s| s >= thr_hi)
        })
        .collect()
}
