//! Tempo-aware refinement
//!
//! Treats the event frame as a function of the beat number `k`, fits
//! `frame ≈ a + b·k` by least squares (refitting once without gross
//! outliers), then snaps every predicted grid frame to the strongest score
//! within `±max_drift_frames`. Cost is linear in the number of events; only
//! local tempo drift is corrected.

use crate::signal::{argmax, median, sorted_unique};
use serde::{Deserialize, Serialize};

/// Residuals beyond this many MADs are excluded from the refit.
const OUTLIER_MAD_FACTOR: f64 = 3.5;

/// Slopes at or below this many frames per beat are not a usable tempo.
const MIN_PERIOD_FRAMES: f64 = 0.5;

/// Fitted beat grid `frame ≈ intercept + period_frames · k`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoFit {
    /// Frame of beat 0
    pub intercept: f64,
    /// Frames per beat
    pub period_frames: f64,
}

impl TempoFit {
    /// Predicted frame of beat `k`.
    pub fn predict(&self, k: usize) -> f64 {
        self.intercept + self.period_frames * k as f64
    }

    /// Beat period in seconds.
    pub fn period_s(&self, fps: f64) -> f64 {
        self.period_frames / fps
    }
}

/// Least-squares line through `(k, frame)` points.
fn least_squares(points: &[(f64, f64)]) -> Option<TempoFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_k = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_e = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_k).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_k) * (p.1 - mean_e)).sum();
    let slope = sxy / sxx;
    let fit = TempoFit {
        intercept: mean_e - slope * mean_k,
        period_frames: slope,
    };
    if fit.period_frames.is_finite() && fit.period_frames > MIN_PERIOD_FRAMES {
        Some(fit)
    } else {
        None
    }
}

/// Fit a beat grid to a sorted event set
///
/// The first fit uses every event. Events whose residual exceeds
/// 3.5 × MAD are then dropped and the line refit, provided at least
/// `min_events` remain and something was actually dropped.
///
/// # Returns
///
/// `None` when fewer than `max(min_events, 2)` events are given or the
/// slope is non-finite or at most 0.5 frames per beat
pub fn fit_tempo_line(events: &[usize], min_events: usize) -> Option<TempoFit> {
    let n = events.len();
    if n < min_events.max(2) {
        return None;
    }

    let points: Vec<(f64, f64)> = events
        .iter()
        .enumerate()
        .map(|(k, &e)| (k as f64, e as f64))
        .collect();
    let fit = least_squares(&points)?;

    let residuals: Vec<f64> = points.iter().map(|&(k, e)| e - (fit.intercept + fit.period_frames * k)).collect();
    let med = median(&residuals);
    let deviations: Vec<f64> = residuals.iter().map(|r| (r - med).abs()).collect();
    let mad = median(&deviations) + 1e-9;

    let good: Vec<(f64, f64)> = points
        .iter()
        .zip(residuals.iter())
        .filter(|(_, r)| r.abs() <= OUTLIER_MAD_FACTOR * mad)
        .map(|(p, _)| *p)
        .collect();

    if good.len() >= min_events && good.len() < n {
        log::debug!("Tempo refit without {} outlier events", n - good.len());
        least_squares(&good)
    } else {
        Some(fit)
    }
}

/// Snap events onto a fitted near-uniform beat grid
///
/// # Arguments
///
/// * `events` - Event frames (any order, duplicates allowed)
/// * `score` - Reference curve the grid is snapped to (length `T`)
/// * `max_drift_frames` - Search half-window around each predicted frame
/// * `min_events` - Fewer events than this leave the input unchanged
///
/// # Returns
///
/// Sorted, duplicate-free frames. The input (sorted, de-duplicated and
/// restricted to `[0, T)`) is returned unchanged when there are too few
/// events or no usable tempo. Predicted frames whose window lies entirely
/// outside the score are dropped.
///
/// # Example
///
/// ```
/// use stratum_motion::features::tempo::refine_events_with_tempo;
///
/// let mut score = vec![0.0; 100];
/// for f in [10, 31, 50, 69, 90] {
///     score[f] = 1.0;
/// }
/// let refined = refine_events_with_tempo(&[10, 31, 50, 69, 90], &score, 3, 3);
/// assert_eq!(refined, vec![10, 31, 50, 69, 90]);
/// ```
pub fn refine_events_with_tempo(
    events: &[usize],
    score: &[f64],
    max_drift_frames: usize,
    min_events: usize,
) -> Vec<usize> {
    let n_frames = score.len();
    let events = sorted_unique(events.to_vec());
    if events.len() < min_events || events.len() < 2 || n_frames == 0 {
        return events;
    }

    let events: Vec<usize> = events.into_iter().filter(|&e| e < n_frames).collect();
    if events.len() < min_events {
        return events;
    }

    let fit = match fit_tempo_line(&events, min_events) {
        Some(fit) => fit,
        None => {
            log::debug!("No usable tempo in {} events, leaving them unchanged", events.len());
            return events;
        }
    };

    let drift = max_drift_frames as i64;
    let mut snapped = Vec::with_capacity(events.len());
    for k in 0..events.len() {
        let center = fit.predict(k).round_ties_even() as i64;
        let lo = (center - drift).max(0);
        let hi = (center + drift + 1).min(n_frames as i64);
        if hi <= lo {
            continue;
        }
        let (lo, hi) = (lo as usize, hi as usize);
        if let Some(best) = argmax(&score[lo..hi]) {
            snapped.push(lo + best);
        }
    }

    let refined = sorted_unique(snapped);
    log::debug!(
        "Tempo refinement: {} -> {} events, period {:.2} frames",
        events.len(),
        refined.len(),
        fit.period_frames
    );
    refined
}
