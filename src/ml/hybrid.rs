//! Combining rule-based events with classifier probabilities
//!
//! Rule events act as anchors that may move onto a confident nearby
//! probability peak; confident peaks the rules missed are added; finally
//! events that crowd each other are merged, keeping the more probable one.

use crate::error::{MotionError, Result};
use crate::signal::{argmax, sorted_unique};
use serde::{Deserialize, Serialize};

/// Hybrid merge parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridParams {
    /// How far a rule anchor may move onto a probability peak, in seconds (default: 0.12)
    pub snap_radius_s: f64,

    /// Probability needed to move an anchor or add a classifier-only event (default: 0.5)
    pub thr_ml: f64,

    /// Minimum separation between final events, in seconds (default: 0.08)
    pub min_sep_s: f64,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            snap_radius_s: 0.12,
            thr_ml: 0.5,
            min_sep_s: 0.08,
        }
    }
}

impl HybridParams {
    /// Validate the parameter set.
    pub fn validate(&self) -> Result<()> {
        if !(self.snap_radius_s.is_finite() && self.snap_radius_s >= 0.0) {
            return Err(MotionError::invalid_config(format!(
                "snap_radius_s must be >= 0, got {}",
                self.snap_radius_s
            )));
        }
        if !(0.0..=1.0).contains(&self.thr_ml) {
            return Err(MotionError::invalid_config(format!(
                "thr_ml must be in [0, 1], got {}",
                self.thr_ml
            )));
        }
        if !(self.min_sep_s.is_finite() && self.min_sep_s >= 0.0) {
            return Err(MotionError::invalid_config(format!(
                "min_sep_s must be >= 0, got {}",
                self.min_sep_s
            )));
        }
        Ok(())
    }
}

fn seconds_to_frames(seconds: f64, fps: f64) -> usize {
    let frames = (seconds * fps).round_ties_even();
    if frames.is_finite() && frames > 0.0 {
        frames as usize
    } else {
        0
    }
}

/// Runs of frames with `prob >= thr`, as half-open `(start, end)` ranges.
pub fn threshold_segments(prob: &[f64], thr: f64) -> Vec<(usize, usize)> {
    let mut segments = Vec::new();
    let mut start = None;
    for (i, &p) in prob.iter().enumerate() {
        match (p >= thr, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                segments.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        segments.push((s, prob.len()));
    }
    segments
}

/// Turn per-frame probabilities into events
///
/// Each run of frames at or above `thr` contributes its most probable frame
/// (the first one on ties).
///
/// # Example
///
/// ```
/// use stratum_motion::ml::probs_to_events;
///
/// let prob = [0.1, 0.6, 0.9, 0.7, 0.2, 0.8, 0.8, 0.0];
/// assert_eq!(probs_to_events(&prob, 0.5), vec![2, 5]);
/// ```
pub fn probs_to_events(prob: &[f64], thr: f64) -> Vec<usize> {
    let events = threshold_segments(prob, thr)
        .into_iter()
        .filter_map(|(s, e)| argmax(&prob[s..e]).map(|i| s + i))
        .collect();
    sorted_unique(events)
}

/// Merge rule-based events with classifier probabilities
///
/// # Arguments
///
/// * `rule_events` - Events from [`crate::features::beats::extract_beats`];
///   frames outside the probability curve are ignored
/// * `prob` - Per-frame beat probability (length `T`)
/// * `fps` - Frame rate in Hz
/// * `params` - Snap radius, probability threshold and minimum separation
///
/// # Returns
///
/// Sorted, duplicate-free events. Within `min_sep_s` (at least one frame)
/// of a kept event, a later event replaces it only if it is strictly more
/// probable.
pub fn combine_rule_and_ml_events(
    rule_events: &[usize],
    prob: &[f64],
    fps: f64,
    params: &HybridParams,
) -> Vec<usize> {
    let n = prob.len();
    if n == 0 {
        return Vec::new();
    }

    let snap_r = seconds_to_frames(params.snap_radius_s, fps);
    let anchors = sorted_unique(rule_events.iter().copied().filter(|&e| e < n).collect());

    let snapped: Vec<usize> = anchors
        .iter()
        .map(|&e| {
            let lo = e.saturating_sub(snap_r);
            let hi = (e + snap_r + 1).min(n);
            match argmax(&prob[lo..hi]).map(|i| lo + i) {
                Some(best) if prob[best] >= params.thr_ml => best,
                _ => e,
            }
        })
        .collect();

    let ml_events = probs_to_events(prob, params.thr_ml);
    let mut all = snapped;
    all.extend(ml_events.iter().copied());
    let all = sorted_unique(all);

    let min_sep = seconds_to_frames(params.min_sep_s, fps).max(1);
    let mut kept: Vec<usize> = Vec::with_capacity(all.len());
    for e in all {
        match kept.last_mut() {
            Some(last) if e - *last < min_sep => {
                if prob[e] > prob[*last] {
                    *last = e;
                }
            }
            _ => kept.push(e),
        }
    }

    log::debug!(
        "Hybrid events: {} rule anchors, {} classifier events -> {}",
        anchors.len(),
        ml_events.len(),
        kept.len()
    );
    sorted_unique(kept)
}
