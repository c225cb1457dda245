//! Signal primitives
//!
//! Small, stateless array-to-array transforms shared by the cue extractors,
//! the event detector, the tempo refiner and the temporal aligner:
//! - Moving-average smoothing with edge padding
//! - Central-difference derivatives
//! - Local extrema masks
//! - Percentile statistics and robust [0, 1] normalisation
//! - Hysteresis gating
//! - Non-maximum suppression
//! - Autocorrelation period estimation
//! - Peak prominence and local area
//!
//! Every function is total: empty or very short inputs produce empty,
//! all-zero or `None` results rather than errors.

pub mod autocorrelation;
pub mod derivative;
pub mod extrema;
pub mod hysteresis;
pub mod nms;
pub mod normalization;
pub mod peaks;
pub mod smoothing;

pub use autocorrelation::estimate_period_from_autocorr;
pub use derivative::{gradient, gradient_vec3, norm3};
pub use extrema::{local_maxima, local_minima, mask_indices};
pub use hysteresis::hysteresis_mask;
pub use nms::nms_basic;
pub use normalization::{median, percentile, robust_norm, robust_norm_with, standardize};
pub use peaks::prominence_and_area;
pub use smoothing::{moving_average, moving_average_vec3};

/// Index of the first maximum (`None` for an empty slice).
///
/// NaN values never win against finite values.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Sorted, duplicate-free copy of a set of frame indices.
pub(crate) fn sorted_unique(mut events: Vec<usize>) -> Vec<usize> {
    events.sort_unstable();
    events.dedup();
    events
}
