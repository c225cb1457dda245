//! Hysteresis gating
//!
//! Two-state machine over a score: the gate opens when the score reaches the
//! upper threshold and closes once it drops below the lower one. The state of
//! each sample depends on the previous one, so this is a sequential scan.

/// Hysteresis mask of a score
///
/// # Arguments
///
/// * `score` - Values over time
/// * `thr_hi` - Threshold to switch on (`score >= thr_hi`)
/// * `thr_lo` - Threshold to switch off (`score < thr_lo`), expected `<= thr_hi`
///
/// # Returns
///
/// Boolean mask, `true` while the gate is open
///
/// # Example
///
/// ```
/// use stratum_motion::signal::hysteresis_mask;
///
/// let mask = hysteresis_mask(&[0.0, 0.7, 0.5, 0.4, 0.55], 0.6, 0.48);
/// assert_eq!(mask, vec![false, true, true, false, false]);
/// ```
pub fn hysteresis_mask(score: &[f64], thr_hi: f64, thr_lo: f64) -> Vec<bool> {
    let mut on = false;
    score
        .iter()
        .map(|&s| {
            if !on && s >= thr_hi {
                on = true;
            } else if on && s < thr_lo {
                on = false;
            }
            on
        })
        .collect()
}
