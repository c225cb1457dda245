//! Reversal cue
//!
//! Speed valleys reached while the median speed is still falling: the body
//! slows down, turns around and builds up again.

use super::speed::body_speed_trace;
use crate::rig::JointPositions;
use crate::signal::{gradient, local_minima, robust_norm};

/// Reversal cue
///
/// `robust_norm(max(0, -dm/dt) · minima(m))` with `m` the median speed of the
/// smoothed selected joints. All zero for fewer than 3 frames.
pub fn cue_reversal(selected: &JointPositions, dt: f64, smooth_win: usize) -> Vec<f64> {
    let n = selected.n_frames();
    if n < 3 {
        return vec![0.0; n];
    }
    let m = body_speed_trace(selected, dt, smooth_win);
    let dm = gradient(&m, dt);
    let raw: Vec<f64> = local_minima(&m)
        .iter()
        .zip(dm.iter())
        .map(|(&is_min, &d)| if is_min { (-d).max(0.0) } else { 0.0 })
        .collect();
    robust_norm(&raw)
}
