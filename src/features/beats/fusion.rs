//! Cue fusion
//!
//! Weighted sum of the active cues, renormalised to [0, 1].

use crate::config::BeatParams;
use crate::features::cues::CueSignals;
use crate::signal::robust_norm;

/// Fuse cue signals into one beat-strength curve
///
/// The base configuration sums deceleration, pelvis drop and foot contact;
/// the extended configuration adds global acceleration and reversal. A cue
/// that was not computed contributes nothing.
///
/// # Returns
///
/// Fused score in [0, 1], same length as the cues
pub fn fuse_cues(cues: &CueSignals, params: &BeatParams) -> Vec<f64> {
    let n = cues.len();
    let mut fused = vec![0.0; n];

    let mut add = |weight: f64, cue: &[f64]| {
        for (f, &c) in fused.iter_mut().zip(cue.iter()) {
            *f += weight * c;
        }
    };

    add(params.w_decel, &cues.decel);
    add(params.w_pelvis, &cues.pelvis);
    add(params.w_foot, &cues.foot);

    if let Some(ext) = &params.extended {
        if let Some(accel) = &cues.accel {
            add(ext.w_accel, accel);
        }
        if let Some(reversal) = &cues.reversal {
            add(ext.w_reversal, reversal);
        }
    }

    robust_norm(&fused)
}
