//! Kinematic beat cues
//!
//! Each cue is a pure function of joint positions and a few scalars, and
//! returns a per-frame signal in [0, 1] of the same length as the clip:
//! - Deceleration: speed valleys reached while slowing down
//! - Pelvis drop: low points of the pelvis bounce
//! - Foot contact: heel strikes (per foot, combined by maximum)
//! - Global acceleration: median acceleration magnitude
//! - Reversal: speed turnarounds
//!
//! Clips shorter than 3 frames produce all-zero cues.

pub mod acceleration;
pub mod deceleration;
pub mod foot_contact;
pub mod pelvis;
pub mod reversal;
pub mod speed;

pub use acceleration::cue_global_accel;
pub use deceleration::cue_deceleration;
pub use foot_contact::{cue_foot_contact, estimate_ground_level};
pub use pelvis::cue_pelvis_drop;
pub use reversal::cue_reversal;
pub use speed::{body_speed_trace, leg_length};

use crate::config::BeatParams;
use crate::rig::{JointPositions, RigIndices};
use serde::{Deserialize, Serialize};

/// All cue signals of one clip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueSignals {
    /// Deceleration cue
    pub decel: Vec<f64>,
    /// Pelvis drop cue
    pub pelvis: Vec<f64>,
    /// Combined foot contact cue (per-frame maximum over both feet)
    pub foot: Vec<f64>,
    /// Left foot contact cue
    pub left_foot: Vec<f64>,
    /// Right foot contact cue
    pub right_foot: Vec<f64>,
    /// Global acceleration cue (extended configuration only)
    pub accel: Option<Vec<f64>>,
    /// Reversal cue (extended configuration only)
    pub reversal: Option<Vec<f64>>,
}

impl CueSignals {
    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.decel.len()
    }

    /// Whether the cues are empty.
    pub fn is_empty(&self) -> bool {
        self.decel.is_empty()
    }
}

/// Compute every cue required by a parameter set
///
/// # Arguments
///
/// * `positions` - All joint positions `(T, J, 3)`
/// * `joints` - Joints driving the body-level cues; out-of-range entries are
///   ignored, and an empty (or fully invalid) list selects every joint
/// * `rig` - Pelvis and foot indices (each may be missing)
/// * `fps` - Frame rate in Hz (must be > 0)
/// * `params` - Beat parameters; the extended cues are computed only when
///   `params.extended` is set
pub fn extract_cues(
    positions: &JointPositions,
    joints: &[usize],
    rig: &RigIndices,
    fps: f64,
    params: &BeatParams,
) -> CueSignals {
    log::debug!(
        "Extracting cues: {} frames, {} joints ({} selected), fps={:.2}, extended={}",
        positions.n_frames(),
        positions.n_joints(),
        joints.len(),
        fps,
        params.is_extended()
    );

    let dt = 1.0 / fps;
    let win = params.smooth_win;
    let selected = positions.select(joints);

    let leg_scale = if params.use_leg_norm {
        leg_length(positions, rig)
    } else {
        1.0
    };

    let speed = body_speed_trace(&selected, dt, win);
    let decel = cue_deceleration(&speed, dt);
    let pelvis = cue_pelvis_drop(positions, rig.pelvis, dt, win);
    let left_foot = cue_foot_contact(positions, rig.left_foot, dt, win, params.ground_q, leg_scale);
    let right_foot = cue_foot_contact(positions, rig.right_foot, dt, win, params.ground_q, leg_scale);
    let foot = left_foot
        .iter()
        .zip(right_foot.iter())
        .map(|(l, r)| l.max(*r))
        .collect();

    let (accel, reversal) = if params.is_extended() {
        (
            Some(cue_global_accel(&selected, dt, win)),
            Some(cue_reversal(&selected, dt, win)),
        )
    } else {
        (None, None)
    };

    CueSignals {
        decel,
        pelvis,
        foot,
        left_foot,
        right_foot,
        accel,
        reversal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_lengths_match_clip() {
        let traj: Vec<[f64; 3]> = (0..50)
            .map(|t| [0.0, 1.0 + 0.05 * (t as f64 * 0.4).sin(), t as f64 * 0.01])
            .collect();
        let positions = JointPositions::from_trajectories(&[traj.clone(), traj]).unwrap();
        let rig = RigIndices::new(Some(0), Some(1), None);

        let base = extract_cues(&positions, &[], &rig, 30.0, &BeatParams::base());
        assert_eq!(base.len(), 50);
        assert_eq!(base.pelvis.len(), 50);
        assert!(base.right_foot.iter().all(|&v| v == 0.0), "missing foot gives zeros");
        assert_eq!(base.foot, base.left_foot);
        assert!(base.accel.is_none() && base.reversal.is_none());

        let ext = extract_cues(&positions, &[0, 1], &rig, 30.0, &BeatParams::extended());
        assert_eq!(ext.accel.as_ref().map(Vec::len), Some(50));
        assert_eq!(ext.reversal.as_ref().map(Vec::len), Some(50));
        for cue in [&ext.decel, &ext.pelvis, &ext.foot] {
            assert!(cue.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }
}
