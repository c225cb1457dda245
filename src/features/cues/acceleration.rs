//! Global acceleration cue

use super::speed::{median_across_joints, smoothed_trajectories};
use crate::rig::JointPositions;
use crate::signal::{gradient_vec3, norm3, robust_norm};

/// Global acceleration cue
///
/// Median acceleration magnitude of the smoothed selected joints,
/// normalised to [0, 1]. All zero for fewer than 3 frames.
pub fn cue_global_accel(selected: &JointPositions, dt: f64, smooth_win: usize) -> Vec<f64> {
    let n = selected.n_frames();
    if n < 3 {
        return vec![0.0; n];
    }
    let accel: Vec<Vec<f64>> = smoothed_trajectories(selected, smooth_win)
        .iter()
        .map(|traj| {
            let velocity = gradient_vec3(traj, dt);
            gradient_vec3(&velocity, dt).iter().map(norm3).collect()
        })
        .collect();
    robust_norm(&median_across_joints(&accel, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_in_acceleration() {
        // Constant velocity with a sudden stop at frame 20.
        let traj: Vec<[f64; 3]> = (0..40)
            .map(|t| [if t < 20 { t as f64 * 0.1 } else { 2.0 }, 0.0, 0.0])
            .collect();
        let positions = JointPositions::from_trajectories(&[traj.clone(), traj]).unwrap();
        let cue = cue_global_accel(&positions, 0.1, 1);
        assert!(cue[19] > 0.99 && cue[20] > 0.99, "stop should dominate: {:?}", &cue[17..23]);
        assert!(cue[5] < 1e-6, "constant velocity has no acceleration");
        assert!(cue[30] < 1e-6, "rest has no acceleration");
    }
}
