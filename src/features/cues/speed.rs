//! Body speed and actor scale
//!
//! The per-frame median speed of a joint subset is the basis of the
//! deceleration and reversal cues; the leg length normalises foot height so
//! that cues are comparable across actors.

use crate::rig::{JointPositions, RigIndices, Vec3};
use crate::signal::{gradient_vec3, median, moving_average_vec3, norm3};

/// Smoothed trajectory per joint, `[joint][frame]`.
pub(crate) fn smoothed_trajectories(positions: &JointPositions, smooth_win: usize) -> Vec<Vec<Vec3>> {
    (0..positions.n_joints())
        .map(|j| moving_average_vec3(&positions.trajectory(j), smooth_win))
        .collect()
}

/// Per-frame median over joints of a per-joint series, `[joint][frame]`.
pub(crate) fn median_across_joints(per_joint: &[Vec<f64>], n_frames: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(per_joint.len());
    (0..n_frames)
        .map(|t| {
            row.clear();
            row.extend(per_joint.iter().map(|series| series[t]));
            median(&row)
        })
        .collect()
}

/// Median body speed over time
///
/// Smooths every selected joint, differentiates, and takes the per-frame
/// median of the joint speeds. A single noisy joint cannot dominate the
/// trace.
///
/// # Arguments
///
/// * `selected` - Positions of the joints driving the cue, `(T, J_sel, 3)`
/// * `dt` - Time step in seconds
/// * `smooth_win` - Moving-average window in frames
///
/// # Returns
///
/// Median speed per frame (length `T`)
pub fn body_speed_trace(selected: &JointPositions, dt: f64, smooth_win: usize) -> Vec<f64> {
    let smoothed = smoothed_trajectories(selected, smooth_win);
    let speeds: Vec<Vec<f64>> = smoothed
        .iter()
        .map(|traj| gradient_vec3(traj, dt).iter().map(norm3).collect())
        .collect();
    median_across_joints(&speeds, selected.n_frames())
}

/// Characteristic leg length
///
/// Median pelvis-to-foot distance over all frames of the available feet,
/// floored at `1e-6`. Returns 1.0 when the pelvis or both feet are missing.
pub fn leg_length(positions: &JointPositions, rig: &RigIndices) -> f64 {
    let pelvis = match rig.pelvis.filter(|&p| p < positions.n_joints()) {
        Some(p) => p,
        None => return 1.0,
    };

    let feet: Vec<usize> = [rig.left_foot, rig.right_foot]
        .iter()
        .flatten()
        .copied()
        .filter(|&f| f < positions.n_joints())
        .collect();
    if feet.is_empty() {
        return 1.0;
    }

    let mut distances = Vec::with_capacity(feet.len() * positions.n_frames());
    for &foot in &feet {
        for t in 0..positions.n_frames() {
            let p = positions.get(t, pelvis);
            let f = positions.get(t, foot);
            distances.push(norm3(&[p[0] - f[0], p[1] - f[1], p[2] - f[2]]));
        }
    }
    if distances.is_empty() {
        return 1.0;
    }
    median(&distances).max(1e-6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_is_median_across_joints() {
        // Joints moving at 1, 2 and 30 units/s along x; median is 2.
        let fps = 10.0;
        let trajectories: Vec<Vec<Vec3>> = [1.0, 2.0, 30.0]
            .iter()
            .map(|v| (0..20).map(|t| [v * t as f64 / fps, 0.0, 0.0]).collect())
            .collect();
        let positions = JointPositions::from_trajectories(&trajectories).unwrap();
        let speed = body_speed_trace(&positions, 1.0 / fps, 1);
        assert_eq!(speed.len(), 20);
        for s in &speed {
            assert!((s - 2.0).abs() < 1e-9, "expected median speed 2.0, got {}", s);
        }
    }

    #[test]
    fn test_leg_length() {
        let positions = JointPositions::from_trajectories(&[
            vec![[0.0, 1.0, 0.0]; 4],
            vec![[0.0, 0.1, 0.0]; 4],
            vec![[0.0, 0.2, 0.0]; 4],
        ])
        .unwrap();
        let rig = RigIndices::new(Some(0), Some(1), Some(2));
        assert!((leg_length(&positions, &rig) - 0.85).abs() < 1e-9);

        assert_eq!(leg_length(&positions, &RigIndices::new(None, Some(1), None)), 1.0);
        assert_eq!(leg_length(&positions, &RigIndices::new(Some(0), None, Some(9))), 1.0);

        let collapsed = JointPositions::from_trajectories(&[vec![[0.0; 3]; 2], vec![[0.0; 3]; 2]]).unwrap();
        assert_eq!(leg_length(&collapsed, &RigIndices::new(Some(0), Some(1), None)), 1e-6);
    }
}
