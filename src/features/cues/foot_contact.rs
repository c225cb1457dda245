//! Foot contact cue
//!
//! Heel-strike detector: high when the foot is low above the ground, barely
//! sliding horizontally, and moving strongly in the vertical direction.

use crate::rig::JointPositions;
use crate::signal::{gradient, gradient_vec3, local_minima, moving_average_vec3, norm3, percentile, robust_norm};

/// Ground height estimate: the `q` quantile (0..1) of a height trace.
pub fn estimate_ground_level(heights: &[f64], q: f64) -> f64 {
    if heights.is_empty() {
        return 0.0;
    }
    percentile(heights, q * 100.0)
}

/// Foot contact cue for one foot
///
/// With `h`, `s`, `v` the [0, 1]-normalised height above ground (in leg
/// lengths), horizontal speed and vertical speed of the smoothed foot:
///
/// `robust_norm((1 - h) · (1 - s) · v · (1 + 0.3 · minima(h)))`
///
/// # Arguments
///
/// * `positions` - All joint positions
/// * `foot` - Foot joint index; missing or out of range gives a zero cue
/// * `dt` - Time step in seconds
/// * `smooth_win` - Moving-average window in frames
/// * `ground_q` - Quantile of foot height taken as the ground (0..1)
/// * `leg_scale` - Leg length used to normalise height (floored at 1e-6)
pub fn cue_foot_contact(
    positions: &JointPositions,
    foot: Option<usize>,
    dt: f64,
    smooth_win: usize,
    ground_q: f64,
    leg_scale: f64,
) -> Vec<f64> {
    let n = positions.n_frames();
    let foot = match foot {
        Some(f) if f < positions.n_joints() && n >= 3 => f,
        _ => return vec![0.0; n],
    };

    let smoothed = moving_average_vec3(&positions.trajectory(foot), smooth_win);
    let y: Vec<f64> = smoothed.iter().map(|p| p[1]).collect();
    let horizontal: Vec<[f64; 3]> = smoothed.iter().map(|p| [p[0], 0.0, p[2]]).collect();

    let ground = estimate_ground_level(&y, ground_q);
    let scale = leg_scale.max(1e-6);
    let y_rel: Vec<f64> = y.iter().map(|&v| (v - ground).max(0.0) / scale).collect();

    let speed: Vec<f64> = gradient_vec3(&horizontal, dt).iter().map(norm3).collect();
    let vy_abs: Vec<f64> = gradient(&y_rel, dt).iter().map(|v| v.abs()).collect();

    let h_norm = robust_norm(&y_rel);
    let s_norm = robust_norm(&speed);
    let v_norm = robust_norm(&vy_abs);
    let minima = local_minima(&y_rel);

    let raw: Vec<f64> = (0..n)
        .map(|t| {
            let bonus = if minima[t] { 1.3 } else { 1.0 };
            (1.0 - h_norm[t]) * (1.0 - s_norm[t]) * v_norm[t] * bonus
        })
        .collect();
    robust_norm(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_level_quantile() {
        let heights: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
        assert!((estimate_ground_level(&heights, 0.05) - 0.05).abs() < 1e-12);
        assert_eq!(estimate_ground_level(&[], 0.05), 0.0);
    }

    #[test]
    fn test_gait_contacts_are_periodic() {
        // Foot lifts in a half-sine arc every 15 frames while moving forward,
        // then rests planted on the ground.
        let n = 60;
        let traj: Vec<[f64; 3]> = (0..n)
            .map(|t| {
                let phase = t % 15;
                let lift = if phase < 8 {
                    (std::f64::consts::PI * phase as f64 / 8.0).sin() * 0.15
                } else {
                    0.0
                };
                let x = (t / 15) as f64 * 0.4 + if phase < 8 { 0.4 * phase as f64 / 8.0 } else { 0.4 };
                [x, lift, 0.0]
            })
            .collect();
        let positions = JointPositions::from_trajectories(&[traj]).unwrap();
        let cue = cue_foot_contact(&positions, Some(0), 1.0 / 30.0, 1, 0.05, 1.0);

        assert_eq!(cue.len(), n);
        assert!(cue.iter().all(|&v| (0.0..=1.0).contains(&v)));

        let peak_in = |lo: usize, hi: usize| (lo..hi).max_by(|&a, &b| cue[a].total_cmp(&cue[b])).unwrap();
        let peaks: Vec<usize> = (0..4).map(|k| peak_in(k * 15 + 2, k * 15 + 15)).collect();
        for pair in peaks.windows(2) {
            assert_eq!(pair[1] - pair[0], 15, "contacts should repeat every step: {:?}", peaks);
        }
    }

    #[test]
    fn test_invalid_foot_is_zero() {
        let positions = JointPositions::from_trajectories(&[vec![[0.0, 1.0, 0.0]; 10]]).unwrap();
        assert!(cue_foot_contact(&positions, None, 0.1, 3, 0.05, 1.0).iter().all(|&v| v == 0.0));
        assert!(cue_foot_contact(&positions, Some(3), 0.1, 3, 0.05, 1.0).iter().all(|&v| v == 0.0));
        assert!(cue_foot_contact(&positions, Some(0), 0.1, 3, 0.05, 1.0).iter().all(|&v| v == 0.0), "static foot gives no contacts");
    }
}
