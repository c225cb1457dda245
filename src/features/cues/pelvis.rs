//! Pelvis drop cue
//!
//! Fires at the low point of the pelvis bounce, weighted by how hard the
//! pelvis starts accelerating back up.

use crate::rig::JointPositions;
use crate::signal::{gradient, local_minima, moving_average_vec3, robust_norm};

/// Pelvis drop cue
///
/// `robust_norm(minima(y) · max(0, d²y/dt²))` on the smoothed pelvis height.
///
/// # Arguments
///
/// * `positions` - All joint positions
/// * `pelvis` - Pelvis joint index; missing or out of range gives a zero cue
/// * `dt` - Time step in seconds
/// * `smooth_win` - Moving-average window in frames
pub fn cue_pelvis_drop(
    positions: &JointPositions,
    pelvis: Option<usize>,
    dt: f64,
    smooth_win: usize,
) -> Vec<f64> {
    let n = positions.n_frames();
    let pelvis = match pelvis {
        Some(p) if p < positions.n_joints() && n >= 3 => p,
        _ => return vec![0.0; n],
    };

    let smoothed = moving_average_vec3(&positions.trajectory(pelvis), smooth_win);
    let y: Vec<f64> = smoothed.iter().map(|p| p[1]).collect();
    let ay = gradient(&gradient(&y, dt), dt);
    let minima = local_minima(&y);

    let raw: Vec<f64> = minima
        .iter()
        .zip(ay.iter())
        .map(|(&is_min, &a)| if is_min { a.max(0.0) } else { 0.0 })
        .collect();
    robust_norm(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bouncing_pelvis(n: usize, period: usize) -> JointPositions {
        let traj = (0..n)
            .map(|t| {
                let phase = 2.0 * std::f64::consts::PI * t as f64 / period as f64;
                [0.0, 1.0 + 0.05 * phase.cos(), 0.0]
            })
            .collect();
        JointPositions::from_trajectories(&[traj]).unwrap()
    }

    #[test]
    fn test_peaks_at_bounce_bottoms() {
        let positions = bouncing_pelvis(60, 20);
        let cue = cue_pelvis_drop(&positions, Some(0), 1.0 / 30.0, 1);
        let peaks: Vec<usize> = (0..cue.len()).filter(|&i| cue[i] > 0.5).collect();
        assert_eq!(peaks, vec![10, 30, 50], "bounce bottoms of a cosine at period 20");
    }

    #[test]
    fn test_missing_pelvis_is_zero() {
        let positions = bouncing_pelvis(30, 10);
        assert!(cue_pelvis_drop(&positions, None, 0.1, 3).iter().all(|&v| v == 0.0));
        assert!(cue_pelvis_drop(&positions, Some(4), 0.1, 3).iter().all(|&v| v == 0.0));
        assert_eq!(cue_pelvis_drop(&bouncing_pelvis(2, 10), Some(0), 0.1, 1), vec![0.0, 0.0]);
    }
}
