//! Moving-average smoothing
//!
//! Centered box filter with edge padding, so the output has the same length
//! as the input and the first/last samples are not pulled towards zero.

use crate::rig::Vec3;

/// Centered moving average with edge padding
///
/// Each output sample is the mean of `window` input samples centred on it;
/// samples beyond either end repeat the nearest edge value. A window of 1
/// (or 0, which is treated as 1) is the identity. For even windows the
/// extra sample is taken from the left-hand side.
///
/// # Arguments
///
/// * `signal` - Input samples
/// * `window` - Window size in samples
///
/// # Returns
///
/// Smoothed signal, same length as the input
///
/// # Example
///
/// ```
/// use stratum_motion::signal::moving_average;
///
/// let smoothed = moving_average(&[0.0, 0.0, 3.0, 0.0, 0.0], 3);
/// assert_eq!(smoothed, vec![0.0, 1.0, 1.0, 1.0, 0.0]);
/// ```
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let n = signal.len();
    if window == 1 || n == 0 {
        return signal.to_vec();
    }

    let pad = window / 2;
    let padded: Vec<f64> = (0..n + 2 * pad)
        .map(|i| signal[i.saturating_sub(pad).min(n - 1)])
        .collect();

    // Running sum over the padded signal
    let scale = 1.0 / window as f64;
    let mut out = Vec::with_capacity(n);
    let mut acc: f64 = padded[..window].iter().sum();
    out.push(acc * scale);
    for i in 1..n {
        acc += padded[i + window - 1] - padded[i - 1];
        out.push(acc * scale);
    }
    out
}

/// Apply [`moving_average`] to each coordinate of a 3D trajectory.
pub fn moving_average_vec3(trajectory: &[Vec3], window: usize) -> Vec<Vec3> {
    let axes: Vec<Vec<f64>> = (0..3)
        .map(|axis| {
            let component: Vec<f64> = trajectory.iter().map(|p| p[axis]).collect();
            moving_average(&component, window)
        })
        .collect();

    (0..trajectory.len())
        .map(|t| [axes[0][t], axes[1][t], axes[2][t]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_one_is_identity() {
        let signal = vec![1.0, -2.0, 3.5, 0.25];
        assert_eq!(moving_average(&signal, 1), signal);
        assert_eq!(moving_average(&signal, 0), signal);
    }

    #[test]
    fn test_edge_padding_keeps_constant_signal() {
        let signal = vec![2.0; 10];
        let smoothed = moving_average(&signal, 5);
        assert_eq!(smoothed.len(), 10);
        for v in smoothed {
            assert!((v - 2.0).abs() < 1e-12, "constant signal must stay constant");
        }
    }

    #[test]
    fn test_centered_window() {
        let smoothed = moving_average(&[0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0], 5);
        // Impulse spreads evenly over frames 1..=5
        assert!((smoothed[0] - 0.0).abs() < 1e-12);
        for v in &smoothed[1..6] {
            assert!((v - 1.0).abs() < 1e-12);
        }
        assert!((smoothed[6] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_even_window_keeps_length() {
        let smoothed = moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(smoothed, vec![1.0, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_window_longer_than_signal() {
        let smoothed = moving_average(&[1.0, 3.0], 7);
        assert_eq!(smoothed.len(), 2);
        assert!(smoothed.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_vec3_smoothing_per_axis() {
        let traj = vec![[0.0, 1.0, 2.0], [3.0, 1.0, 2.0], [0.0, 1.0, 2.0]];
        let smoothed = moving_average_vec3(&traj, 3);
        assert_eq!(smoothed.len(), 3);
        assert!((smoothed[1][0] - 1.0).abs() < 1e-12);
        assert!((smoothed[1][1] - 1.0).abs() < 1e-12);
        assert!((smoothed[1][2] - 2.0).abs() < 1e-12);
    }
}
