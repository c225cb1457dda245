//! Numerical time derivatives
//!
//! Central differences in the interior, one-sided differences at the two
//! boundary samples, scaled by the sample spacing `dt`.

use crate::rig::Vec3;

/// Time derivative of a 1D signal
///
/// # Arguments
///
/// * `signal` - Samples over time
/// * `dt` - Time step between samples (e.g. `1 / fps`)
///
/// # Returns
///
/// Derivative, same length as the input. A single sample has derivative 0.
///
/// # Example
///
/// ```
/// use stratum_motion::signal::gradient;
///
/// let d = gradient(&[0.0, 1.0, 4.0], 1.0);
/// assert_eq!(d, vec![1.0, 2.0, 3.0]);
/// ```
pub fn gradient(signal: &[f64], dt: f64) -> Vec<f64> {
    let n = signal.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut out = Vec::with_capacity(n);
            out.push((signal[1] - signal[0]) / dt);
            for i in 1..n - 1 {
                out.push((signal[i + 1] - signal[i - 1]) / (2.0 * dt));
            }
            out.push((signal[n - 1] - signal[n - 2]) / dt);
            out
        }
    }
}

/// Time derivative of a 3D trajectory, per coordinate.
pub fn gradient_vec3(trajectory: &[Vec3], dt: f64) -> Vec<Vec3> {
    let n = trajectory.len();
    if n < 2 {
        return vec![[0.0; 3]; n];
    }

    let diff = |a: &Vec3, b: &Vec3, span: f64| -> Vec3 {
        [
            (a[0] - b[0]) / span,
            (a[1] - b[1]) / span,
            (a[2] - b[2]) / span,
        ]
    };

    let mut out = Vec::with_capacity(n);
    out.push(diff(&trajectory[1], &trajectory[0], dt));
    for i in 1..n - 1 {
        out.push(diff(&trajectory[i + 1], &trajectory[i - 1], 2.0 * dt));
    }
    out.push(diff(&trajectory[n - 1], &trajectory[n - 2], dt));
    out
}

/// Euclidean norm of a 3D vector.
pub fn norm3(v: &Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_linear_signal() {
        let signal: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();
        let d = gradient(&signal, 0.5);
        for v in d {
            assert!((v - 4.0).abs() < 1e-12, "slope should be 4, got {}", v);
        }
    }

    #[test]
    fn test_gradient_short_inputs() {
        assert!(gradient(&[], 1.0).is_empty());
        assert_eq!(gradient(&[3.0], 1.0), vec![0.0]);
        assert_eq!(gradient(&[1.0, 3.0], 1.0), vec![2.0, 2.0]);
    }

    #[test]
    fn test_gradient_vec3() {
        let traj: Vec<Vec3> = (0..5).map(|i| [i as f64, 0.0, -(i as f64)]).collect();
        let v = gradient_vec3(&traj, 1.0);
        assert_eq!(v.len(), 5);
        for p in &v {
            assert!((p[0] - 1.0).abs() < 1e-12);
            assert!(p[1].abs() < 1e-12);
            assert!((p[2] + 1.0).abs() < 1e-12);
        }
        assert_eq!(gradient_vec3(&traj[..1], 1.0), vec![[0.0; 3]]);
    }

    #[test]
    fn test_norm3() {
        assert!((norm3(&[3.0, 4.0, 0.0]) - 5.0).abs() < 1e-12);
    }
}
