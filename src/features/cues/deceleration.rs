//! Deceleration cue
//!
//! High where the body speed reaches a valley while still slowing down,
//! which is where a step or hit "lands".

use crate::signal::{gradient, local_minima, robust_norm};

/// Deceleration cue from a body speed trace
///
/// `robust_norm(minima(speed) · max(0, -d speed / dt))`
///
/// # Arguments
///
/// * `speed` - Median body speed per frame (see [`super::body_speed_trace`])
/// * `dt` - Time step in seconds
///
/// # Returns
///
/// Cue in [0, 1], all zero for fewer than 3 frames
pub fn cue_deceleration(speed: &[f64], dt: f64) -> Vec<f64> {
    if speed.len() < 3 {
        return vec![0.0; speed.len()];
    }
    let ds = gradient(speed, dt);
    let minima = local_minima(speed);
    let raw: Vec<f64> = ds
        .iter()
        .zip(minima.iter())
        .map(|(&d, &is_min)| if is_min { (-d).max(0.0) } else { 0.0 })
        .collect();
    robust_norm(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_decelerating_valley() {
        // Valley at frame 3 approached from a higher speed than it leaves.
        let speed = vec![5.0, 4.0, 2.0, 1.0, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0];
        let cue = cue_deceleration(&speed, 0.1);
        assert_eq!(cue.len(), speed.len());
        let (argmax, peak) = cue
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
        assert_eq!(argmax, 3);
        assert!(peak > 0.99, "valley should normalise to 1, got {}", peak);
    }

    #[test]
    fn test_short_input_is_zero() {
        assert_eq!(cue_deceleration(&[1.0, 0.0], 0.1), vec![0.0, 0.0]);
        assert!(cue_deceleration(&[], 0.1).is_empty());
    }
}
