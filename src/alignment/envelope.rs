//! Time-stamped envelopes
//!
//! Both sides of the alignment are 1D curves on their own, possibly
//! non-uniform, time axes: the audio onset strength produced by an external
//! audio analysis, and the motion energy computed here from joint speeds.

use crate::error::{MotionError, Result};
use crate::features::cues::speed::median_across_joints;
use crate::rig::MotionStream;
use crate::signal::{gradient_vec3, median, norm3};
use serde::{Deserialize, Serialize};

/// A 1D signal sampled at strictly increasing times (seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl Envelope {
    /// Build an envelope from explicit sample times.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidInput` if the lengths differ, a value is
    /// not finite, or the times are not finite and strictly increasing.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(MotionError::invalid_input(format!(
                "{} envelope times for {} values",
                times.len(),
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MotionError::invalid_input("envelope values must be finite"));
        }
        if times.iter().any(|t| !t.is_finite()) || times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MotionError::invalid_input(
                "envelope times must be finite and strictly increasing",
            ));
        }
        Ok(Self { times, values })
    }

    /// Build an envelope sampled at a constant rate starting at t = 0
    ///
    /// An onset curve computed with hop `h` at sample rate `sr` has
    /// `rate_hz = sr / h`.
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_motion::alignment::Envelope;
    ///
    /// let env = Envelope::uniform(vec![0.0, 1.0, 0.5], 100.0).unwrap();
    /// assert_eq!(env.times(), &[0.0, 0.01, 0.02]);
    /// ```
    pub fn uniform(values: Vec<f64>, rate_hz: f64) -> Result<Self> {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            return Err(MotionError::invalid_input(format!(
                "envelope rate must be > 0, got {}",
                rate_hz
            )));
        }
        let times = (0..values.len()).map(|k| k as f64 / rate_hz).collect();
        Self::new(times, values)
    }

    /// Sample times in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the envelope holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First and last sample time, `None` when empty.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Same time axis with different values (lengths must match).
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.times.len());
        Self {
            times: self.times.clone(),
            values,
        }
    }

    /// Linear interpolation at `t`
    ///
    /// Times before the first or after the last sample take the end values;
    /// an empty envelope evaluates to 0.
    pub fn interp(&self, t: f64) -> f64 {
        let n = self.times.len();
        if n == 0 {
            return 0.0;
        }
        if t <= self.times[0] {
            return self.values[0];
        }
        if t >= self.times[n - 1] {
            return self.values[n - 1];
        }
        // First index with times[i] > t; 1 <= i <= n - 1 here.
        let i = self.times.partition_point(|&x| x <= t);
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.values[i - 1], self.values[i]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }
}

/// Motion energy envelope
///
/// Per-joint speed from central differences of the raw positions, reduced
/// to its per-frame median over joints. The time step is the median spacing
/// of the stream's frame times; no smoothing is applied.
///
/// # Returns
///
/// Envelope on the stream's frame times, all zeros for clips shorter than two
/// frames
pub fn motion_envelope(stream: &MotionStream) -> Envelope {
    let positions = stream.positions();
    let times = stream.frame_times().to_vec();
    let n = positions.n_frames();
    if n < 2 {
        return Envelope {
            times,
            values: vec![0.0; n],
        };
    }

    let steps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
    let dt = median(&steps);
    log::debug!("Motion envelope: {} frames, {} joints, dt={:.5}s", n, positions.n_joints(), dt);

    let speeds: Vec<Vec<f64>> = (0..positions.n_joints())
        .map(|j| gradient_vec3(&positions.trajectory(j), dt).iter().map(norm3).collect())
        .collect();

    Envelope {
        times,
        values: median_across_joints(&speeds, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::JointPositions;

    #[test]
    fn test_new_rejects_bad_axes() {
        assert!(Envelope::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(Envelope::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(Envelope::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).is_err());
        assert!(Envelope::uniform(vec![1.0], 0.0).is_err());
        assert!(Envelope::new(vec![], vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_interp_clamps_at_edges() {
        let env = Envelope::new(vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 6.0]).unwrap();
        assert_eq!(env.interp(-1.0), 0.0);
        assert_eq!(env.interp(0.5), 1.0);
        assert_eq!(env.interp(1.0), 2.0);
        assert_eq!(env.interp(2.0), 4.0);
        assert_eq!(env.interp(10.0), 6.0);
        assert_eq!(Envelope::default().interp(1.0), 0.0);
    }

    #[test]
    fn test_motion_envelope_constant_speed() {
        // Two joints moving at 2 and 4 units/s along x: median = 3
        let a: Vec<[f64; 3]> = (0..20).map(|t| [2.0 * t as f64 / 10.0, 0.0, 0.0]).collect();
        let b: Vec<[f64; 3]> = (0..20).map(|t| [4.0 * t as f64 / 10.0, 1.0, 0.0]).collect();
        let positions = JointPositions::from_trajectories(&[a, b]).unwrap();
        let stream = MotionStream::uniform(positions, 10.0).unwrap();

        let env = motion_envelope(&stream);
        assert_eq!(env.len(), 20);
        assert_eq!(env.times(), stream.frame_times());
        for v in env.values() {
            assert!((v - 3.0).abs() < 1e-9, "expected 3.0, got {}", v);
        }
    }

    #[test]
    fn test_motion_envelope_single_frame() {
        let positions = JointPositions::from_trajectories(&[vec![[1.0, 2.0, 3.0]]]).unwrap();
        let stream = MotionStream::uniform(positions, 30.0).unwrap();
        let env = motion_envelope(&stream);
        assert_eq!(env.values(), &[0.0]);
    }
}
