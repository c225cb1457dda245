//! Dense motion tensors
//!
//! [`JointPositions`] is the canonical `(T, J, 3)` array of joint positions,
//! stored frame-major. [`MotionStream`] adds the time axis.

use super::Vec3;
use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};

/// Joint positions over time, `(T, J, 3)` frame-major
///
/// `T = 0` is allowed as a degenerate input; consumers return empty results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointPositions {
    n_frames: usize,
    n_joints: usize,
    data: Vec<Vec3>,
}

impl JointPositions {
    /// Wrap a flat frame-major buffer.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidInput` if `data.len() != n_frames * n_joints`.
    pub fn new(n_frames: usize, n_joints: usize, data: Vec<Vec3>) -> Result<Self> {
        if data.len() != n_frames * n_joints {
            return Err(MotionError::invalid_input(format!(
                "position buffer has {} entries, expected {} frames x {} joints",
                data.len(),
                n_frames,
                n_joints
            )));
        }
        Ok(Self {
            n_frames,
            n_joints,
            data,
        })
    }

    pub(crate) fn from_flat_unchecked(n_frames: usize, n_joints: usize, data: Vec<Vec3>) -> Self {
        debug_assert_eq!(data.len(), n_frames * n_joints);
        Self {
            n_frames,
            n_joints,
            data,
        }
    }

    /// Build from one trajectory per joint (all of equal length).
    pub fn from_trajectories(trajectories: &[Vec<Vec3>]) -> Result<Self> {
        let n_joints = trajectories.len();
        let n_frames = trajectories.first().map_or(0, |t| t.len());
        if let Some((j, t)) = trajectories
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() != n_frames)
        {
            return Err(MotionError::invalid_input(format!(
                "joint {} has {} frames, expected {}",
                j,
                t.len(),
                n_frames
            )));
        }

        let mut data = Vec::with_capacity(n_frames * n_joints);
        for t in 0..n_frames {
            for trajectory in trajectories {
                data.push(trajectory[t]);
            }
        }
        Ok(Self {
            n_frames,
            n_joints,
            data,
        })
    }

    /// Number of frames `T`.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Number of joints `J`.
    pub fn n_joints(&self) -> usize {
        self.n_joints
    }

    /// Whether the tensor holds no frames.
    pub fn is_empty(&self) -> bool {
        self.n_frames == 0
    }

    /// Position of joint `joint` at frame `frame`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, frame: usize, joint: usize) -> Vec3 {
        assert!(joint < self.n_joints, "joint index out of range");
        self.data[frame * self.n_joints + joint]
    }

    /// All joints of one frame.
    pub fn frame(&self, frame: usize) -> &[Vec3] {
        let start = frame * self.n_joints;
        &self.data[start..start + self.n_joints]
    }

    /// Whether `joint` indexes an existing joint.
    pub fn is_valid_joint(&self, joint: Option<usize>) -> bool {
        matches!(joint, Some(j) if j < self.n_joints)
    }

    /// Trajectory of a single joint over all frames.
    pub fn trajectory(&self, joint: usize) -> Vec<Vec3> {
        (0..self.n_frames).map(|t| self.get(t, joint)).collect()
    }

    /// One coordinate axis of a joint's trajectory (`axis` 0..3).
    pub fn axis_trace(&self, joint: usize, axis: usize) -> Vec<f64> {
        (0..self.n_frames).map(|t| self.get(t, joint)[axis]).collect()
    }

    /// Keep only the given joints, in the given order.
    ///
    /// Out-of-range indices are dropped; if none survive, all joints are kept.
    pub fn select(&self, joints: &[usize]) -> JointPositions {
        let valid: Vec<usize> = joints.iter().copied().filter(|&j| j < self.n_joints).collect();
        if valid.is_empty() {
            return self.clone();
        }

        let mut data = Vec::with_capacity(self.n_frames * valid.len());
        for t in 0..self.n_frames {
            let row = self.frame(t);
            data.extend(valid.iter().map(|&j| row[j]));
        }
        JointPositions {
            n_frames: self.n_frames,
            n_joints: valid.len(),
            data,
        }
    }

    /// Apply a function to every position.
    pub fn map(&self, f: impl Fn(Vec3) -> Vec3) -> JointPositions {
        JointPositions {
            n_frames: self.n_frames,
            n_joints: self.n_joints,
            data: self.data.iter().map(|&p| f(p)).collect(),
        }
    }

    /// Flat frame-major buffer.
    pub fn as_slice(&self) -> &[Vec3] {
        &self.data
    }
}

/// Joint positions with their time axis
///
/// Constructed through [`MotionStream::new`] or [`MotionStream::uniform`],
/// which guarantee `T >= 1`, strictly increasing frame times and `fps > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionStream {
    positions: JointPositions,
    frame_times: Vec<f64>,
    fps: f64,
}

impl MotionStream {
    /// Build a stream from explicit frame times.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidInput` if the stream is empty, the number
    /// of frame times differs from `T`, the times are not strictly increasing
    /// or `fps` is not a positive finite number.
    pub fn new(positions: JointPositions, frame_times: Vec<f64>, fps: f64) -> Result<Self> {
        if positions.n_frames() == 0 {
            return Err(MotionError::invalid_input("motion stream has no frames"));
        }
        if frame_times.len() != positions.n_frames() {
            return Err(MotionError::invalid_input(format!(
                "{} frame times for {} frames",
                frame_times.len(),
                positions.n_frames()
            )));
        }
        if !(fps.is_finite() && fps > 0.0) {
            return Err(MotionError::invalid_input(format!("fps must be > 0, got {}", fps)));
        }
        if frame_times.iter().any(|t| !t.is_finite())
            || frame_times.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(MotionError::invalid_input(
                "frame times must be finite and strictly increasing",
            ));
        }
        Ok(Self {
            positions,
            frame_times,
            fps,
        })
    }

    /// Build a stream sampled uniformly at `fps`, starting at t = 0.
    pub fn uniform(positions: JointPositions, fps: f64) -> Result<Self> {
        let frame_times = (0..positions.n_frames()).map(|k| k as f64 / fps).collect();
        Self::new(positions, frame_times, fps)
    }

    /// Joint positions.
    pub fn positions(&self) -> &JointPositions {
        &self.positions
    }

    /// Frame timestamps in seconds.
    pub fn frame_times(&self) -> &[f64] {
        &self.frame_times
    }

    /// Frame rate in Hz.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Number of frames.
    pub fn n_frames(&self) -> usize {
        self.positions.n_frames()
    }

    /// Clip duration `(T - 1) / fps` in seconds.
    pub fn duration(&self) -> f64 {
        (self.n_frames().saturating_sub(1)) as f64 / self.fps
    }

    /// Replace the positions (e.g. after reorientation), keeping the time axis.
    pub fn with_positions(&self, positions: JointPositions) -> Result<Self> {
        Self::new(positions, self.frame_times.clone(), self.fps)
    }
}
