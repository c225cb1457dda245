//! Resolved skeleton
//!
//! Output of forward kinematics: every joint carries its per-frame local
//! rotation angles, global transforms and absolute positions.

use super::{Axis, JointPositions, MotionStream, Vec3};
use crate::error::Result;
use crate::kinematics::Mat4;
use serde::{Deserialize, Serialize};

/// One resolved joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Joint name (end sites are named `<parent>_End` by the reader)
    pub name: String,

    /// Index of this joint in [`Skeleton::joints`]
    pub index: usize,

    /// Parent index, `None` for the root
    pub parent: Option<usize>,

    /// Static offset from the parent
    pub offset: Vec3,

    /// Rotation axes in application order (empty for end sites)
    pub rotation_order: Vec<Axis>,

    /// Per-frame rotation angles in degrees, indexed by axis `[x, y, z]`
    pub rotations: Vec<Vec3>,

    /// Per-frame absolute positions
    pub positions: Vec<Vec3>,

    /// Per-frame global transforms (empty for end sites)
    #[serde(skip)]
    pub transforms: Vec<Mat4>,

    /// Whether this is the hierarchy root
    pub is_root: bool,

    /// Whether this is an end site
    pub is_end_site: bool,
}

/// Skeleton with resolved joint trajectories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    joints: Vec<Joint>,
    frame_time: f64,
    n_frames: usize,
}

impl Skeleton {
    pub(crate) fn new(joints: Vec<Joint>, frame_time: f64, n_frames: usize) -> Self {
        Self {
            joints,
            frame_time,
            n_frames,
        }
    }

    /// Joints in hierarchy order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Joint by index.
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Index of the first joint with the given name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// Root joint.
    pub fn root(&self) -> Option<&Joint> {
        self.joints.iter().find(|j| j.is_root)
    }

    /// Joint names in hierarchy order.
    pub fn names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }

    /// Number of joints, end sites included.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the skeleton has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Number of frames.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// Seconds between frames.
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Frame rate `1 / frame_time`.
    pub fn fps(&self) -> f64 {
        1.0 / self.frame_time
    }

    /// Frame timestamps `k · frame_time`.
    pub fn frame_times(&self) -> Vec<f64> {
        (0..self.n_frames).map(|k| k as f64 * self.frame_time).collect()
    }

    /// Clip duration `(T - 1) · frame_time`.
    pub fn duration(&self) -> f64 {
        self.n_frames.saturating_sub(1) as f64 * self.frame_time
    }

    /// Stack every joint's positions into a `(T, J, 3)` tensor.
    pub fn positions(&self) -> JointPositions {
        let n_joints = self.joints.len();
        let mut data = Vec::with_capacity(self.n_frames * n_joints);
        for t in 0..self.n_frames {
            data.extend(self.joints.iter().map(|j| j.positions[t]));
        }
        // Every joint holds exactly n_frames positions after resolution.
        JointPositions::from_flat_unchecked(self.n_frames, n_joints, data)
    }

    /// Motion stream with a uniform time axis.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidInput` if the skeleton has no frames.
    pub fn stream(&self) -> Result<MotionStream> {
        MotionStream::new(self.positions(), self.frame_times(), self.fps())
    }
}
