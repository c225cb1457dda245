//! Rig model
//!
//! Joint hierarchy definitions as read from a capture file, the resolved
//! skeleton produced by forward kinematics, and the dense `(T, J, 3)` motion
//! stream consumed by the cue extractors.
//!
//! Joints live in an arena (`Vec`) and refer to their parent by index, so the
//! hierarchy carries no ownership cycles.

pub mod indices;
pub mod skeleton;
pub mod stream;

pub use indices::{auto_rig_indices, reorient, RigIndices, UpAxis};
pub use skeleton::{Joint, Skeleton};
pub use stream::{JointPositions, MotionStream};

use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};

/// 3D vector `[x, y, z]`
pub type Vec3 = [f64; 3];

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// Component index (x = 0, y = 1, z = 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Parse the leading axis letter of a channel label (`X`, `y`, ...).
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }
}

/// One animation channel of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Translation along an axis
    Position(Axis),
    /// Rotation about an axis, in degrees
    Rotation(Axis),
}

/// Joint as declared in a hierarchy, before kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDef {
    /// Joint name
    pub name: String,

    /// Parent index, `None` for the root
    pub parent: Option<usize>,

    /// Static offset from the parent
    pub offset: Vec3,

    /// Channels in the order their values appear in each frame
    pub channels: Vec<Channel>,

    /// End sites carry no channels and are leaves
    pub is_end_site: bool,
}

impl JointDef {
    /// Root joint.
    pub fn root(name: impl Into<String>, offset: Vec3, channels: Vec<Channel>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            offset,
            channels,
            is_end_site: false,
        }
    }

    /// Inner joint attached to `parent`.
    pub fn joint(name: impl Into<String>, parent: usize, offset: Vec3, channels: Vec<Channel>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            offset,
            channels,
            is_end_site: false,
        }
    }

    /// End site attached to `parent`.
    pub fn end_site(name: impl Into<String>, parent: usize, offset: Vec3) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            offset,
            channels: Vec::new(),
            is_end_site: true,
        }
    }

    /// Rotation axes in the order their channels are listed.
    ///
    /// This is also the order in which elementary rotations are multiplied.
    pub fn rotation_order(&self) -> Vec<Axis> {
        self.channels
            .iter()
            .filter_map(|c| match c {
                Channel::Rotation(axis) => Some(*axis),
                Channel::Position(_) => None,
            })
            .collect()
    }

    /// Whether any translation channel is present.
    pub fn has_translation(&self) -> bool {
        self.channels.iter().any(|c| matches!(c, Channel::Position(_)))
    }

    /// Check the channel layout (3 rotations, optionally 3 translations,
    /// each an XYZ permutation). End sites must have no channels.
    pub fn validate_channels(&self) -> Result<()> {
        if self.is_end_site {
            if !self.channels.is_empty() {
                return Err(MotionError::channels(&self.name, "end site must not have channels"));
            }
            return Ok(());
        }

        let n = self.channels.len();
        if n != 3 && n != 6 {
            return Err(MotionError::channels(
                &self.name,
                format!("expected 3 or 6 channels, got {}", n),
            ));
        }

        let rotations = self.rotation_order();
        if !is_permutation(&rotations) {
            return Err(MotionError::channels(
                &self.name,
                format!("rotation order {:?} is not a permutation of X, Y, Z", rotations),
            ));
        }

        if n == 6 {
            let positions: Vec<Axis> = self
                .channels
                .iter()
                .filter_map(|c| match c {
                    Channel::Position(axis) => Some(*axis),
                    Channel::Rotation(_) => None,
                })
                .collect();
            if !is_permutation(&positions) {
                return Err(MotionError::channels(
                    &self.name,
                    format!("position channels {:?} are not a permutation of X, Y, Z", positions),
                ));
            }
        }
        Ok(())
    }
}

fn is_permutation(axes: &[Axis]) -> bool {
    axes.len() == 3
        && [Axis::X, Axis::Y, Axis::Z]
            .iter()
            .all(|a| axes.iter().filter(|b| *b == a).count() == 1)
}

/// Ordered joint hierarchy
///
/// Insertion order is the traversal order of the file; every joint's parent
/// must appear before it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    joints: Vec<JointDef>,
}

impl Hierarchy {
    /// Empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a joint list and validate it.
    pub fn from_joints(joints: Vec<JointDef>) -> Result<Self> {
        let hierarchy = Self { joints };
        hierarchy.validate()?;
        Ok(hierarchy)
    }

    /// Append a joint and return its index.
    pub fn push(&mut self, joint: JointDef) -> usize {
        self.joints.push(joint);
        self.joints.len() - 1
    }

    /// Joints in traversal order.
    pub fn joints(&self) -> &[JointDef] {
        &self.joints
    }

    /// Number of joints (end sites included).
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the hierarchy has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Total number of channels per frame.
    pub fn channel_count(&self) -> usize {
        self.joints.iter().map(|j| j.channels.len()).sum()
    }

    /// Validate topology and channel layouts
    ///
    /// # Errors
    ///
    /// - `MotionError::Topology` when there is no root, more than one root,
    ///   a parent index that is out of range or not earlier in the list, or
    ///   an end site used as a parent
    /// - `MotionError::Channels` for an invalid channel layout
    pub fn validate(&self) -> Result<()> {
        if self.joints.is_empty() {
            return Err(MotionError::topology("<none>", "hierarchy has no joints"));
        }

        let mut root_seen = false;
        for (index, joint) in self.joints.iter().enumerate() {
            match joint.parent {
                None => {
                    if joint.is_end_site {
                        return Err(MotionError::topology(&joint.name, "end site without a parent"));
                    }
                    if root_seen {
                        return Err(MotionError::topology(&joint.name, "more than one root"));
                    }
                    root_seen = true;
                }
                Some(parent) => {
                    if parent >= index {
                        return Err(MotionError::topology(
                            &joint.name,
                            format!(
                                "parent {} is not resolved before joint {} (parent-before-child order required)",
                                parent, index
                            ),
                        ));
                    }
                    if self.joints[parent].is_end_site {
                        return Err(MotionError::topology(&joint.name, "parent is an end site"));
                    }
                }
            }
            joint.validate_channels()?;
        }

        if !root_seen {
            return Err(MotionError::topology(&self.joints[0].name, "hierarchy has no root"));
        }
        Ok(())
    }
}

/// Raw per-frame channel values of a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionData {
    /// Seconds between frames
    pub frame_time: f64,

    /// Frame count announced by the file header
    pub declared_frames: usize,

    /// All channel values, frame-major, in hierarchy channel order
    pub values: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rot_xyz() -> Vec<Channel> {
        vec![
            Channel::Rotation(Axis::Z),
            Channel::Rotation(Axis::X),
            Channel::Rotation(Axis::Y),
        ]
    }

    #[test]
    fn test_rotation_order_preserved() {
        let joint = JointDef::joint("Knee", 0, [0.0, -1.0, 0.0], rot_xyz());
        assert_eq!(joint.rotation_order(), vec![Axis::Z, Axis::X, Axis::Y]);
        assert!(!joint.has_translation());
    }

    #[test]
    fn test_channel_validation() {
        let bad_count = JointDef::joint("Knee", 0, [0.0; 3], rot_xyz()[..2].to_vec());
        assert!(matches!(bad_count.validate_channels(), Err(MotionError::Channels { .. })));

        let repeated = JointDef::joint(
            "Knee",
            0,
            [0.0; 3],
            vec![
                Channel::Rotation(Axis::X),
                Channel::Rotation(Axis::X),
                Channel::Rotation(Axis::Y),
            ],
        );
        assert!(repeated.validate_channels().is_err());
    }

    #[test]
    fn test_topology_validation() {
        let mut channels = vec![
            Channel::Position(Axis::X),
            Channel::Position(Axis::Y),
            Channel::Position(Axis::Z),
        ];
        channels.extend(rot_xyz());

        let ok = Hierarchy::from_joints(vec![
            JointDef::root("Hips", [0.0; 3], channels.clone()),
            JointDef::joint("Spine", 0, [0.0, 1.0, 0.0], rot_xyz()),
            JointDef::end_site("Spine_End", 1, [0.0, 1.0, 0.0]),
        ])
        .unwrap();
        assert_eq!(ok.channel_count(), 9);

        let two_roots = Hierarchy::from_joints(vec![
            JointDef::root("Hips", [0.0; 3], channels.clone()),
            JointDef::root("Other", [0.0; 3], channels.clone()),
        ]);
        assert!(matches!(two_roots, Err(MotionError::Topology { .. })));

        let forward_parent = Hierarchy::from_joints(vec![
            JointDef::root("Hips", [0.0; 3], channels),
            JointDef::joint("Spine", 2, [0.0; 3], rot_xyz()),
            JointDef::joint("Chest", 0, [0.0; 3], rot_xyz()),
        ]);
        assert!(forward_parent.is_err(), "child before parent must be rejected");

        assert!(Hierarchy::new().validate().is_err());
    }
}
