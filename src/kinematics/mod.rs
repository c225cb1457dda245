//! Forward kinematics
//!
//! Resolves a [`Hierarchy`] and its raw channel values into a [`Skeleton`]
//! holding absolute joint positions for every frame.
//!
//! Per frame and joint, in hierarchy order:
//! - local rotation `R = R[o0] · R[o1] · R[o2]` in channel order (degrees)
//! - local transform `T(offset + translation) · R` (translation only when the
//!   joint has position channels)
//! - global transform `parent_global · local` (the root uses its local)
//! - end sites take `parent_global · T(offset)` and carry no rotation

pub mod transform;

pub use transform::Mat4;

use crate::error::{MotionError, Result};
use crate::rig::{Channel, Hierarchy, Joint, MotionData, Skeleton, Vec3};

/// Resolve joint trajectories by forward kinematics
///
/// # Arguments
///
/// * `hierarchy` - Joint definitions in parent-before-child order
/// * `motion` - Frame time and flattened channel values
///
/// # Returns
///
/// Skeleton whose joints carry per-frame rotations, global transforms and
/// absolute positions
///
/// # Errors
///
/// - `MotionError::Topology` / `MotionError::Channels` if the hierarchy is invalid
/// - `MotionError::Motion` if the frame time is not positive, the channel
///   count is zero, the value count is not divisible by the channel count or
///   no complete frame is present
///
/// A header frame count that disagrees with the data is not an error: the
/// count recovered from the data wins and a warning is logged.
///
/// # Example
///
/// ```no_run
/// use stratum_motion::io::parse_bvh;
/// use stratum_motion::kinematics::resolve;
///
/// let text = std::fs::read_to_string("clip.bvh")?;
/// let (hierarchy, motion) = parse_bvh(&text)?;
/// let skeleton = resolve(&hierarchy, &motion)?;
/// println!("{} joints, {} frames", skeleton.len(), skeleton.n_frames());
/// # Ok::<(), stratum_motion::MotionError>(())
/// ```
pub fn resolve(hierarchy: &Hierarchy, motion: &MotionData) -> Result<Skeleton> {
    log::debug!(
        "Resolving kinematics: {} joints, {} values, frame_time={}",
        hierarchy.len(),
        motion.values.len(),
        motion.frame_time
    );

    hierarchy.validate()?;

    if !(motion.frame_time.is_finite() && motion.frame_time > 0.0) {
        return Err(MotionError::motion(format!(
            "frame time must be > 0, got {}",
            motion.frame_time
        )));
    }

    let n_channels = hierarchy.channel_count();
    if n_channels == 0 {
        return Err(MotionError::motion("hierarchy declares no channels"));
    }
    if motion.values.len() % n_channels != 0 {
        return Err(MotionError::motion(format!(
            "{} motion values are not divisible by {} channels",
            motion.values.len(),
            n_channels
        )));
    }
    let n_frames = motion.values.len() / n_channels;
    if n_frames == 0 {
        return Err(MotionError::motion("no motion frames"));
    }
    if n_frames != motion.declared_frames {
        log::warn!(
            "Header declares {} frames but data holds {}; using {}",
            motion.declared_frames,
            n_frames,
            n_frames
        );
    }

    let defs = hierarchy.joints();
    let mut joints: Vec<Joint> = Vec::with_capacity(defs.len());
    let mut channel_start = 0usize;

    for (index, def) in defs.iter().enumerate() {
        let n_ch = def.channels.len();
        let rotation_order = def.rotation_order();
        let mut rotations: Vec<Vec3> = Vec::with_capacity(if def.is_end_site { 0 } else { n_frames });
        let mut transforms: Vec<Mat4> = Vec::with_capacity(if def.is_end_site { 0 } else { n_frames });
        let mut positions: Vec<Vec3> = Vec::with_capacity(n_frames);

        for t in 0..n_frames {
            let parent_global = match def.parent {
                Some(p) => Some(joints.get(p).and_then(|pj| pj.transforms.get(t)).ok_or_else(
                    || MotionError::topology(&def.name, format!("parent {} is not resolved", p)),
                )?),
                None => None,
            };

            if def.is_end_site {
                let local = transform::translation(def.offset);
                let global = match parent_global {
                    Some(pg) => transform::mul(pg, &local),
                    None => local,
                };
                positions.push(transform::origin(&global));
                continue;
            }

            let frame = &motion.values[t * n_channels + channel_start..t * n_channels + channel_start + n_ch];
            let mut translation = [0.0; 3];
            let mut angles = [0.0; 3];
            for (channel, &value) in def.channels.iter().zip(frame.iter()) {
                match channel {
                    Channel::Position(axis) => translation[axis.index()] = value,
                    Channel::Rotation(axis) => angles[axis.index()] = value,
                }
            }

            let rot = transform::rotation_from_channels(angles, &rotation_order);
            let offset = if def.has_translation() {
                add3(def.offset, translation)
            } else {
                def.offset
            };
            let local = transform::local_transform(offset, &rot);
            let global = match parent_global {
                Some(pg) => transform::mul(pg, &local),
                None => local,
            };

            rotations.push(angles);
            positions.push(transform::origin(&global));
            transforms.push(global);
        }

        channel_start += n_ch;
        joints.push(Joint {
            name: def.name.clone(),
            index,
            parent: def.parent,
            offset: def.offset,
            rotation_order,
            rotations,
            positions,
            transforms,
            is_root: def.parent.is_none(),
            is_end_site: def.is_end_site,
        });
    }

    log::debug!("Resolved {} joints over {} frames", joints.len(), n_frames);
    Ok(Skeleton::new(joints, motion.frame_time, n_frames))
}

fn add3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}
