//! Rig landmarks and orientation
//!
//! Picks the pelvis and feet used by the pelvis-drop, foot-contact and
//! leg-length computations, and brings clips into a Y-up frame.

use super::{JointPositions, Skeleton};
use crate::error::MotionError;
use crate::signal::median;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Indices of the landmark joints, any of which may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigIndices {
    /// Pelvis (or hips) joint
    pub pelvis: Option<usize>,
    /// Left foot joint
    pub left_foot: Option<usize>,
    /// Right foot joint
    pub right_foot: Option<usize>,
}

impl RigIndices {
    /// Landmarks given explicitly.
    pub fn new(pelvis: Option<usize>, left_foot: Option<usize>, right_foot: Option<usize>) -> Self {
        Self {
            pelvis,
            left_foot,
            right_foot,
        }
    }
}

/// Up axis of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpAxis {
    /// Already Y-up
    Y,
    /// Z-up (swap y and z)
    Z,
    /// X-up (swap x and y)
    X,
    /// Guess from the data
    Auto,
}

impl FromStr for UpAxis {
    type Err = MotionError;

    /// Parse `x`, `y`, `z` or `auto` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "auto" => Ok(Self::Auto),
            other => Err(MotionError::invalid_config(format!(
                "unknown up axis '{}', expected x, y, z or auto",
                other
            ))),
        }
    }
}

/// Reorient positions so that +Y is up
///
/// With [`UpAxis::Auto`] the up axis is the one along which the per-joint
/// median positions spread the most (the height of the body dominates its
/// width and depth in a standing pose).
pub fn reorient(positions: &JointPositions, up: UpAxis) -> JointPositions {
    let up = match up {
        UpAxis::Auto => guess_up_axis(positions),
        other => other,
    };
    log::debug!("Reorienting clip with up axis {:?}", up);

    match up {
        UpAxis::Z => positions.map(|p| [p[0], p[2], p[1]]),
        UpAxis::X => positions.map(|p| [p[1], p[0], p[2]]),
        UpAxis::Y | UpAxis::Auto => positions.clone(),
    }
}

fn guess_up_axis(positions: &JointPositions) -> UpAxis {
    if positions.is_empty() || positions.n_joints() == 0 {
        return UpAxis::Y;
    }

    let mut spread = [0.0f64; 3];
    for (axis, s) in spread.iter_mut().enumerate() {
        let medians: Vec<f64> = (0..positions.n_joints())
            .map(|j| median(&positions.axis_trace(j, axis)))
            .collect();
        let lo = medians.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = medians.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        *s = hi - lo;
    }

    let mut best = 0;
    for axis in 1..3 {
        if spread[axis] > spread[best] {
            best = axis;
        }
    }
    match best {
        0 => UpAxis::X,
        2 => UpAxis::Z,
        _ => UpAxis::Y,
    }
}

/// Find pelvis and feet from joint names, falling back to geometry
///
/// Name rules (case-insensitive, end sites ignored):
/// - pelvis: first joint whose name contains `hip` or `pelvis`, else the root
/// - feet: names containing `foot`, `feet`, `toe` or `ankle` together with
///   `left`/`right` or starting with `l`/`r`; the candidate with the lowest
///   median height wins
///
/// When a foot is still missing, the lowest joints (by median height) are
/// split into left (`x >= pelvis x`) and right (`x < pelvis x`), and the
/// lowest of each group is used.
pub fn auto_rig_indices(skeleton: &Skeleton, positions: &JointPositions) -> RigIndices {
    let n = positions.n_joints().min(skeleton.len());
    if n == 0 || positions.is_empty() {
        return RigIndices::default();
    }

    let names: Vec<String> = skeleton.joints()[..n]
        .iter()
        .map(|j| j.name.to_lowercase())
        .collect();
    let named = |i: usize| !skeleton.joints()[i].is_end_site;
    let median_y: Vec<f64> = (0..n).map(|j| median(&positions.axis_trace(j, 1))).collect();
    let median_x: Vec<f64> = (0..n).map(|j| median(&positions.axis_trace(j, 0))).collect();

    let pelvis = (0..n)
        .find(|&i| named(i) && (names[i].contains("hip") || names[i].contains("pelvis")))
        .or_else(|| skeleton.joints()[..n].iter().position(|j| j.is_root))
        .unwrap_or(0);

    let lowest = |candidates: Vec<usize>| -> Option<usize> {
        candidates
            .into_iter()
            .min_by(|&a, &b| median_y[a].total_cmp(&median_y[b]))
    };

    let is_foot = |name: &str| ["foot", "feet", "toe", "ankle"].iter().any(|k| name.contains(k));
    let side_match = |name: &str, side: &str| name.contains(side) || name.starts_with(&side[..1]);

    let mut left_foot = lowest(
        (0..n)
            .filter(|&i| named(i) && is_foot(&names[i]) && side_match(&names[i], "left"))
            .collect(),
    );
    let mut right_foot = lowest(
        (0..n)
            .filter(|&i| named(i) && is_foot(&names[i]) && side_match(&names[i], "right"))
            .collect(),
    );

    if left_foot.is_none() || right_foot.is_none() {
        let mut order: Vec<usize> = (0..n).filter(|&i| i != pelvis).collect();
        order.sort_by(|&a, &b| median_y[a].total_cmp(&median_y[b]));
        let pool: Vec<usize> = order.into_iter().take(8.max(n)).collect();
        let x_pelvis = median_x[pelvis];

        if left_foot.is_none() {
            left_foot = lowest(pool.iter().copied().filter(|&i| median_x[i] >= x_pelvis).collect());
        }
        if right_foot.is_none() {
            right_foot = lowest(pool.iter().copied().filter(|&i| median_x[i] < x_pelvis).collect());
        }
        log::debug!(
            "Geometric foot fallback: left={:?}, right={:?}",
            left_foot,
            right_foot
        );
    }

    RigIndices {
        pelvis: Some(pelvis),
        left_foot,
        right_foot,
    }
}
