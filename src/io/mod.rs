//! Motion capture I/O
//!
//! BVH reading: hierarchy and motion sections, then forward kinematics.

pub mod bvh;

pub use bvh::{load_bvh, parse_bvh};
