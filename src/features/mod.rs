//! Feature extraction modules
//!
//! This module contains the motion beat pipeline:
//! - Kinematic cues (deceleration, pelvis drop, foot contact, acceleration, reversal)
//! - Cue fusion and event detection
//! - Tempo-aware refinement and beat grid utilities

pub mod beats;
pub mod cues;
pub mod tempo;
