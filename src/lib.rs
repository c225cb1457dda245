//! # Stratum Motion
//!
//! Motion-beat extraction for skeletal motion capture, plus temporal
//! alignment of the motion against an externally analysed audio track.
//!
//! ## Features
//!
//! - **Kinematics**: BVH hierarchy parsing and forward kinematics into
//!   per-frame joint positions
//! - **Cues**: deceleration, pelvis drop, foot contact, global acceleration
//!   and reversal signals, each normalised to [0, 1]
//! - **Beat Events**: weighted cue fusion, hysteresis and prominence gating,
//!   tempo-adaptive NMS, phase snapping onto foot contacts and tempo-aware
//!   refinement
//! - **Alignment**: global audio-to-motion offset from onset and motion
//!   energy envelopes, audio beats mapped onto motion frames
//! - **ML Hand-off**: per-frame feature rows and merging of classifier
//!   probabilities with rule-based events
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_motion::analysis::{analyze_clip, ClipInput};
//! use stratum_motion::rig::UpAxis;
//! use stratum_motion::{AlignmentConfig, BeatParams};
//!
//! let clip = ClipInput::from_bvh_file("dance.bvh", UpAxis::Auto)?;
//! let result = analyze_clip(&clip, &BeatParams::extended(), &AlignmentConfig::default())?;
//!
//! println!("{} beats: {:?}", result.beats.events.len(), result.event_times());
//! # Ok::<(), stratum_motion::MotionError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! BVH → Kinematics → Cues → Fusion → Events → (Alignment with audio) → Output
//! ```
//!
//! All configuration is passed explicitly; nothing is read from global state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alignment;
pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod kinematics;
pub mod ml;
pub mod rig;
pub mod signal;

// Re-export main types
pub use alignment::{Envelope, OffsetEstimate};
pub use analysis::{analyze_clip, ClipAnalysis, ClipInput};
pub use config::{AlignmentConfig, BeatParams, ExtendedParams, OffsetMethod};
pub use error::{MotionError, Result};
pub use features::beats::{extract_beats, BeatAnalysis};
pub use io::load_bvh;
pub use rig::{JointPositions, MotionStream, RigIndices, Skeleton};

/// Main beat extraction function
///
/// Extracts motion-beat events, the fused score and every cue signal from a
/// motion stream.
///
/// # Arguments
///
/// * `stream` - Y-up joint positions with their time axis
/// * `joints` - Joints driving the body-level cues (empty selects all)
/// * `rig` - Pelvis and foot indices (each may be missing)
/// * `params` - Beat extraction parameters
///
/// # Returns
///
/// `BeatAnalysis` with sorted, duplicate-free events and length-`T` signals
///
/// # Errors
///
/// Returns `MotionError::InvalidConfig` if `params` fails validation.
///
/// # Example
///
/// ```
/// use stratum_motion::{extract_motion_beats, BeatParams, JointPositions, MotionStream, RigIndices};
///
/// let traj: Vec<[f64; 3]> = (0..150)
///     .map(|t| [0.0, 1.0 + 0.05 * (t as f64 * 0.21).cos(), 0.0])
///     .collect();
/// let stream = MotionStream::uniform(JointPositions::from_trajectories(&[traj])?, 30.0)?;
/// let beats = extract_motion_beats(&stream, &[], &RigIndices::new(Some(0), None, None), &BeatParams::base())?;
/// assert_eq!(beats.score.len(), 150);
/// # Ok::<(), stratum_motion::MotionError>(())
/// ```
pub fn extract_motion_beats(
    stream: &MotionStream,
    joints: &[usize],
    rig: &RigIndices,
    params: &BeatParams,
) -> Result<BeatAnalysis> {
    params.validate()?;
    Ok(extract_beats(stream.positions(), stream.fps(), joints, rig, params))
}
