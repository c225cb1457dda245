//! Temporal alignment of audio and motion
//!
//! An audio onset-strength envelope and the motion energy envelope of a clip
//! live on independent clocks. This module estimates the single global
//! offset between them and maps audio beats onto motion frames.
//!
//! Sign convention, shared by every routine here: the offset is ADDED to
//! audio timestamps to place them on the motion timeline, so
//! `motion(t) ≈ audio(t - offset)`.

pub mod envelope;
pub mod mapping;
pub mod offset;
pub mod xcorr;

pub use envelope::{motion_envelope, Envelope};
pub use mapping::{frame_labels, map_beats_to_frames, tolerance_frames, widen_labels};
pub use offset::{estimate_offset, OffsetEstimate};
pub use xcorr::{cross_correlation, estimate_offset_xcorr, LagCorrelation};

use crate::config::{AlignmentConfig, OffsetMethod};
use crate::error::Result;
use crate::rig::MotionStream;

/// Estimate the offset of an audio envelope relative to a motion clip
///
/// Computes the motion energy envelope and runs the search selected by
/// `config.method`.
///
/// # Errors
///
/// Returns `MotionError::InvalidConfig` if the configuration is invalid.
/// Degenerate signals are not errors and yield a zero offset.
pub fn align_audio_to_motion(
    audio: &Envelope,
    stream: &MotionStream,
    config: &AlignmentConfig,
) -> Result<OffsetEstimate> {
    config.validate()?;
    let motion = motion_envelope(stream);
    let estimate = match config.method {
        OffsetMethod::GridSearch => estimate_offset(audio, &motion, config),
        OffsetMethod::CrossCorrelation => estimate_offset_xcorr(audio, &motion, config),
    };
    log::debug!("Audio-to-motion offset: {:.3}s ({:?})", estimate.offset_s, config.method);
    Ok(estimate)
}
