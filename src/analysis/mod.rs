//! Clip-level analysis pipeline
//!
//! Bundles everything that happens to one clip:
//! - Beat extraction from the motion
//! - Audio-to-motion offset (estimated or supplied)
//! - Audio beats mapped to motion frames and per-frame labels
//! - Flags for degenerate but non-fatal conditions
//!
//! Clips are independent of each other; see [`batch`] for parallel runs.

pub mod batch;
pub mod result;

pub use batch::{analyze_batch, analyze_bvh_files};
pub use result::{AudioAlignment, ClipAnalysis, ClipFlag, ClipMetadata};

use crate::alignment::{
    align_audio_to_motion, frame_labels, map_beats_to_frames, tolerance_frames, Envelope, OffsetEstimate,
};
use crate::config::{AlignmentConfig, BeatParams};
use crate::error::Result;
use crate::features::beats::extract_beats;
use crate::io::load_bvh;
use crate::rig::{auto_rig_indices, reorient, MotionStream, RigIndices, Skeleton, UpAxis};
use std::path::Path;
use std::time::Instant;

/// Audio-side inputs of a clip, produced by an external audio analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioTrack {
    /// Onset-strength envelope used to estimate the offset
    pub onsets: Option<Envelope>,

    /// Beat times on the audio clock, in seconds
    pub beat_times: Vec<f64>,

    /// Known offset; skips the estimation when set
    pub offset_s: Option<f64>,
}

/// Everything needed to analyse one clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInput {
    /// Optional clip name carried into the result
    pub name: Option<String>,

    /// Joint positions (Y-up) with their time axis
    pub stream: MotionStream,

    /// Joints driving the body-level cues (empty selects all)
    pub joints: Vec<usize>,

    /// Pelvis and foot indices
    pub rig: RigIndices,

    /// Audio side, if any
    pub audio: Option<AudioTrack>,
}

impl ClipInput {
    /// Clip from an already Y-up stream and explicit landmarks.
    pub fn new(stream: MotionStream, rig: RigIndices) -> Self {
        Self {
            name: None,
            stream,
            joints: Vec::new(),
            rig,
            audio: None,
        }
    }

    /// Clip from a resolved skeleton
    ///
    /// Positions are reoriented to Y-up and the landmarks are detected from
    /// joint names and geometry.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidInput` if the skeleton has no frames.
    pub fn from_skeleton(skeleton: &Skeleton, up: UpAxis) -> Result<Self> {
        let positions = reorient(&skeleton.positions(), up);
        let rig = auto_rig_indices(skeleton, &positions);
        log::debug!(
            "Rig: pelvis={:?}, left foot={:?}, right foot={:?}",
            rig.pelvis,
            rig.left_foot,
            rig.right_foot
        );
        let stream = MotionStream::new(positions, skeleton.frame_times(), skeleton.fps())?;
        Ok(Self::new(stream, rig))
    }

    /// Clip from a BVH file, named after the file stem.
    pub fn from_bvh_file(path: impl AsRef<Path>, up: UpAxis) -> Result<Self> {
        let path = path.as_ref();
        let skeleton = load_bvh(path)?;
        let name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        Ok(Self::from_skeleton(&skeleton, up)?.with_name(name))
    }

    /// Set the clip name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Restrict the body-level cues to a joint subset.
    pub fn with_joints(mut self, joints: Vec<usize>) -> Self {
        self.joints = joints;
        self
    }

    /// Attach the audio side.
    pub fn with_audio(mut self, audio: AudioTrack) -> Self {
        self.audio = Some(audio);
        self
    }
}

fn align_track(audio: &AudioTrack, stream: &MotionStream, config: &AlignmentConfig) -> Result<AudioAlignment> {
    let (offset, overridden) = match (audio.offset_s, &audio.onsets) {
        (Some(offset_s), _) => (
            OffsetEstimate {
                offset_s,
                ..OffsetEstimate::zero()
            },
            true,
        ),
        (None, Some(onsets)) => (align_audio_to_motion(onsets, stream, config)?, false),
        (None, None) => (OffsetEstimate::zero(), false),
    };

    let n = stream.n_frames();
    let beat_frames = map_beats_to_frames(&audio.beat_times, offset.offset_s, stream.fps(), stream.duration(), n);
    let labels = frame_labels(&beat_frames, n, tolerance_frames(config.label_tolerance_s, stream.fps()));

    Ok(AudioAlignment {
        offset,
        offset_overridden: overridden,
        beat_frames,
        labels,
    })
}

/// Analyse one clip
///
/// # Arguments
///
/// * `input` - Motion stream, landmarks and optional audio
/// * `params` - Beat extraction parameters
/// * `config` - Alignment parameters (used only when audio is attached)
///
/// # Returns
///
/// Beats, optional audio alignment and metadata. Degenerate clips produce
/// empty results and raise [`ClipFlag`]s rather than errors.
///
/// # Errors
///
/// Returns `MotionError::InvalidConfig` if `params` or `config` is invalid.
///
/// # Example
///
/// ```
/// use stratum_motion::analysis::{analyze_clip, ClipInput};
/// use stratum_motion::rig::{JointPositions, MotionStream, RigIndices};
/// use stratum_motion::{AlignmentConfig, BeatParams};
///
/// let traj: Vec<[f64; 3]> = (0..120)
///     .map(|t| [0.0, 1.0 + 0.05 * (t as f64 * 0.2).sin(), 0.0])
///     .collect();
/// let stream = MotionStream::uniform(JointPositions::from_trajectories(&[traj])?, 30.0)?;
/// let input = ClipInput::new(stream, RigIndices::new(Some(0), None, None));
/// let result = analyze_clip(&input, &BeatParams::base(), &AlignmentConfig::default())?;
/// assert_eq!(result.beats.score.len(), 120);
/// assert!(result.alignment.is_none());
/// # Ok::<(), stratum_motion::MotionError>(())
/// ```
pub fn analyze_clip(input: &ClipInput, params: &BeatParams, config: &AlignmentConfig) -> Result<ClipAnalysis> {
    let start_time = Instant::now();
    params.validate()?;
    config.validate()?;

    let stream = &input.stream;
    let positions = stream.positions();
    log::debug!(
        "Analysing clip {:?}: {} frames, {} joints at {:.2} fps",
        input.name,
        stream.n_frames(),
        positions.n_joints(),
        stream.fps()
    );

    let beats = extract_beats(positions, stream.fps(), &input.joints, &input.rig, params);
    let alignment = input
        .audio
        .as_ref()
        .map(|audio| align_track(audio, stream, config))
        .transpose()?;

    let mut flags = Vec::new();
    if stream.n_frames() < 3 {
        flags.push(ClipFlag::ShortClip);
    }
    if !positions.is_valid_joint(input.rig.pelvis) {
        flags.push(ClipFlag::NoPelvis);
    }
    if !positions.is_valid_joint(input.rig.left_foot) && !positions.is_valid_joint(input.rig.right_foot) {
        flags.push(ClipFlag::NoFeet);
    }
    if beats.events.is_empty() {
        flags.push(ClipFlag::NoEvents);
    }
    if let (Some(audio), Some(aligned)) = (&input.audio, &alignment) {
        if !aligned.offset_overridden && !aligned.offset.is_measured() {
            flags.push(ClipFlag::AlignmentUnmeasured);
        }
        if !audio.beat_times.is_empty() && aligned.beat_frames.is_empty() {
            flags.push(ClipFlag::NoAudioBeatsInClip);
        }
    }
    for flag in &flags {
        log::warn!("Clip {:?}: {:?}", input.name, flag);
    }

    let processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    log::debug!(
        "Clip {:?}: {} events in {:.1} ms",
        input.name,
        beats.events.len(),
        processing_time_ms
    );

    Ok(ClipAnalysis {
        rig: input.rig,
        alignment,
        metadata: ClipMetadata {
            name: input.name.clone(),
            n_frames: stream.n_frames(),
            n_joints: positions.n_joints(),
            fps: stream.fps(),
            duration_seconds: stream.duration(),
            extended: params.is_extended(),
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            flags,
        },
        beats,
    })
}
