//! Clip analysis result types

use crate::alignment::OffsetEstimate;
use crate::error::Result;
use crate::features::beats::BeatAnalysis;
use crate::rig::RigIndices;
use serde::{Deserialize, Serialize};

/// Conditions worth surfacing to a caller, none of them fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipFlag {
    /// Fewer than three frames: every cue is zero
    ShortClip,
    /// No pelvis joint was available
    NoPelvis,
    /// Neither foot joint was available
    NoFeet,
    /// The beat extractor found no events
    NoEvents,
    /// Audio was supplied but the offset could not be measured (zero used)
    AlignmentUnmeasured,
    /// Audio was supplied but none of its beats fell on the clip
    NoAudioBeatsInClip,
}

/// Per-clip bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    /// Optional clip name (usually the file stem)
    pub name: Option<String>,

    /// Number of frames
    pub n_frames: usize,

    /// Number of joints
    pub n_joints: usize,

    /// Motion frame rate in Hz
    pub fps: f64,

    /// Clip duration in seconds
    pub duration_seconds: f64,

    /// Whether the extended beat parameter set was used
    pub extended: bool,

    /// Wall-clock analysis time
    pub processing_time_ms: f64,

    /// Crate version that produced the result
    pub algorithm_version: String,

    /// Non-fatal conditions encountered
    pub flags: Vec<ClipFlag>,
}

/// Audio side of a clip, mapped onto motion frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAlignment {
    /// Offset applied to audio timestamps
    pub offset: OffsetEstimate,

    /// Whether `offset` was supplied by the caller instead of estimated
    pub offset_overridden: bool,

    /// Audio beats as sorted, duplicate-free motion frames
    pub beat_frames: Vec<usize>,

    /// 0/1 beat label per motion frame
    pub labels: Vec<u8>,
}

/// Complete result for one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipAnalysis {
    /// Rig indices used for the pelvis and foot cues
    pub rig: RigIndices,

    /// Motion beats, fused score and cues
    pub beats: BeatAnalysis,

    /// Audio alignment, when audio was supplied
    pub alignment: Option<AudioAlignment>,

    /// Bookkeeping
    pub metadata: ClipMetadata,
}

impl ClipAnalysis {
    /// Motion event times in seconds.
    pub fn event_times(&self) -> Vec<f64> {
        self.beats.event_times()
    }

    /// Tempo implied by the score's autocorrelation period, in BPM.
    pub fn motion_tempo_bpm(&self) -> Option<f64> {
        self.beats.period_s.filter(|p| *p > 0.0).map(|p| 60.0 / p)
    }

    /// Whether a flag was raised.
    pub fn has_flag(&self, flag: ClipFlag) -> bool {
        self.metadata.flags.contains(&flag)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
