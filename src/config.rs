//! Configuration parameters for beat extraction and alignment
//!
//! All parameters are passed explicitly into every call; nothing is read from
//! global state. Validation happens when a configuration is built or loaded,
//! so the algorithms themselves can assume sane values.

use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};

/// Beat extraction parameters
///
/// The base parameter set fuses three cues (deceleration, pelvis drop, foot
/// contact). Setting [`BeatParams::extended`] adds the global acceleration and
/// reversal cues together with prominence/area gating, a hard recheck after
/// phase snapping and a final tempo-aware refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatParams {
    // Smoothing & thresholds
    /// Moving-average window applied to joint trajectories, in frames (default: 5)
    pub smooth_win: usize,

    /// Upper hysteresis threshold on the fused score (default: 0.6)
    pub score_threshold: f64,

    /// Default minimum separation between events in seconds (default: 0.12)
    /// Replaced by a tempo-derived value when `adaptive_nms` finds a period.
    pub nms_separation_s: f64,

    // Cue weights
    /// Deceleration cue weight (default: 0.40)
    pub w_decel: f64,

    /// Pelvis drop cue weight (default: 0.30)
    pub w_pelvis: f64,

    /// Foot contact cue weight (default: 0.30)
    pub w_foot: f64,

    // Foot contact
    /// Quantile of foot height used as the ground estimate (default: 0.05)
    pub ground_q: f64,

    /// Normalise foot height by the actor's leg length (default: true)
    pub use_leg_norm: bool,

    // Score post-processing
    /// Derive the NMS window from the autocorrelation period (default: true)
    pub adaptive_nms: bool,

    /// Lower hysteresis threshold as a fraction of `score_threshold` (default: 0.8)
    pub hysteresis_low_fac: f64,

    /// Frames searched on each side of an event during phase snap (default: 3, 0 disables)
    pub phase_snap_radius: usize,

    /// Frames searched on each side of a snapped event during the hard recheck (default: 2)
    pub snap_recheck_radius: usize,

    /// Extended cue set and event gating; `None` selects the base algorithm
    pub extended: Option<ExtendedParams>,
}

/// Parameters that only exist in the extended configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedParams {
    /// Global acceleration cue weight (default: 0.20)
    pub w_accel: f64,

    /// Reversal cue weight (default: 0.20)
    pub w_reversal: f64,

    /// Half-window for the prominence/area test in seconds (default: 0.12)
    pub prom_window_s: f64,

    /// Minimum peak prominence on the fused score (default: 0.10)
    pub min_prominence: f64,

    /// Minimum local area under the fused score (default: 0.10)
    pub min_area: f64,

    /// Maximum drift allowed by the tempo refinement, in frames (default: 3)
    pub tempo_max_drift_frames: usize,

    /// Minimum number of events before tempo refinement runs (default: 3)
    pub tempo_min_events: usize,
}

impl Default for ExtendedParams {
    fn default() -> Self {
        Self {
            w_accel: 0.20,
            w_reversal: 0.20,
            prom_window_s: 0.12,
            min_prominence: 0.10,
            min_area: 0.10,
            tempo_max_drift_frames: 3,
            tempo_min_events: 3,
        }
    }
}

impl Default for BeatParams {
    fn default() -> Self {
        Self {
            smooth_win: 5,
            score_threshold: 0.6,
            nms_separation_s: 0.12,
            w_decel: 0.40,
            w_pelvis: 0.30,
            w_foot: 0.30,
            ground_q: 0.05,
            use_leg_norm: true,
            adaptive_nms: true,
            hysteresis_low_fac: 0.8,
            phase_snap_radius: 3,
            snap_recheck_radius: 2,
            extended: None,
        }
    }
}

impl BeatParams {
    /// Base parameter set (three cues).
    pub fn base() -> Self {
        Self::default()
    }

    /// Extended parameter set with default extension values (five cues).
    pub fn extended() -> Self {
        Self::default().with_extension(ExtendedParams::default())
    }

    /// Attach an extension block.
    pub fn with_extension(mut self, extended: ExtendedParams) -> Self {
        self.extended = Some(extended);
        self
    }

    /// Whether the extended algorithm is selected.
    pub fn is_extended(&self) -> bool {
        self.extended.is_some()
    }

    /// Lower hysteresis threshold.
    pub fn hysteresis_low(&self) -> f64 {
        self.score_threshold * self.hysteresis_low_fac
    }

    /// Parse parameters from JSON and validate them.
    ///
    /// Missing fields take their default values; an absent or `null`
    /// `extended` key selects the base algorithm.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Validate the parameter set.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::InvalidConfig` if:
    /// - `smooth_win` is 0
    /// - `score_threshold`, `hysteresis_low_fac` or `ground_q` is outside [0, 1]
    /// - `nms_separation_s` is not strictly positive
    /// - any weight is negative or non-finite, or all active weights are zero
    /// - extension windows/thresholds are out of range
    pub fn validate(&self) -> Result<()> {
        if self.smooth_win == 0 {
            return Err(MotionError::invalid_config("smooth_win must be >= 1"));
        }
        check_unit("score_threshold", self.score_threshold)?;
        check_unit("hysteresis_low_fac", self.hysteresis_low_fac)?;
        check_unit("ground_q", self.ground_q)?;
        if !(self.nms_separation_s.is_finite() && self.nms_separation_s > 0.0) {
            return Err(MotionError::invalid_config(format!(
                "nms_separation_s must be > 0, got {}",
                self.nms_separation_s
            )));
        }

        let mut weights = vec![
            ("w_decel", self.w_decel),
            ("w_pelvis", self.w_pelvis),
            ("w_foot", self.w_foot),
        ];

        if let Some(ext) = &self.extended {
            weights.push(("w_accel", ext.w_accel));
            weights.push(("w_reversal", ext.w_reversal));
            if !(ext.prom_window_s.is_finite() && ext.prom_window_s > 0.0) {
                return Err(MotionError::invalid_config(format!(
                    "prom_window_s must be > 0, got {}",
                    ext.prom_window_s
                )));
            }
            check_unit("min_prominence", ext.min_prominence)?;
            if !(ext.min_area.is_finite() && ext.min_area >= 0.0) {
                return Err(MotionError::invalid_config(format!(
                    "min_area must be >= 0, got {}",
                    ext.min_area
                )));
            }
            if ext.tempo_min_events < 2 {
                return Err(MotionError::invalid_config(
                    "tempo_min_events must be >= 2 (a line needs two points)",
                ));
            }
        }

        for (name, w) in &weights {
            if !(w.is_finite() && *w >= 0.0) {
                return Err(MotionError::invalid_config(format!(
                    "{} must be a finite, non-negative weight, got {}",
                    name, w
                )));
            }
        }
        if weights.iter().all(|(_, w)| *w == 0.0) {
            return Err(MotionError::invalid_config("all cue weights are zero"));
        }

        Ok(())
    }
}

/// Temporal alignment parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Largest absolute offset searched, in seconds (default: 1.0)
    pub max_offset_s: f64,

    /// Offset grid and resampling resolution, in seconds (default: 0.01)
    pub resolution_s: f64,

    /// Minimum number of samples in either signal (default: 4)
    /// Shorter signals yield a zero offset.
    pub min_samples: usize,

    /// Offset search strategy (default: grid search)
    pub method: OffsetMethod,

    /// Half-width of the per-frame beat labels, in seconds (default: 0.05)
    pub label_tolerance_s: f64,
}

/// How the audio-to-motion offset is searched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMethod {
    /// Shift-resample-correlate over a uniform offset grid
    #[default]
    GridSearch,
    /// Full cross-correlation over the raw-time overlap
    CrossCorrelation,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            max_offset_s: 1.0,
            resolution_s: 0.01,
            min_samples: 4,
            method: OffsetMethod::GridSearch,
            label_tolerance_s: 0.05,
        }
    }
}

impl AlignmentConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.resolution_s.is_finite() && self.resolution_s > 0.0) {
            return Err(MotionError::invalid_config(format!(
                "resolution_s must be > 0, got {}",
                self.resolution_s
            )));
        }
        if !(self.max_offset_s.is_finite() && self.max_offset_s >= 0.0) {
            return Err(MotionError::invalid_config(format!(
                "max_offset_s must be >= 0, got {}",
                self.max_offset_s
            )));
        }
        if !(self.label_tolerance_s.is_finite() && self.label_tolerance_s >= 0.0) {
            return Err(MotionError::invalid_config(format!(
                "label_tolerance_s must be >= 0, got {}",
                self.label_tolerance_s
            )));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MotionError::invalid_config(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
