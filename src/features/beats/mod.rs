//! Fusion and event detection
//!
//! Turns cue signals into a discrete, sorted event set:
//! 1. Weighted fusion of the active cues into a [0, 1] score
//! 2. Hysteresis mask (diagnostic in the base configuration, a candidate
//!    gate in the extended one)
//! 3. Extended only: prominence/area gating of local maxima
//! 4. NMS with a tempo-adaptive separation
//! 5. Phase snap onto foot contacts
//! 6. Extended only: hard threshold recheck of snapped events, then
//!    tempo-aware refinement

pub mod fusion;
pub mod gating;
pub mod phase_snap;

pub use fusion::fuse_cues;
pub use gating::{gated_candidates, hard_recheck, nms_separation};
pub use phase_snap::{FootSnap, FootTrack};

use crate::config::BeatParams;
use crate::features::cues::{extract_cues, CueSignals};
use crate::features::tempo::refine_events_with_tempo;
use crate::rig::{JointPositions, RigIndices};
use crate::signal::{hysteresis_mask, nms_basic};
use serde::{Deserialize, Serialize};

/// Events detected on a fused score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetection {
    /// Sorted, duplicate-free event frames in `[0, T)`
    pub events: Vec<usize>,

    /// Hysteresis mask of the score
    pub candidate_mask: Vec<bool>,

    /// NMS separation actually used, in seconds
    pub nms_separation_s: f64,

    /// Autocorrelation period of the score, if one was found
    pub period_s: Option<f64>,
}

/// Full beat extraction result of one clip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeatAnalysis {
    /// Fused beat-strength score in [0, 1]
    pub score: Vec<f64>,

    /// Hysteresis mask of the score
    pub candidate_mask: Vec<bool>,

    /// Sorted, duplicate-free event frames
    pub events: Vec<usize>,

    /// Constituent cue signals
    pub cues: CueSignals,

    /// NMS separation used, in seconds
    pub nms_separation_s: f64,

    /// Autocorrelation period of the score, if one was found
    pub period_s: Option<f64>,

    /// Frame rate of the analysed clip
    pub fps: f64,
}

impl BeatAnalysis {
    /// Number of frames covered.
    pub fn n_frames(&self) -> usize {
        self.score.len()
    }

    /// Event times in seconds.
    pub fn event_times(&self) -> Vec<f64> {
        if self.fps > 0.0 {
            self.events.iter().map(|&e| e as f64 / self.fps).collect()
        } else {
            Vec::new()
        }
    }
}

/// Detect events on a fused score
///
/// The score is used as given (it is not renormalised), so callers can feed
/// synthetic or externally produced curves.
///
/// # Arguments
///
/// * `score` - Fused score in [0, 1]
/// * `fps` - Frame rate in Hz
/// * `params` - Beat parameters (the `extended` block enables gating, the
///   hard recheck and tempo refinement)
/// * `snap` - Foot data for phase snapping; `None` disables snapping
///
/// # Returns
///
/// Detection with an empty event set and mask when `score` is empty or
/// `fps <= 0`
pub fn detect_events(score: &[f64], fps: f64, params: &BeatParams, snap: Option<&FootSnap>) -> EventDetection {
    if score.is_empty() || !(fps > 0.0) {
        log::warn!("Empty score or non-positive fps ({}), no events", fps);
        return EventDetection {
            nms_separation_s: params.nms_separation_s,
            ..EventDetection::default()
        };
    }

    let thr_hi = params.score_threshold;
    let mask = hysteresis_mask(score, thr_hi, params.hysteresis_low());
    let (nms_sep, period_s) = nms_separation(score, fps, params);

    let mut events = match &params.extended {
        Some(ext) => {
            let candidates = gated_candidates(score, &mask, fps, ext);
            if candidates.is_empty() {
                Vec::new()
            } else {
                let mut gated = vec![0.0; score.len()];
                for &i in &candidates {
                    gated[i] = score[i];
                }
                nms_basic(&gated, fps, nms_sep)
            }
        }
        None => nms_basic(score, fps, nms_sep),
    };
    log::debug!("{} events after NMS ({:.3}s separation)", events.len(), nms_sep);

    let radius = params.phase_snap_radius;
    if let Some(snap) = snap.filter(|s| radius > 0 && s.is_available()) {
        if !events.is_empty() {
            events = snap.snap(&events, radius);
            if params.is_extended() {
                events = hard_recheck(&events, score, thr_hi, params.snap_recheck_radius);
            }
            log::debug!("{} events after phase snap (radius {})", events.len(), radius);
        }
    }

    // Runs in the extended configuration whether or not events were snapped
    if let Some(ext) = &params.extended {
        events = refine_events_with_tempo(&events, score, ext.tempo_max_drift_frames, ext.tempo_min_events);
    }

    EventDetection {
        events,
        candidate_mask: mask,
        nms_separation_s: nms_sep,
        period_s,
    }
}

/// Extract beats from joint positions
///
/// # Arguments
///
/// * `positions` - Joint positions `(T, J, 3)`
/// * `fps` - Frame rate in Hz
/// * `joints` - Joints driving the body-level cues (empty selects all)
/// * `rig` - Pelvis and foot indices
/// * `params` - Beat parameters
///
/// # Returns
///
/// Fused score, hysteresis mask, events and all cue signals. For `T = 0` or
/// `fps <= 0` every array is empty.
///
/// # Example
///
/// ```
/// use stratum_motion::config::BeatParams;
/// use stratum_motion::features::beats::extract_beats;
/// use stratum_motion::rig::{JointPositions, RigIndices};
///
/// let traj: Vec<[f64; 3]> = (0..90)
///     .map(|t| [0.0, 1.0 + 0.05 * (t as f64 * 0.4).cos(), 0.0])
///     .collect();
/// let positions = JointPositions::from_trajectories(&[traj])?;
/// let rig = RigIndices::new(Some(0), None, None);
/// let beats = extract_beats(&positions, 30.0, &[], &rig, &BeatParams::base());
/// assert_eq!(beats.score.len(), 90);
/// assert!(beats.events.windows(2).all(|w| w[0] < w[1]));
/// # Ok::<(), stratum_motion::MotionError>(())
/// ```
pub fn extract_beats(
    positions: &JointPositions,
    fps: f64,
    joints: &[usize],
    rig: &RigIndices,
    params: &BeatParams,
) -> BeatAnalysis {
    log::debug!(
        "Extracting beats: {} frames, {} joints at {:.2} fps",
        positions.n_frames(),
        positions.n_joints(),
        fps
    );

    if positions.is_empty() || !(fps > 0.0) {
        log::warn!("Degenerate clip ({} frames, fps {}), returning empty beats", positions.n_frames(), fps);
        let empty = |on: bool| if on { Some(Vec::new()) } else { None };
        return BeatAnalysis {
            cues: CueSignals {
                accel: empty(params.is_extended()),
                reversal: empty(params.is_extended()),
                ..CueSignals::default()
            },
            nms_separation_s: params.nms_separation_s,
            fps: fps.max(0.0),
            ..BeatAnalysis::default()
        };
    }

    let cues = extract_cues(positions, joints, rig, fps, params);
    let score = fuse_cues(&cues, params);
    let snap = FootSnap::from_positions(positions, rig, &cues, fps);
    let detection = detect_events(&score, fps, params, Some(&snap));

    log::debug!("Extracted {} beat events", detection.events.len());
    BeatAnalysis {
        score,
        candidate_mask: detection.candidate_mask,
        events: detection.events,
        cues,
        nms_separation_s: detection.nms_separation_s,
        period_s: detection.period_s,
        fps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spike_score() -> Vec<f64> {
        let mut score = vec![0.0; 1000];
        score[100] = 1.0;
        score
    }

    #[test]
    fn test_single_spike_gives_single_event() {
        let score = spike_score();
        for params in [BeatParams::base(), BeatParams::extended()] {
            let detection = detect_events(&score, 30.0, &params, None);
            assert_eq!(detection.events, vec![100], "extended={}", params.is_extended());
            assert!(detection.candidate_mask[100]);
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let detection = detect_events(&[], 30.0, &BeatParams::base(), None);
        assert!(detection.events.is_empty() && detection.candidate_mask.is_empty());
        assert!(detect_events(&spike_score(), 0.0, &BeatParams::base(), None).events.is_empty());

        let empty = JointPositions::new(0, 3, Vec::new()).unwrap();
        let beats = extract_beats(&empty, 30.0, &[], &RigIndices::default(), &BeatParams::extended());
        assert!(beats.score.is_empty() && beats.events.is_empty());
        assert_eq!(beats.cues.accel, Some(Vec::new()));
    }

    #[test]
    fn test_extended_rejects_subthreshold_peaks() {
        let mut score = spike_score();
        score[500] = 0.5; // below the 0.6 threshold
        let base = detect_events(&score, 30.0, &BeatParams::base(), None);
        assert_eq!(base.events, vec![100, 500], "base NMS has no threshold");
        let ext = detect_events(&score, 30.0, &BeatParams::extended(), None);
        assert_eq!(ext.events, vec![100]);
    }

    #[test]
    fn test_hard_recheck_after_snap() {
        // Event at 50 snaps to a foot minimum 3 frames away, out of reach
        // of the 0.6 threshold with a recheck radius of 1.
        let mut score = vec![0.0; 120];
        score[50] = 1.0;
        let heights: Vec<f64> = (0..120).map(|t| (t as f64 - 53.0).abs() * 0.01).collect();
        let snap = FootSnap::new(Some(FootTrack::new(&heights, vec![1.0; 120], 1.0 / 30.0)), None);

        let mut params = BeatParams::extended();
        params.snap_recheck_radius = 1;
        assert!(detect_events(&score, 30.0, &params, Some(&snap)).events.is_empty());

        params.snap_recheck_radius = 3;
        assert_eq!(detect_events(&score, 30.0, &params, Some(&snap)).events, vec![53]);

        let base = detect_events(&score, 30.0, &BeatParams::base(), Some(&snap));
        assert_eq!(base.events, vec![53], "base snaps without recheck");
    }

    #[test]
    fn test_tempo_refinement_runs_without_snap() {
        // Peaks every 20 frames, each nudged by a few frames
        let jitter = [0usize, 2, 0, 3, 1, 0, 2, 0, 1, 3, 0, 2, 1];
        let mut score = vec![0.0; 280];
        for (k, j) in jitter.iter().enumerate() {
            let peak = 10 + 20 * k + j;
            score[peak] = 1.0;
            score[peak - 1] = 0.7;
            score[peak + 1] = 0.7;
        }

        let mut unrefined = BeatParams::extended();
        if let Some(ext) = unrefined.extended.as_mut() {
            ext.tempo_min_events = usize::MAX;
        }
        let raw = detect_events(&score, 30.0, &unrefined, None).events;
        assert!(raw.len() >= 3, "raw events: {:?}", raw);

        let params = BeatParams::extended();
        let ext = params.extended.clone().unwrap();
        let expected = refine_events_with_tempo(&raw, &score, ext.tempo_max_drift_frames, ext.tempo_min_events);

        assert_eq!(detect_events(&score, 30.0, &params, None).events, expected);
        let unavailable = FootSnap::new(None, None);
        assert!(!unavailable.is_available());
        assert_eq!(detect_events(&score, 30.0, &params, Some(&unavailable)).events, expected);
    }

    #[test]
    fn test_events_sorted_unique_and_in_range() {
        let traj: Vec<[f64; 3]> = (0..150)
            .map(|t| {
                let phase = t as f64 * 2.0 * std::f64::consts::PI / 15.0;
                [0.01 * t as f64, 1.0 + 0.05 * phase.cos(), 0.0]
            })
            .collect();
        let foot: Vec<[f64; 3]> = (0..150)
            .map(|t| {
                let phase = t as f64 * 2.0 * std::f64::consts::PI / 15.0;
                [0.01 * t as f64, 0.05 * (1.0 + phase.cos()), 0.0]
            })
            .collect();
        let positions = JointPositions::from_trajectories(&[traj, foot]).unwrap();
        let rig = RigIndices::new(Some(0), Some(1), None);
        for params in [BeatParams::base(), BeatParams::extended()] {
            let beats = extract_beats(&positions, 30.0, &[], &rig, &params);
            assert_eq!(beats.score.len(), 150);
            assert!(beats.events.windows(2).all(|w| w[0] < w[1]));
            assert!(beats.events.iter().all(|&e| e < 150));
            assert!(!beats.events.is_empty(), "periodic bounce must yield events");
        }
    }
}
