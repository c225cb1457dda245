//! Phase snap
//!
//! Moves coarse fused-score events onto the physical contact instant of the
//! foot that is most likely responsible for them: the nearest local minimum
//! of that foot's height, or the frame of maximum vertical jerk when the
//! height has no minimum nearby.

use crate::features::cues::CueSignals;
use crate::rig::{JointPositions, RigIndices};
use crate::signal::{argmax, gradient, local_minima, sorted_unique};

/// Height trace and contact cue of one foot
#[derive(Debug, Clone)]
pub struct FootTrack {
    cue: Vec<f64>,
    minima: Vec<bool>,
    jerk: Vec<f64>,
}

impl FootTrack {
    /// Build from the raw (unsmoothed) foot height and its contact cue.
    ///
    /// # Arguments
    ///
    /// * `heights` - Foot height per frame
    /// * `cue` - Foot contact cue per frame (same length)
    /// * `dt` - Time step in seconds
    pub fn new(heights: &[f64], cue: Vec<f64>, dt: f64) -> Self {
        let vy = gradient(heights, dt);
        let ay = gradient(&vy, dt);
        let jerk = gradient(&ay, dt).iter().map(|j| j.abs()).collect();
        Self {
            cue,
            minima: local_minima(heights),
            jerk,
        }
    }

    fn cue_at(&self, frame: usize) -> f64 {
        self.cue.get(frame).copied().unwrap_or(0.0)
    }

    fn snap(&self, event: usize, radius: usize) -> usize {
        let n = self.minima.len();
        if event >= n {
            return event;
        }
        let lo = event.saturating_sub(radius);
        let hi = (event + radius + 1).min(n);

        let nearest_min = (lo..hi)
            .filter(|&i| self.minima[i])
            .min_by_key(|&i| i.abs_diff(event));
        match nearest_min {
            Some(i) => i,
            None => argmax(&self.jerk[lo..hi]).map_or(event, |j| lo + j),
        }
    }
}

/// Foot data used to snap events
#[derive(Debug, Clone, Default)]
pub struct FootSnap {
    left: Option<FootTrack>,
    right: Option<FootTrack>,
}

impl FootSnap {
    /// Snap data from explicit foot tracks.
    pub fn new(left: Option<FootTrack>, right: Option<FootTrack>) -> Self {
        Self { left, right }
    }

    /// Snap data for the rig's feet; invalid foot indices are left out.
    pub fn from_positions(positions: &JointPositions, rig: &RigIndices, cues: &CueSignals, fps: f64) -> Self {
        let dt = 1.0 / fps;
        let track = |foot: Option<usize>, cue: &[f64]| {
            foot.filter(|&f| f < positions.n_joints())
                .map(|f| FootTrack::new(&positions.axis_trace(f, 1), cue.to_vec(), dt))
        };
        Self {
            left: track(rig.left_foot, &cues.left_foot),
            right: track(rig.right_foot, &cues.right_foot),
        }
    }

    /// Whether at least one foot is available.
    pub fn is_available(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }

    /// Snap every event within `radius` frames
    ///
    /// For each event the foot with the higher contact cue is used (left on
    /// ties; a missing foot counts as a zero cue). If that foot is missing the
    /// event is kept as is.
    ///
    /// # Returns
    ///
    /// Sorted, duplicate-free snapped events
    pub fn snap(&self, events: &[usize], radius: usize) -> Vec<usize> {
        let snapped = events
            .iter()
            .map(|&e| {
                let left_cue = self.left.as_ref().map_or(0.0, |t| t.cue_at(e));
                let right_cue = self.right.as_ref().map_or(0.0, |t| t.cue_at(e));
                let foot = if left_cue >= right_cue {
                    self.left.as_ref()
                } else {
                    self.right.as_ref()
                };
                foot.map_or(e, |track| track.snap(e, radius))
            })
            .collect();
        sorted_unique(snapped)
    }
}
