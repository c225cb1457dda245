//! Grid-search offset estimation
//!
//! For every candidate offset, the audio time axis is shifted, both
//! envelopes are resampled onto a common grid over the overlap, and the
//! normalised correlation of the zero-mean windows is scored.

use super::envelope::Envelope;
use crate::config::AlignmentConfig;
use crate::signal::standardize;
use serde::{Deserialize, Serialize};

/// Correlation denominator guard
const DENOM_EPS: f64 = 1e-9;

/// Best global offset between audio and motion
///
/// `offset_s` is added to audio timestamps to place them on the motion
/// timeline: `motion(t) ≈ audio(t - offset_s)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetEstimate {
    /// Offset in seconds (0.0 when nothing could be evaluated)
    pub offset_s: f64,

    /// Correlation at the chosen offset, `None` when no candidate was valid
    pub score: Option<f64>,

    /// Number of candidate offsets that produced a valid overlap
    pub candidates: usize,
}

impl OffsetEstimate {
    /// Neutral estimate: zero offset, no score.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether the offset was actually measured.
    pub fn is_measured(&self) -> bool {
        self.score.is_some()
    }

    /// Map an audio timestamp onto the motion timeline.
    pub fn audio_to_motion(&self, audio_time: f64) -> f64 {
        audio_time + self.offset_s
    }
}

/// Whether the search range and resolution describe a finite grid.
///
/// Unusable values are absorbed into a zero offset by both estimators.
pub(crate) fn search_is_usable(config: &AlignmentConfig) -> bool {
    let usable = config.resolution_s.is_finite()
        && config.resolution_s > 0.0
        && config.max_offset_s.is_finite()
        && config.max_offset_s >= 0.0;
    if !usable {
        log::warn!(
            "Unusable offset search (max={}, step={}), offset = 0",
            config.max_offset_s,
            config.resolution_s
        );
    }
    usable
}

/// Candidate offsets: `floor(2 max / step) + 1` evenly spaced values in `[-max, max]`.
pub(crate) fn offset_grid(max_offset_s: f64, step: f64) -> Vec<f64> {
    let n = (2.0 * max_offset_s / step).floor() as usize + 1;
    if n == 1 {
        return vec![-max_offset_s];
    }
    let spacing = 2.0 * max_offset_s / (n - 1) as f64;
    (0..n).map(|i| -max_offset_s + i as f64 * spacing).collect()
}

/// Half-open sampling grid `t0, t0 + step, ...` strictly below `t1`.
pub(crate) fn time_grid(t0: f64, t1: f64, step: f64) -> Vec<f64> {
    let n = ((t1 - t0) / step).ceil().max(0.0) as usize;
    (0..n).map(|i| t0 + i as f64 * step).collect()
}

fn zero_mean(values: &mut [f64]) {
    if values.is_empty() {
        return;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter_mut().for_each(|v| *v -= mean);
}

fn l2(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Estimate the global audio-to-motion offset by grid search
///
/// # Arguments
///
/// * `audio` - Audio onset-strength envelope
/// * `motion` - Motion energy envelope (see [`super::motion_envelope`])
/// * `config` - Search range, grid resolution and minimum signal length
///
/// # Returns
///
/// The offset with the highest correlation. A zero offset is returned when
/// `config.resolution_s` is not a positive finite step, `config.max_offset_s`
/// is negative or non-finite, either envelope is shorter than
/// `config.min_samples` or has (near) zero variance, or no candidate offset
/// leaves an overlap longer than two grid steps.
///
/// # Example
///
/// ```
/// use stratum_motion::alignment::{estimate_offset, Envelope};
/// use stratum_motion::AlignmentConfig;
///
/// let flat = Envelope::uniform(vec![1.0; 50], 10.0).unwrap();
/// let est = estimate_offset(&flat, &flat, &AlignmentConfig::default());
/// assert_eq!(est.offset_s, 0.0);
/// assert!(!est.is_measured());
/// ```
pub fn estimate_offset(audio: &Envelope, motion: &Envelope, config: &AlignmentConfig) -> OffsetEstimate {
    log::debug!(
        "Estimating offset: {} audio samples, {} motion samples, max={:.2}s, step={:.3}s",
        audio.len(),
        motion.len(),
        config.max_offset_s,
        config.resolution_s
    );

    if !search_is_usable(config) {
        return OffsetEstimate::zero();
    }
    if audio.len() < config.min_samples || motion.len() < config.min_samples {
        log::debug!("Envelopes too short for alignment, offset = 0");
        return OffsetEstimate::zero();
    }

    let (audio_n, motion_n) = match (standardize(audio.values()), standardize(motion.values())) {
        (Some(a), Some(m)) => (audio.with_values(a), motion.with_values(m)),
        _ => {
            log::debug!("Zero-variance envelope, offset = 0");
            return OffsetEstimate::zero();
        }
    };

    let (a0, a1) = match audio.span() {
        Some(span) => span,
        None => return OffsetEstimate::zero(),
    };
    let (m0, m1) = match motion.span() {
        Some(span) => span,
        None => return OffsetEstimate::zero(),
    };

    let step = config.resolution_s;
    let mut best = OffsetEstimate::zero();
    let mut best_score = f64::NEG_INFINITY;

    for offset in offset_grid(config.max_offset_s, step) {
        let t0 = (a0 + offset).max(m0);
        let t1 = (a1 + offset).min(m1);
        if t1 <= t0 + 2.0 * step {
            continue;
        }

        let grid = time_grid(t0, t1, step);
        let mut a: Vec<f64> = grid.iter().map(|&t| audio_n.interp(t - offset)).collect();
        let mut m: Vec<f64> = grid.iter().map(|&t| motion_n.interp(t)).collect();
        zero_mean(&mut a);
        zero_mean(&mut m);

        let denom = l2(&a) * l2(&m) + DENOM_EPS;
        if denom <= DENOM_EPS {
            continue;
        }
        best.candidates += 1;

        let score = a.iter().zip(m.iter()).map(|(x, y)| x * y).sum::<f64>() / denom;
        if score > best_score {
            best_score = score;
            best.offset_s = offset;
            best.score = Some(score);
        }
    }

    if best.is_measured() {
        log::debug!(
            "Best offset {:.3}s (corr={:.3}, {} candidates)",
            best.offset_s,
            best_score,
            best.candidates
        );
    } else {
        log::debug!("No overlapping candidate offset, offset = 0");
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::test_support::{bump_train, shifted_pair};

    #[test]
    fn test_offset_grid_matches_linspace() {
        let grid = offset_grid(1.0, 0.01);
        assert_eq!(grid.len(), 201);
        assert!((grid[0] + 1.0).abs() < 1e-12);
        assert!((grid[200] - 1.0).abs() < 1e-12);
        assert!((grid[137] - 0.37).abs() < 1e-9);

        assert_eq!(offset_grid(0.0, 0.01), vec![0.0]);
    }

    #[test]
    fn test_time_grid_is_half_open() {
        let grid = time_grid(0.0, 0.5, 0.125);
        assert_eq!(grid, vec![0.0, 0.125, 0.25, 0.375]);
        assert!(time_grid(1.0, 0.5, 0.01).is_empty());
    }

    #[test]
    fn test_recovers_injected_offset() {
        let (audio, motion) = shifted_pair(0.37, 0.05, 7);
        let est = estimate_offset(&audio, &motion, &AlignmentConfig::default());
        assert!(est.is_measured());
        assert!(
            (est.offset_s - 0.37).abs() <= 0.01 + 1e-9,
            "expected ~0.37s, got {:.4}s",
            est.offset_s
        );
        assert!(est.score.unwrap() > 0.5);
    }

    #[test]
    fn test_recovers_negative_offset() {
        let (audio, motion) = shifted_pair(-0.25, 0.02, 11);
        let est = estimate_offset(&audio, &motion, &AlignmentConfig::default());
        assert!((est.offset_s + 0.25).abs() <= 0.01 + 1e-9, "got {:.4}s", est.offset_s);
    }

    #[test]
    fn test_degenerate_inputs_give_zero() {
        let config = AlignmentConfig::default();
        let motion = Envelope::uniform(bump_train(30.0, 10.0, 0.0), 30.0).unwrap();

        let short = Envelope::uniform(vec![0.0, 1.0, 0.0], 100.0).unwrap();
        assert_eq!(estimate_offset(&short, &motion, &config), OffsetEstimate::zero());

        let flat = Envelope::uniform(vec![0.5; 500], 100.0).unwrap();
        assert_eq!(estimate_offset(&flat, &motion, &config), OffsetEstimate::zero());

        // Audio ends long before the motion starts: no overlap for any offset
        let far = Envelope::new(
            (0..100).map(|k| 100.0 + k as f64 * 0.01).collect(),
            bump_train(100.0, 1.0, 0.0),
        )
        .unwrap();
        let est = estimate_offset(&far, &motion, &config);
        assert_eq!(est.offset_s, 0.0);
        assert_eq!(est.candidates, 0);
    }

    #[test]
    fn test_unusable_resolution_gives_zero() {
        let (audio, motion) = shifted_pair(0.37, 0.0, 1);
        for resolution_s in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            let config = AlignmentConfig {
                resolution_s,
                ..AlignmentConfig::default()
            };
            assert_eq!(
                estimate_offset(&audio, &motion, &config),
                OffsetEstimate::zero(),
                "resolution {}",
                resolution_s
            );
        }
        let config = AlignmentConfig {
            max_offset_s: f64::NAN,
            ..AlignmentConfig::default()
        };
        assert_eq!(estimate_offset(&audio, &motion, &config), OffsetEstimate::zero());
    }
}
