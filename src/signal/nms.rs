//! Non-maximum suppression on a per-frame score
//!
//! Local maxima are visited from strongest to weakest; each kept peak claims
//! a window of `±round(min_sep_s · fps)` frames (at least one) and any later
//! peak inside a claimed window is suppressed.

use super::extrema::{local_maxima, mask_indices};

/// Greedy non-maximum suppression
///
/// # Arguments
///
/// * `score` - Per-frame score
/// * `fps` - Frame rate used to convert `min_sep_s` into frames
/// * `min_sep_s` - Minimum separation between kept peaks, in seconds
///
/// # Returns
///
/// Sorted frame indices of the kept peaks. Any two kept peaks are more than
/// the suppression window apart.
///
/// # Example
///
/// ```
/// use stratum_motion::signal::nms_basic;
///
/// let score = [0.0, 0.5, 0.0, 0.9, 0.0, 0.0, 0.0, 0.0, 0.7, 0.0];
/// // 2-frame window: the peak at 1 is suppressed by the stronger one at 3
/// assert_eq!(nms_basic(&score, 10.0, 0.2), vec![3, 8]);
/// ```
pub fn nms_basic(score: &[f64], fps: f64, min_sep_s: f64) -> Vec<usize> {
    let mut candidates = mask_indices(&local_maxima(score));
    if candidates.is_empty() {
        return candidates;
    }

    // Strongest first; ties resolved towards the earlier frame
    candidates.sort_by(|&a, &b| score[b].total_cmp(&score[a]).then(a.cmp(&b)));

    let window = separation_frames(min_sep_s, fps);
    let n = score.len();
    let mut taken = vec![false; n];
    let mut picked = Vec::new();

    for i in candidates {
        if taken[i] {
            continue;
        }
        picked.push(i);
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(n);
        for t in &mut taken[lo..hi] {
            *t = true;
        }
    }

    picked.sort_unstable();
    log::debug!(
        "NMS kept {} peaks (window = {} frames, {:.3}s at {:.1} fps)",
        picked.len(),
        window,
        min_sep_s,
        fps
    );
    picked
}

/// Suppression half-window in frames, never below one frame.
pub fn separation_frames(min_sep_s: f64, fps: f64) -> usize {
    let frames = (min_sep_s * fps).round_ties_even();
    if frames.is_finite() && frames >= 1.0 {
        frames as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_separation_holds() {
        // Peaks every 4 frames with varying heights
        let n = 200;
        let score: Vec<f64> = (0..n)
            .map(|i| {
                if i % 4 == 2 {
                    0.5 + 0.5 * ((i as f64) * 0.13).sin().abs()
                } else {
                    0.0
                }
            })
            .collect();
        let fps = 30.0;
        let min_sep_s = 0.25;
        let events = nms_basic(&score, fps, min_sep_s);
        let window = separation_frames(min_sep_s, fps);
        assert!(!events.is_empty());
        for pair in events.windows(2) {
            assert!(
                pair[1] - pair[0] > window,
                "events {} and {} closer than {} frames",
                pair[0],
                pair[1],
                window
            );
        }
    }

    #[test]
    fn test_keeps_strongest_in_cluster() {
        let score = vec![0.0, 0.4, 0.0, 0.8, 0.0, 0.6, 0.0];
        let events = nms_basic(&score, 10.0, 0.2);
        assert_eq!(events, vec![3]);
    }

    #[test]
    fn test_flat_signal_has_no_events() {
        assert!(nms_basic(&[0.3; 50], 30.0, 0.1).is_empty());
        assert!(nms_basic(&[], 30.0, 0.1).is_empty());
    }

    #[test]
    fn test_separation_frames_floor() {
        assert_eq!(separation_frames(0.001, 30.0), 1);
        assert_eq!(separation_frames(0.12, 30.0), 4);
        assert_eq!(separation_frames(0.1, 0.0), 1);
    }
}
