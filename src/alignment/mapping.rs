//! Audio beats on the motion timeline
//!
//! Once the offset is known, audio beat times are shifted onto the motion
//! clock, turned into frame indices, and optionally expanded into per-frame
//! 0/1 labels for a downstream classifier.

/// Convert a tolerance in seconds to frames (rounded half to even).
pub fn tolerance_frames(tolerance_s: f64, fps: f64) -> usize {
    let frames = (tolerance_s * fps).round_ties_even();
    if frames.is_finite() && frames > 0.0 {
        frames as usize
    } else {
        0
    }
}

/// Map audio beat times to motion frames
///
/// # Arguments
///
/// * `beat_times` - Beat times on the audio clock, in seconds
/// * `offset_s` - Offset added to audio times (see [`super::OffsetEstimate`])
/// * `fps` - Motion frame rate in Hz
/// * `duration_s` - Motion duration; shifted beats outside `[0, duration_s]`
///   are dropped
/// * `n_frames` - Number of motion frames; frames are clamped to `[0, T)`
///
/// # Returns
///
/// Sorted, duplicate-free frame indices (empty when `fps <= 0` or the clip
/// has no frames)
///
/// # Example
///
/// ```
/// use stratum_motion::alignment::map_beats_to_frames;
///
/// let frames = map_beats_to_frames(&[0.0, 0.5, 1.0, 5.0], 0.1, 30.0, 2.0, 61);
/// assert_eq!(frames, vec![3, 18, 33]);
/// ```
pub fn map_beats_to_frames(
    beat_times: &[f64],
    offset_s: f64,
    fps: f64,
    duration_s: f64,
    n_frames: usize,
) -> Vec<usize> {
    if n_frames == 0 || !(fps > 0.0) {
        return Vec::new();
    }
    let last = (n_frames - 1) as f64;

    let mut frames: Vec<usize> = beat_times
        .iter()
        .map(|b| b + offset_s)
        .filter(|t| (0.0..=duration_s).contains(t))
        .map(|t| (t * fps).round_ties_even().clamp(0.0, last) as usize)
        .collect();
    frames.sort_unstable();
    frames.dedup();

    if frames.len() < beat_times.len() {
        log::debug!(
            "{} of {} audio beats fall on the motion clip",
            frames.len(),
            beat_times.len()
        );
    }
    frames
}

/// Per-frame beat labels
///
/// Every frame within `tolerance` frames of a beat is labelled 1; beats at
/// or beyond `n_frames` are ignored.
///
/// # Example
///
/// ```
/// use stratum_motion::alignment::frame_labels;
///
/// assert_eq!(frame_labels(&[0, 5], 8, 1), vec![1, 1, 0, 0, 1, 1, 1, 0]);
/// ```
pub fn frame_labels(beat_frames: &[usize], n_frames: usize, tolerance: usize) -> Vec<u8> {
    let mut labels = vec![0u8; n_frames];
    for &b in beat_frames.iter().filter(|&&b| b < n_frames) {
        let lo = b.saturating_sub(tolerance);
        let hi = (b + tolerance + 1).min(n_frames);
        labels[lo..hi].iter_mut().for_each(|l| *l = 1);
    }
    labels
}

/// Widen existing positive labels by `radius` frames on each side.
///
/// Widening is computed from the original positives, so it never cascades.
pub fn widen_labels(labels: &[u8], radius: usize) -> Vec<u8> {
    if radius == 0 {
        return labels.to_vec();
    }
    let positives: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, &l)| l != 0)
        .map(|(i, _)| i)
        .collect();
    let widened = frame_labels(&positives, labels.len(), radius);
    log::debug!(
        "Widened labels: {} -> {} positives",
        positives.len(),
        widened.iter().filter(|&&l| l == 1).count()
    );
    widened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_filters_and_clamps() {
        // 2.0 + 0.0 is exactly the duration and is kept; it rounds past the
        // last frame and is clamped
        let frames = map_beats_to_frames(&[-0.5, 0.0, 1.0, 2.0], 0.0, 30.0, 2.0, 60);
        assert_eq!(frames, vec![0, 30, 59]);

        // Negative offset pushes early beats before the clip
        let frames = map_beats_to_frames(&[0.1, 0.5], -0.2, 30.0, 2.0, 60);
        assert_eq!(frames, vec![9]);
    }

    #[test]
    fn test_map_deduplicates_close_beats() {
        let frames = map_beats_to_frames(&[1.0, 1.001, 1.002], 0.0, 30.0, 2.0, 61);
        assert_eq!(frames, vec![30]);
    }

    #[test]
    fn test_map_degenerate() {
        assert!(map_beats_to_frames(&[0.5], 0.0, 30.0, 1.0, 0).is_empty());
        assert!(map_beats_to_frames(&[0.5], 0.0, 0.0, 1.0, 10).is_empty());
        assert!(map_beats_to_frames(&[], 0.0, 30.0, 1.0, 10).is_empty());
    }

    #[test]
    fn test_tolerance_frames() {
        assert_eq!(tolerance_frames(0.05, 30.0), 2);
        assert_eq!(tolerance_frames(0.05, 60.0), 3);
        assert_eq!(tolerance_frames(0.0, 30.0), 0);
        assert_eq!(tolerance_frames(-1.0, 30.0), 0);
    }

    #[test]
    fn test_labels_clip_at_edges() {
        assert_eq!(frame_labels(&[0, 9, 42], 10, 2), vec![1, 1, 1, 0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(frame_labels(&[3], 6, 0), vec![0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_widen_does_not_cascade() {
        let labels = vec![0, 0, 0, 1, 0, 0, 0, 0];
        assert_eq!(widen_labels(&labels, 1), vec![0, 0, 1, 1, 1, 0, 0, 0]);
        assert_eq!(widen_labels(&labels, 0), labels);
    }
}
