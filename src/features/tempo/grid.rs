//! Beat grid utilities

use crate::signal::sorted_unique;

/// Uniformly subdivide the intervals between consecutive events
///
/// Inserts `factor - 1` evenly spaced frames (rounded half to even) between
/// each pair of events. The result keeps time order, has no duplicates and
/// is clamped to `[0, n_frames - 1]`.
///
/// # Example
///
/// ```
/// use stratum_motion::features::tempo::subdivide_events;
///
/// assert_eq!(subdivide_events(&[0, 10], 2, 100), vec![0, 5, 10]);
/// assert_eq!(subdivide_events(&[0, 10], 4, 100), vec![0, 2, 5, 8, 10]);
/// ```
pub fn subdivide_events(events: &[usize], factor: usize, n_frames: usize) -> Vec<usize> {
    let events = sorted_unique(events.to_vec());
    if n_frames == 0 {
        return Vec::new();
    }
    let factor = factor.max(1);
    if events.len() < 2 || factor == 1 {
        return events.into_iter().filter(|&e| e < n_frames).collect();
    }

    let mut out = vec![events[0]];
    for pair in events.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for k in 1..factor {
            let t = a as f64 + (b - a) as f64 * (k as f64 / factor as f64);
            out.push(t.round_ties_even() as usize);
        }
        out.push(b);
    }

    let mut seen = std::collections::HashSet::new();
    out.into_iter()
        .map(|e| e.min(n_frames - 1))
        .filter(|e| seen.insert(*e))
        .collect()
}

/// Drop events that follow the previously kept one too closely
///
/// Events within `round(min_sep_s · fps)` frames of the last kept event are
/// discarded, so the earliest event of each cluster survives (e.g. left and
/// right foot contacts landing on the same beat).
pub fn dedup_events_by_time(events: &[usize], fps: f64, min_sep_s: f64) -> Vec<usize> {
    let events = sorted_unique(events.to_vec());
    let window = (min_sep_s * fps).round_ties_even();
    let window = if window.is_finite() && window > 0.0 { window as usize } else { 0 };

    let mut kept: Vec<usize> = Vec::with_capacity(events.len());
    for e in events {
        match kept.last() {
            Some(&last) if e - last <= window => continue,
            _ => kept.push(e),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdivide_clamps_and_dedups() {
        assert_eq!(subdivide_events(&[10, 0, 10], 1, 100), vec![0, 10]);
        assert_eq!(subdivide_events(&[0, 1], 4, 100), vec![0, 1]);
        assert_eq!(subdivide_events(&[0, 9, 200], 1, 50), vec![0, 9]);
        assert_eq!(subdivide_events(&[40, 60], 2, 50), vec![40, 49]);
        assert!(subdivide_events(&[1, 2], 2, 0).is_empty());
        assert_eq!(subdivide_events(&[7], 3, 50), vec![7]);
    }

    #[test]
    fn test_dedup_keeps_earliest() {
        // 0.1s at 30 fps = 3 frames
        assert_eq!(dedup_events_by_time(&[10, 12, 13, 14, 30, 33, 34], 30.0, 0.1), vec![10, 14, 30, 34]);
        assert_eq!(dedup_events_by_time(&[5, 5, 6], 30.0, 0.0), vec![5, 6]);
        assert!(dedup_events_by_time(&[], 30.0, 0.1).is_empty());
    }
}
