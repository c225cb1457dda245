//! Peak prominence and local area
//!
//! Used to discard shallow ripples on the fused score: a candidate must
//! stand out from its surroundings (prominence) and carry enough mass around
//! it (area) within a small window.

/// Prominence and local area of a candidate peak
///
/// The window spans `[index - radius, index + radius]`, clipped to the signal.
/// The baseline is the larger of the window minimum and the lower of the two
/// window edges; an edge that coincides with the signal boundary counts as
/// the peak value itself. The area is the trapezoidal integral (unit spacing)
/// of the window with negative values clipped to zero.
///
/// # Arguments
///
/// * `signal` - Score values
/// * `index` - Candidate peak index (must be `< signal.len()`)
/// * `radius` - Half-window in frames
///
/// # Returns
///
/// `(prominence, area)`, or `(0.0, 0.0)` if `index` is out of range
///
/// # Example
///
/// ```
/// use stratum_motion::signal::prominence_and_area;
///
/// let score = [0.0, 0.0, 1.0, 0.0, 0.0];
/// let (prom, area) = prominence_and_area(&score, 2, 1);
/// assert_eq!(prom, 1.0);
/// assert_eq!(area, 1.0);
/// ```
pub fn prominence_and_area(signal: &[f64], index: usize, radius: usize) -> (f64, f64) {
    let n = signal.len();
    if index >= n {
        return (0.0, 0.0);
    }

    let lo = index.saturating_sub(radius);
    let hi = (index + radius + 1).min(n);
    let window = &signal[lo..hi];
    let peak = signal[index];

    let window_min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let left_edge = if lo > 0 { signal[lo] } else { peak };
    let right_edge = if hi < n { signal[hi - 1] } else { peak };
    let edge_min = left_edge.min(right_edge);
    let prominence = peak - window_min.max(edge_min);

    let clipped: Vec<f64> = window.iter().map(|v| v.max(0.0)).collect();
    let area = clipped
        .windows(2)
        .map(|pair| 0.5 * (pair[0] + pair[1]))
        .sum::<f64>();

    (prominence, area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharp_peak() {
        let mut score = vec![0.0; 21];
        score[10] = 1.0;
        let (prom, area) = prominence_and_area(&score, 10, 4);
        assert!((prom - 1.0).abs() < 1e-12);
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ripple_on_plateau_has_low_prominence() {
        let score = vec![0.8, 0.8, 0.82, 0.85, 0.82, 0.8, 0.8];
        let (prom, _) = prominence_and_area(&score, 3, 2);
        assert!(prom < 0.1, "ripple prominence should be small, got {}", prom);
    }

    #[test]
    fn test_negative_values_clipped_in_area() {
        let score = vec![-1.0, -1.0, 0.5, -1.0, -1.0];
        let (_, area) = prominence_and_area(&score, 2, 2);
        assert!((area - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(prominence_and_area(&[1.0, 2.0], 5, 1), (0.0, 0.0));
    }
}
