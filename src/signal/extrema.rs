//! Local extrema masks
//!
//! A sample is a minimum when it is strictly below its left neighbour and
//! not above its right neighbour (maxima mirror this). The asymmetric test
//! marks a plateau only once, at its first sample. The first and last
//! samples are never extrema.

/// Local minima mask, same length as the input
///
/// # Example
///
/// ```
/// use stratum_motion::signal::local_minima;
///
/// let mask = local_minima(&[3.0, 1.0, 2.0, 0.5, 0.5, 4.0]);
/// assert_eq!(mask, vec![false, true, false, true, false, false]);
/// ```
pub fn local_minima(signal: &[f64]) -> Vec<bool> {
    let n = signal.len();
    let mut mask = vec![false; n];
    if n >= 3 {
        for i in 1..n - 1 {
            mask[i] = signal[i] < signal[i - 1] && signal[i] <= signal[i + 1];
        }
    }
    mask
}

/// Local maxima mask, same length as the input
pub fn local_maxima(signal: &[f64]) -> Vec<bool> {
    let n = signal.len();
    let mut mask = vec![false; n];
    if n >= 3 {
        for i in 1..n - 1 {
            mask[i] = signal[i] > signal[i - 1] && signal[i] >= signal[i + 1];
        }
    }
    mask
}

/// Indices where a mask is set.
pub fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &on)| if on { Some(i) } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_never_marked() {
        let signal = vec![0.0, 1.0, 0.0, 1.0, 0.0];
        let maxima = local_maxima(&signal);
        let minima = local_minima(&signal);
        assert!(!maxima[0] && !maxima[4]);
        assert!(!minima[0] && !minima[4]);
        assert_eq!(mask_indices(&maxima), vec![1, 3]);
        assert_eq!(mask_indices(&minima), vec![2]);
    }

    #[test]
    fn test_short_signals_have_no_extrema() {
        for signal in [vec![], vec![1.0], vec![1.0, 0.0]] {
            assert!(local_minima(&signal).iter().all(|m| !m));
            assert!(local_maxima(&signal).iter().all(|m| !m));
            assert_eq!(local_minima(&signal).len(), signal.len());
        }
    }

    #[test]
    fn test_plateau_marked_once() {
        let signal = vec![0.0, 2.0, 2.0, 2.0, 0.0];
        assert_eq!(mask_indices(&local_maxima(&signal)), vec![1]);
        let signal = vec![5.0, 1.0, 1.0, 5.0];
        assert_eq!(mask_indices(&local_minima(&signal)), vec![1]);
    }
}
