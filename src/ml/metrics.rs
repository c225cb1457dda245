//! Event-level evaluation of per-frame predictions
//!
//! Predictions and labels are compared as runs of positive frames: a
//! predicted run counts as a hit when it overlaps any labelled run.

use super::hybrid::threshold_segments;
use serde::{Deserialize, Serialize};

/// Precision, recall and F1 over event segments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventMetrics {
    /// Fraction of predicted segments overlapping a labelled segment
    pub precision: f64,
    /// Fraction of labelled segments overlapped by a prediction
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Number of labelled segments
    pub n_true: usize,
    /// Number of predicted segments
    pub n_pred: usize,
}

fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    !(a.1 <= b.0 || b.1 <= a.0)
}

/// Compare thresholded probabilities with 0/1 frame labels
///
/// With neither labels nor predictions the result is a perfect score; with
/// labels but no predictions everything is 0; with predictions but no labels
/// precision is 0 and recall is 1.
///
/// # Panics
///
/// Panics if `prob` and `labels` have different lengths.
pub fn event_level_metrics(prob: &[f64], labels: &[u8], thr: f64) -> EventMetrics {
    assert_eq!(prob.len(), labels.len(), "probabilities and labels must align");

    let truth_f: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();
    let truth = threshold_segments(&truth_f, 0.5);
    let pred = threshold_segments(prob, thr);
    let (n_true, n_pred) = (truth.len(), pred.len());

    let metrics = |precision: f64, recall: f64, f1: f64| EventMetrics {
        precision,
        recall,
        f1,
        n_true,
        n_pred,
    };

    match (n_true, n_pred) {
        (0, 0) => return metrics(1.0, 1.0, 1.0),
        (_, 0) => return metrics(0.0, 0.0, 0.0),
        (0, _) => return metrics(0.0, 1.0, 0.0),
        _ => {}
    }

    let pred_hits = pred.iter().filter(|&&p| truth.iter().any(|&t| overlaps(p, t))).count();
    let true_hits = truth.iter().filter(|&&t| pred.iter().any(|&p| overlaps(p, t))).count();

    let precision = pred_hits as f64 / n_pred as f64;
    let recall = true_hits as f64 / n_true as f64;
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    metrics(precision, recall, f1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_counts() {
        let labels = [0, 1, 1, 0, 0, 0, 1, 0, 0, 0];
        let prob = [0.0, 0.0, 0.9, 0.9, 0.0, 0.0, 0.0, 0.0, 0.8, 0.0];
        let m = event_level_metrics(&prob, &labels, 0.5);
        assert_eq!((m.n_true, m.n_pred), (2, 2));
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 0.5);
        assert_eq!(m.f1, 0.5);
    }

    #[test]
    fn test_degenerate_cases() {
        let none = event_level_metrics(&[0.0; 4], &[0; 4], 0.5);
        assert_eq!((none.precision, none.recall, none.f1), (1.0, 1.0, 1.0));

        let missed = event_level_metrics(&[0.0; 4], &[0, 1, 0, 0], 0.5);
        assert_eq!((missed.precision, missed.recall, missed.f1), (0.0, 0.0, 0.0));

        let spurious = event_level_metrics(&[0.0, 0.9, 0.0, 0.0], &[0; 4], 0.5);
        assert_eq!((spurious.precision, spurious.recall, spurious.f1), (0.0, 1.0, 0.0));
    }
}
