//! Per-frame feature rows for a downstream classifier

use crate::features::beats::BeatAnalysis;
use serde::{Deserialize, Serialize};

/// Column names of [`feature_matrix`], in order
pub const FEATURE_NAMES: [&str; 6] = ["score", "decel", "pelvis", "foot", "accel", "reversal"];

/// Dense row-major matrix of per-frame features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Build from row-major data; `None` if the length is not `n_rows * n_cols`.
    pub fn from_row_major(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == n_rows * n_cols).then_some(Self { n_rows, n_cols, data })
    }

    /// Number of rows (frames).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (features per frame).
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Features of one frame.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a zero-width matrix has no data anyway
        self.data.chunks_exact(self.n_cols.max(1))
    }

    /// Row-major backing slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Stack the fused score and the cues into one row per frame
///
/// Columns follow [`FEATURE_NAMES`]. The acceleration and reversal columns
/// are zero when the analysis ran with the base parameter set.
pub fn feature_matrix(analysis: &BeatAnalysis) -> FeatureMatrix {
    let n = analysis.n_frames();
    let cues = &analysis.cues;
    let zeros = vec![0.0; n];
    let accel = cues.accel.as_deref().unwrap_or(&zeros);
    let reversal = cues.reversal.as_deref().unwrap_or(&zeros);

    let columns: [&[f64]; 6] = [
        &analysis.score,
        &cues.decel,
        &cues.pelvis,
        &cues.foot,
        accel,
        reversal,
    ];

    let mut data = Vec::with_capacity(n * columns.len());
    for t in 0..n {
        data.extend(columns.iter().map(|col| col.get(t).copied().unwrap_or(0.0)));
    }
    FeatureMatrix {
        n_rows: n,
        n_cols: columns.len(),
        data,
    }
}

/// Concatenate each row with its neighbours
///
/// Row `t` of the result holds rows `t - radius ..= t + radius` of the input,
/// with indices clamped into the clip, giving `D * (2 radius + 1)` columns.
/// A radius of 0 returns a copy of the input.
///
/// # Example
///
/// ```
/// use stratum_motion::ml::{context_features, FeatureMatrix};
///
/// let base = FeatureMatrix::from_row_major(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
/// let ctx = context_features(&base, 1);
/// assert_eq!(ctx.row(0), &[1.0, 1.0, 2.0]);
/// assert_eq!(ctx.row(2), &[2.0, 3.0, 3.0]);
/// ```
pub fn context_features(features: &FeatureMatrix, radius: usize) -> FeatureMatrix {
    if radius == 0 || features.n_rows == 0 {
        return features.clone();
    }
    let n = features.n_rows;
    let width = features.n_cols * (2 * radius + 1);
    log::debug!("Context features: {} rows, radius {}, {} columns", n, radius, width);

    let mut data = Vec::with_capacity(n * width);
    for t in 0..n {
        for k in 0..=2 * radius {
            let src = (t + k).saturating_sub(radius).min(n - 1);
            data.extend_from_slice(features.row(src));
        }
    }
    FeatureMatrix {
        n_rows: n,
        n_cols: width,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cues::CueSignals;

    fn analysis(extended: bool) -> BeatAnalysis {
        let n = 4;
        let ramp = |s: f64| (0..n).map(|t| s * t as f64).collect::<Vec<f64>>();
        BeatAnalysis {
            score: ramp(1.0),
            candidate_mask: vec![false; n],
            events: vec![],
            cues: CueSignals {
                decel: ramp(2.0),
                pelvis: ramp(3.0),
                foot: ramp(4.0),
                left_foot: ramp(4.0),
                right_foot: vec![0.0; n],
                accel: extended.then(|| ramp(5.0)),
                reversal: extended.then(|| ramp(6.0)),
            },
            nms_separation_s: 0.12,
            period_s: None,
            fps: 30.0,
        }
    }

    #[test]
    fn test_feature_matrix_column_order() {
        let m = feature_matrix(&analysis(true));
        assert_eq!(m.n_rows(), 4);
        assert_eq!(m.n_cols(), FEATURE_NAMES.len());
        assert_eq!(m.row(2), &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn test_feature_matrix_base_mode_zero_fills() {
        let m = feature_matrix(&analysis(false));
        assert_eq!(m.row(3), &[3.0, 6.0, 9.0, 12.0, 0.0, 0.0]);
        assert_eq!(m.rows().count(), 4);
    }

    #[test]
    fn test_context_shape_and_clamping() {
        let m = feature_matrix(&analysis(true));
        let ctx = context_features(&m, 2);
        assert_eq!(ctx.n_rows(), 4);
        assert_eq!(ctx.n_cols(), 6 * 5);
        // Centre block of each row is the row itself
        for t in 0..4 {
            assert_eq!(&ctx.row(t)[12..18], m.row(t));
        }
        // Frame 0 repeats itself for the two missing predecessors
        assert_eq!(&ctx.row(0)[0..6], m.row(0));
        assert_eq!(&ctx.row(0)[6..12], m.row(0));
        // Last frame repeats itself for the missing successors
        assert_eq!(&ctx.row(3)[24..30], m.row(3));

        assert_eq!(context_features(&m, 0), m);
        assert_eq!(context_features(&FeatureMatrix::default(), 3).n_rows(), 0);
    }

    #[test]
    fn test_from_row_major_checks_length() {
        assert!(FeatureMatrix::from_row_major(2, 3, vec![0.0; 5]).is_none());
        assert!(FeatureMatrix::from_row_major(2, 3, vec![0.0; 6]).is_some());
    }
}
