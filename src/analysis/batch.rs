//! Parallel analysis across clips
//!
//! Parallelism is across clips only: every worker owns its clip's stream and
//! derived signals, and each clip is still analysed single-threaded. Results
//! come back in input order, one `Result` per clip, so one broken file never
//! stops the batch.

use super::{analyze_clip, ClipAnalysis, ClipInput};
use crate::config::{AlignmentConfig, BeatParams};
use crate::error::{MotionError, Result};
use crate::rig::UpAxis;
use rayon::prelude::*;
use std::path::Path;

/// Analyse many clips on the global rayon pool
///
/// # Returns
///
/// One result per input, in input order
pub fn analyze_batch(
    inputs: &[ClipInput],
    params: &BeatParams,
    config: &AlignmentConfig,
) -> Vec<Result<ClipAnalysis>> {
    log::debug!("Batch analysis of {} clips", inputs.len());
    inputs
        .par_iter()
        .map(|input| analyze_clip(input, params, config))
        .collect()
}

/// Load and analyse BVH files on the global rayon pool
///
/// Loading happens inside the workers, so parse errors are reported per file.
pub fn analyze_bvh_files<P>(
    paths: &[P],
    up: UpAxis,
    params: &BeatParams,
    config: &AlignmentConfig,
) -> Vec<Result<ClipAnalysis>>
where
    P: AsRef<Path> + Sync,
{
    log::debug!("Batch analysis of {} BVH files", paths.len());
    paths
        .par_iter()
        .map(|path| {
            let input = ClipInput::from_bvh_file(path, up)?;
            analyze_clip(&input, params, config)
        })
        .collect()
}

/// Run a batch on a dedicated pool with `jobs` worker threads
///
/// # Errors
///
/// Returns `MotionError::InvalidConfig` if the pool cannot be built.
pub fn analyze_batch_with_jobs(
    inputs: &[ClipInput],
    params: &BeatParams,
    config: &AlignmentConfig,
    jobs: usize,
) -> Result<Vec<Result<ClipAnalysis>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| MotionError::invalid_config(format!("cannot build thread pool: {}", e)))?;
    Ok(pool.install(|| analyze_batch(inputs, params, config)))
}

/// Default worker count: available threads minus one, at least one.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::walking_clip;

    #[test]
    fn test_batch_preserves_order_and_matches_serial() {
        let inputs: Vec<ClipInput> = [60, 90, 120, 150]
            .iter()
            .map(|&n| {
                let (stream, rig) = walking_clip(n, 30, 30.0);
                ClipInput::new(stream, rig).with_name(Some(format!("clip{}", n)))
            })
            .collect();
        let params = BeatParams::extended();
        let config = AlignmentConfig::default();

        let results = analyze_batch_with_jobs(&inputs, &params, &config, 2).unwrap();
        assert_eq!(results.len(), 4);
        for (input, result) in inputs.iter().zip(results.iter()) {
            let result = result.as_ref().unwrap();
            assert_eq!(result.metadata.name, input.name);
            let serial = analyze_clip(input, &params, &config).unwrap();
            assert_eq!(result.beats, serial.beats);
        }
    }

    #[test]
    fn test_missing_files_fail_individually() {
        let results = analyze_bvh_files(
            &["/nonexistent/a.bvh", "/nonexistent/b.bvh"],
            UpAxis::Y,
            &BeatParams::base(),
            &AlignmentConfig::default(),
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Err(MotionError::Io(_)))));
    }

    #[test]
    fn test_default_jobs_is_positive() {
        assert!(default_jobs() >= 1);
    }
}
